//! The per-session cache of the lists fetched from the backend.
//!
//! Every change goes through [reduce], which makes the state transitions
//! explicit. List fetches are tagged with a generation number so a slow
//! response that arrives after a newer fetch started is dropped instead of
//! overwriting the newer data.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    Error,
    account::{AccountId, BankAccount, set_default_account},
    pagination::{PageInfo, PageQuery, Paginated},
    request::{FundRequest, TransferRequest},
    transaction::Transaction,
    user::{User, UserId},
};

/// Identifies what a cached list holds: the page plus anything else sent
/// to the backend, such as a status filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub page: PageQuery,
    pub scope: String,
}

impl FetchKey {
    pub fn new(page: PageQuery, scope: impl Into<String>) -> Self {
        Self {
            page,
            scope: scope.into(),
        }
    }
}

/// The cached state of one list.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub info: Option<PageInfo>,
    pub key: Option<FetchKey>,
    pub loading: bool,
    pub error: Option<String>,
    /// Incremented by every fetch, responses carry the value they started with.
    pub generation: u64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            info: None,
            key: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

/// The transitions of a [ListState].
#[derive(Debug, Clone)]
pub enum ListAction<T> {
    FetchStarted { key: FetchKey },
    FetchSucceeded { generation: u64, page: Paginated<T> },
    FetchFailed { generation: u64, message: String },
    /// Forget the cached page so the next load fetches again.
    Invalidate,
}

impl<T: Clone> ListState<T> {
    fn reduce(&mut self, action: ListAction<T>) {
        match action {
            ListAction::FetchStarted { key } => {
                self.generation += 1;
                self.key = Some(key);
                self.loading = true;
                self.error = None;
            }
            ListAction::FetchSucceeded { generation, page } => {
                if generation != self.generation {
                    tracing::debug!(
                        "Discarding stale list response (generation {generation}, current {})",
                        self.generation
                    );
                    return;
                }

                self.items = page.items;
                self.info = Some(page.info);
                self.loading = false;
            }
            ListAction::FetchFailed {
                generation,
                message,
            } => {
                if generation != self.generation {
                    tracing::debug!(
                        "Discarding stale list error (generation {generation}, current {})",
                        self.generation
                    );
                    return;
                }

                self.key = None;
                self.loading = false;
                self.error = Some(message);
            }
            ListAction::Invalidate => {
                self.key = None;
            }
        }
    }

    /// The loaded page, if it was fetched with `key` and nothing is in flight.
    pub fn cached(&self, key: &FetchKey) -> Option<Paginated<T>> {
        if self.loading || self.key.as_ref() != Some(key) {
            return None;
        }

        self.info.map(|info| Paginated {
            items: self.items.clone(),
            info,
        })
    }
}

/// Everything cached for one logged-in user.
#[derive(Debug, Clone, Default)]
pub struct AppStore {
    pub accounts: ListState<BankAccount>,
    pub transactions: ListState<Transaction>,
    pub fund_requests: ListState<FundRequest>,
    pub transfer_requests: ListState<TransferRequest>,
    pub pending_users: ListState<User>,
}

/// A change to an [AppStore].
#[derive(Debug, Clone)]
pub enum Action {
    Accounts(ListAction<BankAccount>),
    Transactions(ListAction<Transaction>),
    FundRequests(ListAction<FundRequest>),
    TransferRequests(ListAction<TransferRequest>),
    PendingUsers(ListAction<User>),
    /// The backend accepted a new default account.
    DefaultAccountSet { id: AccountId },
}

pub fn reduce(store: &mut AppStore, action: Action) {
    match action {
        Action::Accounts(action) => store.accounts.reduce(action),
        Action::Transactions(action) => store.transactions.reduce(action),
        Action::FundRequests(action) => store.fund_requests.reduce(action),
        Action::TransferRequests(action) => store.transfer_requests.reduce(action),
        Action::PendingUsers(action) => store.pending_users.reduce(action),
        Action::DefaultAccountSet { id } => {
            if set_default_account(&mut store.accounts.items, &id).is_err() {
                // The account is on another page, so the cached page is out of date.
                store.accounts.reduce(ListAction::Invalidate);
            }
        }
    }
}

/// A list type with its own slice of the [AppStore].
pub trait Slice: Clone + Send + 'static {
    fn wrap(action: ListAction<Self>) -> Action;
    fn slice(store: &AppStore) -> &ListState<Self>;
}

macro_rules! impl_slice {
    ($item:ty, $variant:ident, $field:ident) => {
        impl Slice for $item {
            fn wrap(action: ListAction<Self>) -> Action {
                Action::$variant(action)
            }

            fn slice(store: &AppStore) -> &ListState<Self> {
                &store.$field
            }
        }
    };
}

impl_slice!(BankAccount, Accounts, accounts);
impl_slice!(Transaction, Transactions, transactions);
impl_slice!(FundRequest, FundRequests, fund_requests);
impl_slice!(TransferRequest, TransferRequests, transfer_requests);
impl_slice!(User, PendingUsers, pending_users);

/// One [AppStore] per logged-in user, shared by every handler.
#[derive(Debug, Clone, Default)]
pub struct SessionStores {
    inner: Arc<Mutex<HashMap<UserId, AppStore>>>,
}

impl SessionStores {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, AppStore>>, Error> {
        self.inner.lock().map_err(|_| Error::StateLockError)
    }

    /// Apply `action` to the store of `user`.
    pub fn dispatch(&self, user: &str, action: Action) -> Result<(), Error> {
        let mut stores = self.lock()?;
        reduce(stores.entry(user.to_owned()).or_default(), action);

        Ok(())
    }

    /// Read from the store of `user`.
    pub fn select<R>(&self, user: &str, selector: impl FnOnce(&AppStore) -> R) -> Result<R, Error> {
        let stores = self.lock()?;

        Ok(match stores.get(user) {
            Some(store) => selector(store),
            None => selector(&AppStore::default()),
        })
    }

    /// Mark a fetch of `key` as started and return its generation.
    pub fn start_fetch<T: Slice>(&self, user: &str, key: FetchKey) -> Result<u64, Error> {
        let mut stores = self.lock()?;
        let store = stores.entry(user.to_owned()).or_default();
        reduce(store, T::wrap(ListAction::FetchStarted { key }));

        Ok(T::slice(store).generation)
    }

    /// Forget the cached page of `T` for `user`.
    pub fn invalidate<T: Slice>(&self, user: &str) -> Result<(), Error> {
        self.dispatch(user, T::wrap(ListAction::Invalidate))
    }

    /// Drop everything cached for `user`.
    pub fn clear(&self, user: &str) -> Result<(), Error> {
        self.lock()?.remove(user);

        Ok(())
    }

    /// Return the page for `key`, fetching it unless it is already cached.
    ///
    /// `refresh` forces a fetch, e.g. after a mutation. The lock is released
    /// while `fetch` runs, so the result is recorded against the generation
    /// the fetch started with. If a newer fetch has started in the meantime
    /// the response is not cached, but this caller still gets the page it asked for.
    pub async fn load<T, F, Fut>(
        &self,
        user: &str,
        key: FetchKey,
        refresh: bool,
        fetch: F,
    ) -> Result<Paginated<T>, Error>
    where
        T: Slice,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Paginated<T>, Error>>,
    {
        if !refresh {
            let cached = self.select(user, |store| T::slice(store).cached(&key))?;

            if let Some(page) = cached {
                return Ok(page);
            }
        }

        let generation = self.start_fetch::<T>(user, key)?;

        match fetch().await {
            Ok(page) => {
                self.dispatch(
                    user,
                    T::wrap(ListAction::FetchSucceeded {
                        generation,
                        page: page.clone(),
                    }),
                )?;

                Ok(page)
            }
            Err(error) => {
                self.dispatch(
                    user,
                    T::wrap(ListAction::FetchFailed {
                        generation,
                        message: error.to_string(),
                    }),
                )?;

                Err(error)
            }
        }
    }
}
