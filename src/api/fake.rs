//! An in-memory stand-in for the banking backend.
//!
//! It implements every gateway with the same access rules as the real
//! backend: users see their own records, admins see everyone's, and review
//! actions follow the request workflow. Tests use it to count list fetches
//! and inject failures. The server uses it in demo mode.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime, macros::datetime};

use crate::{
    Error,
    account::{AccountDraft, AccountRef, BankAccount, set_default_account},
    pagination::{PageInfo, PageQuery, Paginated},
    request::{
        FundRequest, ProcessInput, RequestKind, RequestStatus, ReviewCommand, ReviewState,
        Reviewable, TransferRequest,
    },
    transaction::{Transaction, TransactionType},
    user::{ProfileUpdate, Role, User, UserId},
};

use super::{
    AccessToken, AccountsGateway, AuthGateway, AuthSession, Credentials, PasswordChange,
    RefreshedTokens, Registration, RequestQuery, RequestsGateway, TransactionsGateway,
    UsersGateway,
};

/// The password of every demo user.
pub const DEMO_PASSWORD: &str = "demo-password-2024";
/// The demo administrator's email address.
pub const DEMO_ADMIN_EMAIL: &str = "admin@bankdesk.test";
/// The demo customer's email address.
pub const DEMO_USER_EMAIL: &str = "asha@bankdesk.test";

/// A list fetch received by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    /// The collection that was listed, e.g. "fund-requests".
    pub resource: &'static str,
    /// The page that was asked for.
    pub page: PageQuery,
    /// The status filter, for request lists.
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone)]
struct FakeUser {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct FakeData {
    users: Vec<FakeUser>,
    accounts: HashMap<UserId, Vec<BankAccount>>,
    transactions: Vec<Transaction>,
    fund_requests: Vec<FundRequest>,
    transfer_requests: Vec<TransferRequest>,
    sessions: HashMap<String, UserId>,
    refresh_tokens: HashMap<String, UserId>,
    next_id: u64,
}

impl FakeData {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:04}", self.next_id)
    }

    fn user(&self, id: &str) -> Result<&FakeUser, Error> {
        self.users
            .iter()
            .find(|fake| fake.user.id == id)
            .ok_or(Error::NotFound)
    }

    fn user_mut(&mut self, id: &str) -> Result<&mut FakeUser, Error> {
        self.users
            .iter_mut()
            .find(|fake| fake.user.id == id)
            .ok_or(Error::NotFound)
    }

    /// The user a token was issued to.
    fn session(&self, token: &AccessToken) -> Result<User, Error> {
        let user_id = self
            .sessions
            .get(token.as_str())
            .ok_or(Error::Unauthorized)?;

        self.user(user_id)
            .map(|fake| fake.user.clone())
            .map_err(|_| Error::Unauthorized)
    }

    fn admin_session(&self, token: &AccessToken) -> Result<User, Error> {
        let user = self.session(token)?;

        if user.role.is_admin() {
            Ok(user)
        } else {
            Err(Error::Forbidden)
        }
    }

    fn issue_tokens(&mut self, user_id: &str) -> (AccessToken, String) {
        let access_token = self.next_id("fake-access");
        let refresh_token = self.next_id("fake-refresh");

        self.sessions
            .insert(access_token.clone(), user_id.to_owned());
        self.refresh_tokens
            .insert(refresh_token.clone(), user_id.to_owned());

        (AccessToken::new(access_token), refresh_token)
    }
}

/// How the fake stores each kind of request.
trait FakeRecords: Reviewable {
    const RESOURCE: &'static str;
    const ID_PREFIX: &'static str;

    fn records(data: &FakeData) -> &Vec<Self>;
    fn records_mut(data: &mut FakeData) -> &mut Vec<Self>;

    /// Fill in or check the parts of a new record that depend on other data.
    fn prepare(_data: &FakeData, _owner: &User, _record: &mut Self) -> Result<(), Error> {
        Ok(())
    }

    fn transaction_type() -> TransactionType;
}

impl FakeRecords for FundRequest {
    const RESOURCE: &'static str = "fund-requests";
    const ID_PREFIX: &'static str = "fr";

    fn records(data: &FakeData) -> &Vec<Self> {
        &data.fund_requests
    }

    fn records_mut(data: &mut FakeData) -> &mut Vec<Self> {
        &mut data.fund_requests
    }

    fn transaction_type() -> TransactionType {
        TransactionType::Fund
    }
}

impl FakeRecords for TransferRequest {
    const RESOURCE: &'static str = "transfer-requests";
    const ID_PREFIX: &'static str = "tr";

    fn records(data: &FakeData) -> &Vec<Self> {
        &data.transfer_requests
    }

    fn records_mut(data: &mut FakeData) -> &mut Vec<Self> {
        &mut data.transfer_requests
    }

    fn prepare(data: &FakeData, owner: &User, record: &mut Self) -> Result<(), Error> {
        let account = data
            .accounts
            .get(&owner.id)
            .and_then(|accounts| {
                accounts
                    .iter()
                    .find(|account| account.id == record.account_id)
            })
            .ok_or_else(|| Error::Backend {
                status: 400,
                message: "The destination account does not belong to you.".to_owned(),
            })?;

        record.account = Some(AccountRef::from(account));

        Ok(())
    }

    fn transaction_type() -> TransactionType {
        TransactionType::Transfer
    }
}

/// How many seconds the fake's access tokens last unless set otherwise.
const ACCESS_TOKEN_LIFETIME_SECS: i64 = 15 * 60;

/// An in-memory backend with the same access rules as the real one.
#[derive(Debug, Default)]
pub struct FakeBackend {
    data: Mutex<FakeData>,
    fetches: Mutex<Vec<RecordedFetch>>,
    failure: Mutex<Option<Error>>,
    access_token_lifetime_secs: Option<i64>,
}

impl FakeBackend {
    /// An empty backend with no users.
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> Result<MutexGuard<'_, FakeData>, Error> {
        self.data.lock().map_err(|_| Error::StateLockError)
    }

    fn data_mut(&mut self) -> &mut FakeData {
        self.data.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Report `seconds` as the lifetime of every access token issued from now on.
    pub fn with_access_token_lifetime(mut self, seconds: i64) -> Self {
        self.access_token_lifetime_secs = Some(seconds);
        self
    }

    fn access_token_lifetime(&self) -> i64 {
        self.access_token_lifetime_secs
            .unwrap_or(ACCESS_TOKEN_LIFETIME_SECS)
    }

    /// Add a user who logs in with `password`.
    pub fn with_user(mut self, user: User, password: &str) -> Self {
        self.data_mut().users.push(FakeUser {
            user,
            password: password.to_owned(),
        });
        self
    }

    /// Add an account owned by `owner`.
    pub fn with_account(mut self, owner: &str, account: BankAccount) -> Self {
        self.data_mut()
            .accounts
            .entry(owner.to_owned())
            .or_default()
            .push(account);
        self
    }

    /// Add a transaction.
    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.data_mut().transactions.push(transaction);
        self
    }

    /// Add a fund request.
    pub fn with_fund_request(mut self, request: FundRequest) -> Self {
        self.data_mut().fund_requests.push(request);
        self
    }

    /// Add a transfer request.
    pub fn with_transfer_request(mut self, request: TransferRequest) -> Self {
        self.data_mut().transfer_requests.push(request);
        self
    }

    /// Start a session for `user_id` without going through log in.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such user.
    pub fn issue_token(&self, user_id: &str) -> Result<AccessToken, Error> {
        let mut data = self.data()?;
        data.user(user_id)?;

        Ok(data.issue_tokens(user_id).0)
    }

    /// Every list fetch received so far, oldest first.
    pub fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches
            .lock()
            .map(|fetches| fetches.clone())
            .unwrap_or_default()
    }

    /// Make every following call fail with `error`, or succeed again with `None`.
    pub fn fail_with(&self, error: Option<Error>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = error;
        }
    }

    /// The accounts owned by `user_id`, for assertions.
    pub fn accounts_of(&self, user_id: &str) -> Vec<BankAccount> {
        self.data()
            .ok()
            .and_then(|data| data.accounts.get(user_id).cloned())
            .unwrap_or_default()
    }

    /// A fund request by id, for assertions.
    pub fn fund_request(&self, id: &str) -> Option<FundRequest> {
        self.data()
            .ok()?
            .fund_requests
            .iter()
            .find(|request| request.id == id)
            .cloned()
    }

    /// A transfer request by id, for assertions.
    pub fn transfer_request(&self, id: &str) -> Option<TransferRequest> {
        self.data()
            .ok()?
            .transfer_requests
            .iter()
            .find(|request| request.id == id)
            .cloned()
    }

    /// A user by id, for assertions.
    pub fn user(&self, id: &str) -> Option<User> {
        self.data()
            .ok()?
            .user(id)
            .ok()
            .map(|fake| fake.user.clone())
    }

    fn check_failure(&self) -> Result<(), Error> {
        match self.failure.lock() {
            Ok(failure) => failure.clone().map_or(Ok(()), Err),
            Err(_) => Err(Error::StateLockError),
        }
    }

    fn record_fetch(&self, resource: &'static str, page: PageQuery, status: Option<RequestStatus>) {
        if let Ok(mut fetches) = self.fetches.lock() {
            fetches.push(RecordedFetch {
                resource,
                page,
                status,
            });
        }
    }

    fn list_requests<R: FakeRecords>(
        &self,
        token: &AccessToken,
        query: RequestQuery,
    ) -> Result<Paginated<R>, Error> {
        self.record_fetch(R::RESOURCE, query.page, query.status);
        self.check_failure()?;

        let data = self.data()?;
        let user = data.session(token)?;
        let mut records: Vec<R> = R::records(&data)
            .iter()
            .filter(|record| user.role.is_admin() || record.owner_id() == Some(user.id.as_str()))
            .filter(|record| query.status.is_none_or(|status| record.review().status == status))
            .cloned()
            .collect();
        records.sort_by_key(|record| std::cmp::Reverse(record.created_at()));

        Ok(paginate(records, query.page))
    }

    fn get_request<R: FakeRecords>(&self, token: &AccessToken, id: &str) -> Result<R, Error> {
        self.check_failure()?;

        let data = self.data()?;
        let user = data.session(token)?;

        R::records(&data)
            .iter()
            .find(|record| record.id() == id)
            .filter(|record| user.role.is_admin() || record.owner_id() == Some(user.id.as_str()))
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn create_request<R: FakeRecords>(
        &self,
        token: &AccessToken,
        draft: &R::Draft,
    ) -> Result<R, Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let user = data.session(token)?;
        let id = data.next_id(R::ID_PREFIX);
        let mut record = R::new_pending(id, &user.to_ref(), draft, OffsetDateTime::now_utc());
        R::prepare(&data, &user, &mut record)?;
        R::records_mut(&mut data).push(record.clone());

        Ok(record)
    }

    fn review_request<R: FakeRecords>(
        &self,
        token: &AccessToken,
        id: &str,
        command: &ReviewCommand,
    ) -> Result<(), Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        data.admin_session(token)?;
        let now = OffsetDateTime::now_utc();

        let record = R::records_mut(&mut data)
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or(Error::NotFound)?;

        record
            .review_mut()
            .apply(command, now)
            .map_err(|error| Error::Backend {
                status: 409,
                message: error.to_string(),
            })?;

        if record.review().status == RequestStatus::Completed {
            let description = format!("{} {}", R::KIND.label().trim_end_matches('s'), record.id());
            let amount = record.amount();
            let user = record.requester().cloned();
            let transaction_id = record
                .review()
                .transaction_id
                .clone()
                .unwrap_or_else(|| data.next_id("txn"));

            data.transactions.push(Transaction {
                id: transaction_id,
                description,
                amount,
                transaction_type: R::transaction_type(),
                status: RequestStatus::Completed,
                created_at: now,
                user,
            });
        }

        Ok(())
    }
}

fn paginate<T>(items: Vec<T>, page: PageQuery) -> Paginated<T> {
    let total = items.len() as u64;
    let skip = ((page.page.max(1) - 1) * page.limit) as usize;
    let items = items
        .into_iter()
        .skip(skip)
        .take(page.limit as usize)
        .collect();

    Paginated {
        items,
        info: PageInfo::new(page.page, page.limit, total),
    }
}

#[async_trait]
impl AuthGateway for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let fake = data
            .users
            .iter()
            .find(|fake| {
                fake.user.email.eq_ignore_ascii_case(credentials.email.trim())
                    && fake.password == credentials.password
            })
            .cloned()
            .ok_or(Error::Unauthorized)?;

        if !fake.user.is_portal_access {
            return Err(Error::Forbidden);
        }

        let (access_token, refresh_token) = data.issue_tokens(&fake.user.id);

        Ok(AuthSession {
            access_token,
            refresh_token: Some(refresh_token),
            expires_in: Some(self.access_token_lifetime()),
            user: fake.user,
        })
    }

    async fn register(&self, registration: &Registration) -> Result<(), Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let email = registration.email.trim().to_owned();

        if data
            .users
            .iter()
            .any(|fake| fake.user.email.eq_ignore_ascii_case(&email))
        {
            return Err(Error::Backend {
                status: 409,
                message: "An account with this email already exists.".to_owned(),
            });
        }

        let id = data.next_id("u");
        data.users.push(FakeUser {
            user: User {
                id,
                email,
                name: registration.name.trim().to_owned(),
                phone_number: registration.phone_number.clone(),
                role: Role::User,
                is_portal_access: false,
                is_email_verified: false,
                is_phone_verified: false,
                created_at: Some(OffsetDateTime::now_utc()),
            },
            password: registration.password.clone(),
        });

        Ok(())
    }

    async fn logout(&self, token: &AccessToken) -> Result<(), Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        data.sessions.remove(token.as_str());

        Ok(())
    }

    async fn reset_password(&self, _email: &str) -> Result<(), Error> {
        // Unknown addresses succeed too, so the reply does not reveal who is registered.
        self.check_failure()
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshedTokens, Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let user_id = data
            .refresh_tokens
            .remove(refresh_token)
            .ok_or(Error::Unauthorized)?;
        let (access_token, refresh_token) = data.issue_tokens(&user_id);

        Ok(RefreshedTokens {
            access_token,
            refresh_token: Some(refresh_token),
            expires_in: Some(self.access_token_lifetime()),
        })
    }

    async fn change_password(
        &self,
        token: &AccessToken,
        change: &PasswordChange,
    ) -> Result<(), Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let user = data.session(token)?;
        let fake = data.user_mut(&user.id)?;

        if fake.password != change.current_password {
            return Err(Error::Backend {
                status: 400,
                message: "The current password is incorrect.".to_owned(),
            });
        }

        fake.password = change.new_password.clone();

        Ok(())
    }

    async fn profile(&self, token: &AccessToken) -> Result<User, Error> {
        self.check_failure()?;

        self.data()?.session(token)
    }

    async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> Result<User, Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let user = data.session(token)?;
        let fake = data.user_mut(&user.id)?;
        fake.user.name = update.name.clone();
        fake.user.phone_number = update.phone_number.clone();

        Ok(fake.user.clone())
    }
}

#[async_trait]
impl AccountsGateway for FakeBackend {
    async fn list(
        &self,
        token: &AccessToken,
        page: PageQuery,
    ) -> Result<Paginated<BankAccount>, Error> {
        self.record_fetch("accounts", page, None);
        self.check_failure()?;

        let data = self.data()?;
        let user = data.session(token)?;
        let accounts = data.accounts.get(&user.id).cloned().unwrap_or_default();

        Ok(paginate(accounts, page))
    }

    async fn get(&self, token: &AccessToken, id: &str) -> Result<BankAccount, Error> {
        self.check_failure()?;

        let data = self.data()?;
        let user = data.session(token)?;

        data.accounts
            .get(&user.id)
            .and_then(|accounts| accounts.iter().find(|account| account.id == id))
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn create(
        &self,
        token: &AccessToken,
        draft: &AccountDraft,
    ) -> Result<BankAccount, Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let user = data.session(token)?;
        let id = data.next_id("acc");
        let accounts = data.accounts.entry(user.id).or_default();
        let account = BankAccount {
            id,
            holder_name: draft.holder_name.clone(),
            account_number: draft.account_number.clone(),
            ifsc_code: draft.ifsc_code.clone(),
            balance: 0.0,
            // A user's first account becomes their default.
            is_default: accounts.is_empty(),
        };
        accounts.push(account.clone());

        Ok(account)
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: &str,
        draft: &AccountDraft,
    ) -> Result<BankAccount, Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let user = data.session(token)?;
        let account = data
            .accounts
            .get_mut(&user.id)
            .and_then(|accounts| accounts.iter_mut().find(|account| account.id == id))
            .ok_or(Error::NotFound)?;

        account.holder_name = draft.holder_name.clone();
        account.account_number = draft.account_number.clone();
        account.ifsc_code = draft.ifsc_code.clone();

        Ok(account.clone())
    }

    async fn delete(&self, token: &AccessToken, id: &str) -> Result<(), Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let user = data.session(token)?;
        let accounts = data.accounts.get_mut(&user.id).ok_or(Error::NotFound)?;
        let position = accounts
            .iter()
            .position(|account| account.id == id)
            .ok_or(Error::NotFound)?;
        accounts.remove(position);

        Ok(())
    }

    async fn set_default(&self, token: &AccessToken, id: &str) -> Result<(), Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        let user = data.session(token)?;
        let accounts = data.accounts.get_mut(&user.id).ok_or(Error::NotFound)?;

        set_default_account(accounts, id)
    }
}

#[async_trait]
impl TransactionsGateway for FakeBackend {
    async fn list(
        &self,
        token: &AccessToken,
        page: PageQuery,
    ) -> Result<Paginated<Transaction>, Error> {
        self.record_fetch("transactions", page, None);
        self.check_failure()?;

        let data = self.data()?;
        let user = data.session(token)?;
        let mut transactions: Vec<Transaction> = data
            .transactions
            .iter()
            .filter(|transaction| {
                user.role.is_admin()
                    || transaction
                        .user
                        .as_ref()
                        .is_some_and(|owner| owner.id == user.id)
            })
            .cloned()
            .collect();
        transactions.sort_by_key(|transaction| std::cmp::Reverse(transaction.created_at));

        Ok(paginate(transactions, page))
    }

    async fn get(&self, token: &AccessToken, id: &str) -> Result<Transaction, Error> {
        self.check_failure()?;

        let data = self.data()?;
        let user = data.session(token)?;

        data.transactions
            .iter()
            .find(|transaction| transaction.id == id)
            .filter(|transaction| {
                user.role.is_admin()
                    || transaction
                        .user
                        .as_ref()
                        .is_some_and(|owner| owner.id == user.id)
            })
            .cloned()
            .ok_or(Error::NotFound)
    }
}

macro_rules! fake_requests_gateway {
    ($request:ty) => {
        #[async_trait]
        impl RequestsGateway<$request> for FakeBackend {
            async fn list(
                &self,
                token: &AccessToken,
                query: RequestQuery,
            ) -> Result<Paginated<$request>, Error> {
                self.list_requests(token, query)
            }

            async fn get(&self, token: &AccessToken, id: &str) -> Result<$request, Error> {
                self.get_request(token, id)
            }

            async fn create(
                &self,
                token: &AccessToken,
                draft: &<$request as Reviewable>::Draft,
            ) -> Result<$request, Error> {
                self.create_request::<$request>(token, draft)
            }

            async fn process(
                &self,
                token: &AccessToken,
                id: &str,
                input: &ProcessInput,
            ) -> Result<(), Error> {
                self.review_request::<$request>(token, id, &ReviewCommand::Process(input.clone()))
            }

            async fn approve(&self, token: &AccessToken, id: &str) -> Result<(), Error> {
                self.review_request::<$request>(token, id, &ReviewCommand::Approve)
            }

            async fn reject(
                &self,
                token: &AccessToken,
                id: &str,
                reason: &str,
            ) -> Result<(), Error> {
                let command = ReviewCommand::Reject {
                    reason: reason.to_owned(),
                };

                self.review_request::<$request>(token, id, &command)
            }
        }
    };
}

fake_requests_gateway!(FundRequest);
fake_requests_gateway!(TransferRequest);

#[async_trait]
impl UsersGateway for FakeBackend {
    async fn list_pending(
        &self,
        token: &AccessToken,
        page: PageQuery,
    ) -> Result<Paginated<User>, Error> {
        self.record_fetch("pending-users", page, None);
        self.check_failure()?;

        let data = self.data()?;
        data.admin_session(token)?;
        let users = data
            .users
            .iter()
            .filter(|fake| !fake.user.is_portal_access)
            .map(|fake| fake.user.clone())
            .collect();

        Ok(paginate(users, page))
    }

    async fn get(&self, token: &AccessToken, id: &str) -> Result<User, Error> {
        self.check_failure()?;

        let data = self.data()?;
        let session = data.session(token)?;

        if !session.role.is_admin() && session.id != id {
            return Err(Error::Forbidden);
        }

        data.user(id).map(|fake| fake.user.clone())
    }

    async fn set_portal_access(
        &self,
        token: &AccessToken,
        id: &str,
        is_portal_access: bool,
    ) -> Result<(), Error> {
        self.check_failure()?;

        let mut data = self.data()?;
        data.admin_session(token)?;
        data.user_mut(id)?.user.is_portal_access = is_portal_access;

        Ok(())
    }
}

fn demo_user(id: &str, name: &str, email: &str, role: Role, is_portal_access: bool) -> User {
    User {
        id: id.to_owned(),
        email: email.to_owned(),
        name: name.to_owned(),
        phone_number: Some(format!("+91 98{:08}", id.len() * 1_234_567)),
        role,
        is_portal_access,
        is_email_verified: is_portal_access || id.ends_with('1'),
        is_phone_verified: is_portal_access,
        created_at: Some(datetime!(2024-11-01 09:00 UTC)),
    }
}

fn demo_account(id: &str, holder_name: &str, number: &str, ifsc: &str, balance: f64) -> BankAccount {
    BankAccount {
        id: id.to_owned(),
        holder_name: holder_name.to_owned(),
        account_number: number.to_owned(),
        ifsc_code: ifsc.to_owned(),
        balance,
        is_default: false,
    }
}

/// The review state a demo request ends up in, cycling through the workflow.
fn demo_review(index: usize, created_at: OffsetDateTime) -> ReviewState {
    const REASONS: [&str; 3] = [
        "Payment not received",
        "Amount does not match payment",
        "Duplicate request",
    ];

    let mut review = ReviewState::pending();
    let updated_at = Some(created_at + Duration::hours(3));

    match index % 5 {
        2 => {
            review.status = RequestStatus::Processing;
            review.transaction_id = Some(format!("UTR{:08}", 40_000_000 + index * 7));
            review.updated_at = updated_at;
        }
        3 => {
            review.status = RequestStatus::Completed;
            review.transaction_id = Some(format!("UTR{:08}", 40_000_000 + index * 7));
            review.updated_at = updated_at;
        }
        4 => {
            review.status = RequestStatus::Rejected;
            review.rejection_reason = Some(REASONS[index % REASONS.len()].to_owned());
            review.updated_at = updated_at;
        }
        _ => {}
    }

    review
}

impl FakeBackend {
    /// A backend seeded with an admin, two customers, users waiting for
    /// portal access, and enough requests to fill several pages.
    ///
    /// Every demo user logs in with [DEMO_PASSWORD].
    pub fn with_demo_data() -> Self {
        let admin = demo_user("u-admin", "Priya Sharma", DEMO_ADMIN_EMAIL, Role::Admin, true);
        let asha = demo_user("u-asha", "Asha Rao", DEMO_USER_EMAIL, Role::User, true);
        let ravi = demo_user("u-ravi", "Ravi Kumar", "ravi@bankdesk.test", Role::User, true);
        let customers = [asha.clone(), ravi.clone()];

        let mut backend = Self::new()
            .with_user(admin, DEMO_PASSWORD)
            .with_user(asha.clone(), DEMO_PASSWORD)
            .with_user(ravi.clone(), DEMO_PASSWORD);

        for (index, (name, email)) in [
            ("Meera Iyer", "meera@bankdesk.test"),
            ("Karan Mehta", "karan@bankdesk.test"),
            ("Farah Khan", "farah@bankdesk.test"),
            ("Vikram Singh", "vikram@bankdesk.test"),
        ]
        .into_iter()
        .enumerate()
        {
            let id = format!("u-pending-{}", index + 1);
            backend = backend.with_user(
                demo_user(&id, name, email, Role::User, false),
                DEMO_PASSWORD,
            );
        }

        let mut asha_primary = demo_account(
            "acc-asha-1",
            "Asha Rao",
            "501002345678",
            "HDFC0001234",
            125_000.5,
        );
        asha_primary.is_default = true;
        let asha_savings = demo_account(
            "acc-asha-2",
            "Asha Rao",
            "32109876543",
            "SBIN0004567",
            48_000.0,
        );
        let mut ravi_primary = demo_account(
            "acc-ravi-1",
            "Ravi Kumar",
            "004401234567",
            "ICIC0000044",
            9_870.25,
        );
        ravi_primary.is_default = true;

        let destinations = [
            (asha.clone(), AccountRef::from(&asha_primary)),
            (asha.clone(), AccountRef::from(&asha_savings)),
            (ravi.clone(), AccountRef::from(&ravi_primary)),
        ];

        backend = backend
            .with_account(&asha.id, asha_primary)
            .with_account(&asha.id, asha_savings)
            .with_account(&ravi.id, ravi_primary);

        let start = datetime!(2025-01-06 09:15 UTC);
        const PAYMENT_METHODS: [&str; 4] = ["UPI", "NEFT", "IMPS", "RTGS"];

        for index in 0..24 {
            let owner = &customers[index % customers.len()];
            let created_at = start + Duration::hours(7 * index as i64);

            backend = backend.with_fund_request(FundRequest {
                id: format!("fr-{:03}", index + 1),
                user_id: owner.id.clone(),
                amount: 1_000.0 + 250.0 * index as f64,
                currency: "INR".to_owned(),
                payment_method: PAYMENT_METHODS[index % PAYMENT_METHODS.len()].to_owned(),
                created_at,
                review: demo_review(index, created_at),
                user: Some(owner.to_ref()),
            });
        }

        const PURPOSES: [&str; 4] = ["Rent", "School fees", "Savings", "Supplier payment"];

        for index in 0..12 {
            let (owner, account) = &destinations[index % destinations.len()];
            let created_at = start + Duration::hours(11 * index as i64 + 5);

            backend = backend.with_transfer_request(TransferRequest {
                id: format!("tr-{:03}", index + 1),
                account_id: account.id.clone(),
                amount: 2_500.0 + 500.0 * index as f64,
                description: PURPOSES[index % PURPOSES.len()].to_owned(),
                created_at,
                review: demo_review(index + 1, created_at),
                account: Some(account.clone()),
                user: Some(owner.to_ref()),
            });
        }

        const DESCRIPTIONS: [&str; 6] = [
            "Salary",
            "Rent",
            "Groceries",
            "Electricity bill",
            "Fund request",
            "Transfer to savings",
        ];
        const TYPES: [TransactionType; 6] = [
            TransactionType::Credit,
            TransactionType::Debit,
            TransactionType::Debit,
            TransactionType::Debit,
            TransactionType::Fund,
            TransactionType::Transfer,
        ];

        for index in 0..30 {
            let owner = &customers[index % customers.len()];
            let status = match index % 7 {
                0 => RequestStatus::Pending,
                1 => RequestStatus::Processing,
                6 => RequestStatus::Rejected,
                _ => RequestStatus::Completed,
            };

            backend = backend.with_transaction(Transaction {
                id: format!("txn-{:03}", index + 1),
                description: DESCRIPTIONS[index % DESCRIPTIONS.len()].to_owned(),
                amount: 750.0 + 310.5 * index as f64,
                transaction_type: TYPES[index % TYPES.len()],
                status,
                created_at: start + Duration::hours(5 * index as i64),
                user: Some(owner.to_ref()),
            });
        }

        backend
    }
}
