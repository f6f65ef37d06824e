//! The typed client for the banking REST backend.
//!
//! Each resource has one gateway trait. [ApiClient] implements every trait
//! over HTTP and [FakeBackend] implements them in memory for tests and demo
//! mode, so handlers never branch on which backend they talk to.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

mod accounts;
mod auth;
mod client;
mod envelope;
mod fake;
mod requests;
mod transactions;
mod users;

pub use accounts::AccountsGateway;
pub use auth::{AuthGateway, AuthSession, Credentials, PasswordChange, RefreshedTokens, Registration};
pub use client::ApiClient;
pub use fake::{DEMO_ADMIN_EMAIL, DEMO_PASSWORD, DEMO_USER_EMAIL, FakeBackend, RecordedFetch};
pub use requests::{RequestQuery, RequestsGateway};
pub use transactions::TransactionsGateway;
pub use users::UsersGateway;

use crate::{
    request::{FundRequest, Reviewable, TransferRequest},
    store::Slice,
};

/// A bearer token issued by the backend.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// The gateways for every backend resource.
#[derive(Clone)]
pub struct Gateways {
    /// Log in, registration and profile.
    pub auth: Arc<dyn AuthGateway>,
    /// Bank accounts.
    pub accounts: Arc<dyn AccountsGateway>,
    /// Completed and in-flight transactions.
    pub transactions: Arc<dyn TransactionsGateway>,
    /// Fund requests and their review.
    pub fund_requests: Arc<dyn RequestsGateway<FundRequest>>,
    /// Transfer requests and their review.
    pub transfer_requests: Arc<dyn RequestsGateway<TransferRequest>>,
    /// Users and portal access.
    pub users: Arc<dyn UsersGateway>,
}

impl Gateways {
    /// Talk to the backend over HTTP.
    pub fn http(client: ApiClient) -> Self {
        let client = Arc::new(client);

        Self {
            auth: client.clone(),
            accounts: client.clone(),
            transactions: client.clone(),
            fund_requests: client.clone(),
            transfer_requests: client.clone(),
            users: client,
        }
    }

    /// Serve everything from the in-memory backend.
    pub fn fake(backend: Arc<FakeBackend>) -> Self {
        Self {
            auth: backend.clone(),
            accounts: backend.clone(),
            transactions: backend.clone(),
            fund_requests: backend.clone(),
            transfer_requests: backend.clone(),
            users: backend,
        }
    }
}

/// A kind of request along with where [Gateways] keeps its gateway.
pub trait RequestResource: Reviewable + Slice {
    fn gateway(gateways: &Gateways) -> Arc<dyn RequestsGateway<Self>>;
}

impl RequestResource for FundRequest {
    fn gateway(gateways: &Gateways) -> Arc<dyn RequestsGateway<Self>> {
        gateways.fund_requests.clone()
    }
}

impl RequestResource for TransferRequest {
    fn gateway(gateways: &Gateways) -> Arc<dyn RequestsGateway<Self>> {
        gateways.transfer_requests.clone()
    }
}

impl fmt::Debug for Gateways {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateways").finish_non_exhaustive()
    }
}
