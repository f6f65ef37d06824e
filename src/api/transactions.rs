use async_trait::async_trait;

use crate::{
    Error,
    pagination::{PageQuery, Paginated},
    transaction::Transaction,
};

use super::{AccessToken, ApiClient, client::ApiPath};

const TRANSACTIONS: &str = "/transactions";

/// Transactions visible to the logged in user. Admins see everyone's.
#[async_trait]
pub trait TransactionsGateway: Send + Sync {
    /// One page of transactions, newest first.
    async fn list(
        &self,
        token: &AccessToken,
        page: PageQuery,
    ) -> Result<Paginated<Transaction>, Error>;

    /// A single transaction.
    async fn get(&self, token: &AccessToken, id: &str) -> Result<Transaction, Error>;
}

#[async_trait]
impl TransactionsGateway for ApiClient {
    async fn list(
        &self,
        token: &AccessToken,
        page: PageQuery,
    ) -> Result<Paginated<Transaction>, Error> {
        self.fetch_page(TRANSACTIONS, token, page, &[]).await
    }

    async fn get(&self, token: &AccessToken, id: &str) -> Result<Transaction, Error> {
        self.fetch(ApiPath::from(TRANSACTIONS).push(id), Some(token))
            .await
    }
}
