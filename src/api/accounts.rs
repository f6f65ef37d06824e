use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::{
    Error,
    account::{AccountDraft, BankAccount},
    pagination::{PageQuery, Paginated},
};

use super::{AccessToken, ApiClient, client::ApiPath};

const ACCOUNTS: &str = "/accounts";

/// The user's bank accounts.
#[async_trait]
pub trait AccountsGateway: Send + Sync {
    /// One page of the user's accounts.
    async fn list(
        &self,
        token: &AccessToken,
        page: PageQuery,
    ) -> Result<Paginated<BankAccount>, Error>;

    /// A single account.
    async fn get(&self, token: &AccessToken, id: &str) -> Result<BankAccount, Error>;

    /// Register a new account.
    async fn create(
        &self,
        token: &AccessToken,
        draft: &AccountDraft,
    ) -> Result<BankAccount, Error>;

    /// Replace the details of an account.
    async fn update(
        &self,
        token: &AccessToken,
        id: &str,
        draft: &AccountDraft,
    ) -> Result<BankAccount, Error>;

    /// Remove an account.
    async fn delete(&self, token: &AccessToken, id: &str) -> Result<(), Error>;

    /// Make an account the user's only default account.
    async fn set_default(&self, token: &AccessToken, id: &str) -> Result<(), Error>;
}

fn account_path(id: &str) -> ApiPath {
    ApiPath::from(ACCOUNTS).push(id)
}

#[async_trait]
impl AccountsGateway for ApiClient {
    async fn list(
        &self,
        token: &AccessToken,
        page: PageQuery,
    ) -> Result<Paginated<BankAccount>, Error> {
        self.fetch_page(ACCOUNTS, token, page, &[]).await
    }

    async fn get(&self, token: &AccessToken, id: &str) -> Result<BankAccount, Error> {
        self.fetch(account_path(id), Some(token)).await
    }

    async fn create(
        &self,
        token: &AccessToken,
        draft: &AccountDraft,
    ) -> Result<BankAccount, Error> {
        self.send(Method::POST, ACCOUNTS, Some(token), Some(draft)).await
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: &str,
        draft: &AccountDraft,
    ) -> Result<BankAccount, Error> {
        self.send(Method::PUT, account_path(id), Some(token), Some(draft)).await
    }

    async fn delete(&self, token: &AccessToken, id: &str) -> Result<(), Error> {
        self.send_without_reply::<()>(Method::DELETE, account_path(id), Some(token), None)
            .await
    }

    async fn set_default(&self, token: &AccessToken, id: &str) -> Result<(), Error> {
        // The backend clears the flag on the user's other accounts.
        let body = json!({ "isDefault": true });

        self.send_without_reply(Method::PUT, account_path(id), Some(token), Some(&body))
            .await
    }
}
