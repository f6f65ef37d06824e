use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::{
    Error,
    pagination::{PageQuery, Paginated},
    user::User,
};

use super::{AccessToken, ApiClient, client::ApiPath};

const PENDING_USERS: &str = "/users/pending";
const USERS: &str = "/users";

/// Admin access to registered users.
#[async_trait]
pub trait UsersGateway: Send + Sync {
    /// One page of users waiting for portal access.
    async fn list_pending(
        &self,
        token: &AccessToken,
        page: PageQuery,
    ) -> Result<Paginated<User>, Error>;

    /// A single user.
    async fn get(&self, token: &AccessToken, id: &str) -> Result<User, Error>;

    /// Grant or revoke a user's access to the portal.
    async fn set_portal_access(
        &self,
        token: &AccessToken,
        id: &str,
        is_portal_access: bool,
    ) -> Result<(), Error>;
}

#[async_trait]
impl UsersGateway for ApiClient {
    async fn list_pending(
        &self,
        token: &AccessToken,
        page: PageQuery,
    ) -> Result<Paginated<User>, Error> {
        self.fetch_page(PENDING_USERS, token, page, &[]).await
    }

    async fn get(&self, token: &AccessToken, id: &str) -> Result<User, Error> {
        self.fetch(ApiPath::from(USERS).push(id), Some(token))
            .await
    }

    async fn set_portal_access(
        &self,
        token: &AccessToken,
        id: &str,
        is_portal_access: bool,
    ) -> Result<(), Error> {
        let body = json!({ "isPortalAccess": is_portal_access });
        let path = ApiPath::from(USERS).push(id).push("portal-access");

        self.send_without_reply(Method::PUT, path, Some(token), Some(&body))
            .await
    }
}
