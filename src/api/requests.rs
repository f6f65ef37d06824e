use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::{
    Error,
    pagination::{PageQuery, Paginated},
    request::{ProcessInput, RequestStatus, ReviewCommand, Reviewable},
};

use super::{AccessToken, ApiClient, client::ApiPath};

/// The parameters for listing fund or transfer requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestQuery {
    /// The page to fetch.
    pub page: PageQuery,
    /// Only requests with this status, or all requests.
    pub status: Option<RequestStatus>,
}

/// Fund or transfer requests and their review.
///
/// Users see their own requests and admins see everyone's. The review
/// actions are admin only.
#[async_trait]
pub trait RequestsGateway<R: Reviewable>: Send + Sync {
    /// One page of requests, newest first.
    async fn list(&self, token: &AccessToken, query: RequestQuery) -> Result<Paginated<R>, Error>;

    /// A single request.
    async fn get(&self, token: &AccessToken, id: &str) -> Result<R, Error>;

    /// Raise a new request, which starts out pending.
    async fn create(&self, token: &AccessToken, draft: &R::Draft) -> Result<R, Error>;

    /// Move a pending request to processing with the bank transaction ID.
    async fn process(
        &self,
        token: &AccessToken,
        id: &str,
        input: &ProcessInput,
    ) -> Result<(), Error>;

    /// Complete a processing request.
    async fn approve(&self, token: &AccessToken, id: &str) -> Result<(), Error>;

    /// Reject a processing request.
    async fn reject(&self, token: &AccessToken, id: &str, reason: &str) -> Result<(), Error>;

    /// Send a validated review action to the matching endpoint.
    async fn review(
        &self,
        token: &AccessToken,
        id: &str,
        command: &ReviewCommand,
    ) -> Result<(), Error> {
        match command {
            ReviewCommand::Process(input) => self.process(token, id, input).await,
            ReviewCommand::Approve => self.approve(token, id).await,
            ReviewCommand::Reject { reason } => self.reject(token, id, reason).await,
        }
    }
}

fn item_path<R: Reviewable>(id: &str) -> ApiPath {
    ApiPath::from(R::KIND.api_path()).push(id)
}

fn action_path<R: Reviewable>(id: &str, action: &str) -> ApiPath {
    item_path::<R>(id).push(action)
}

fn reject_body(reason: &str) -> serde_json::Value {
    json!({ "reason": reason })
}

#[async_trait]
impl<R: Reviewable> RequestsGateway<R> for ApiClient {
    async fn list(&self, token: &AccessToken, query: RequestQuery) -> Result<Paginated<R>, Error> {
        let status = query.status.map(RequestStatus::as_query_value);
        let filters: Vec<(&str, &str)> = status
            .into_iter()
            .map(|status| ("status", status))
            .collect();

        self.fetch_page(R::KIND.api_path(), token, query.page, &filters)
            .await
    }

    async fn get(&self, token: &AccessToken, id: &str) -> Result<R, Error> {
        self.fetch(item_path::<R>(id), Some(token)).await
    }

    async fn create(&self, token: &AccessToken, draft: &R::Draft) -> Result<R, Error> {
        self.send(Method::POST, R::KIND.api_path(), Some(token), Some(draft))
            .await
    }

    async fn process(
        &self,
        token: &AccessToken,
        id: &str,
        input: &ProcessInput,
    ) -> Result<(), Error> {
        self.send_without_reply(
            Method::POST,
            action_path::<R>(id, "process"),
            Some(token),
            Some(input),
        )
        .await
    }

    async fn approve(&self, token: &AccessToken, id: &str) -> Result<(), Error> {
        self.send_without_reply::<()>(
            Method::POST,
            action_path::<R>(id, "approve"),
            Some(token),
            None,
        )
        .await
    }

    async fn reject(&self, token: &AccessToken, id: &str, reason: &str) -> Result<(), Error> {
        let body = reject_body(reason);

        self.send_without_reply(
            Method::POST,
            action_path::<R>(id, "reject"),
            Some(token),
            Some(&body),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use crate::{
        api::ApiClient,
        request::{FundRequest, TransferRequest},
    };

    use super::{action_path, item_path, reject_body};

    #[test]
    fn paths_follow_request_kind() {
        assert_eq!(
            item_path::<FundRequest>("fr-1").to_string(),
            "/fund-requests/fr-1"
        );
        assert_eq!(
            action_path::<TransferRequest>("tr-1", "reject").to_string(),
            "/transfer-requests/tr-1/reject"
        );
    }

    #[test]
    fn request_id_stays_one_segment() {
        let client = ApiClient::new("https://bank.example.com/api", Duration::from_secs(1))
            .expect("valid URL");

        let url = client
            .url(&action_path::<FundRequest>("../../users/u-2", "approve"))
            .unwrap();

        assert_eq!(url.path(), "/api/fund-requests/..%2F..%2Fusers%2Fu-2/approve");
    }

    #[test]
    fn reject_body_carries_reason() {
        assert_eq!(
            reject_body("Insufficient documents"),
            json!({ "reason": "Insufficient documents" })
        );
    }
}
