//! The HTTP transport shared by every gateway.

use std::{fmt, time::Duration};

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Error,
    pagination::{PageQuery, Paginated},
};

use super::{AccessToken, envelope};

/// A path on the backend, kept as separate segments until it is joined onto
/// the base URL.
///
/// Segments added with [ApiPath::push] are escaped as a whole, so an ID
/// holding `/`, `?` or `#` stays one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ApiPath(Vec<String>);

impl ApiPath {
    /// Append `segment`, such as a record ID or an action name.
    pub(super) fn push(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }
}

impl From<&str> for ApiPath {
    fn from(path: &str) -> Self {
        Self(
            path.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }

        Ok(())
    }
}

/// A client for the banking REST backend.
///
/// Every response passes through the envelope normalization in
/// [decode_payload](super::envelope::decode_payload), so gateways only see
/// the payload they asked for.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidApiUrl] if `base_url` is not an absolute http(s) URL,
    /// or [Error::Network] if the HTTP client could not be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| Error::InvalidApiUrl(base_url.to_owned()))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::InvalidApiUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::Network(error.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// The absolute URL for a backend path such as `/accounts`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if a segment is empty, `.` or `..`, since
    /// those would drop out of the URL and address a different resource.
    pub(super) fn url(&self, path: &ApiPath) -> Result<Url, Error> {
        if path
            .0
            .iter()
            .any(|segment| matches!(segment.as_str(), "" | "." | ".."))
        {
            return Err(Error::NotFound);
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidApiUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(&path.0);

        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        path: impl Into<ApiPath>,
        token: Option<&AccessToken>,
    ) -> Result<RequestBuilder, Error> {
        let request = self.http.request(method, self.url(&path.into())?);

        Ok(match token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        })
    }

    /// GET a single payload.
    pub(super) async fn fetch<T: DeserializeOwned>(
        &self,
        path: impl Into<ApiPath> + Send,
        token: Option<&AccessToken>,
    ) -> Result<T, Error> {
        let body = self.execute(self.request(Method::GET, path, token)?).await?;

        envelope::decode_payload(&body)
    }

    /// GET one page of a collection.
    pub(super) async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: impl Into<ApiPath> + Send,
        token: &AccessToken,
        page: PageQuery,
        filters: &[(&str, &str)],
    ) -> Result<Paginated<T>, Error> {
        let request = self
            .request(Method::GET, path, Some(token))?
            .query(&page)
            .query(filters);
        let body = self.execute(request).await?;

        envelope::decode_page(&body, page)
    }

    /// Send `body` as JSON and decode the payload of the reply.
    pub(super) async fn send<T, B>(
        &self,
        method: Method,
        path: impl Into<ApiPath> + Send,
        token: Option<&AccessToken>,
        body: Option<&B>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path, token)?;

        if let Some(body) = body {
            request = request.json(body);
        }

        let body = self.execute(request).await?;

        envelope::decode_payload(&body)
    }

    /// Send `body` as JSON and only check that the backend accepted it.
    pub(super) async fn send_without_reply<B>(
        &self,
        method: Method,
        path: impl Into<ApiPath> + Send,
        token: Option<&AccessToken>,
        body: Option<&B>,
    ) -> Result<(), Error>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path, token)?;

        if let Some(body) = body {
            request = request.json(body);
        }

        let body = self.execute(request).await?;

        envelope::ensure_success(&body)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String, Error> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_owned();
        let body = response.text().await?;

        tracing::debug!("Backend replied {status} for {url}");

        if status.is_success() {
            return Ok(body);
        }

        Err(error_for_status(status, &body))
    }
}

/// Map a non-success reply onto the crate error taxonomy.
fn error_for_status(status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized,
        StatusCode::FORBIDDEN => Error::Forbidden,
        StatusCode::NOT_FOUND => Error::NotFound,
        status => Error::Backend {
            status: status.as_u16(),
            message: envelope::error_message(body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_owned()
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::{fmt, time::Duration};

    use reqwest::StatusCode;

    use crate::Error;

    use super::{ApiClient, ApiPath, error_for_status};

    #[test]
    fn rejects_relative_base_url() {
        let got = ApiClient::new("api.example.com", Duration::from_secs(1));

        assert!(matches!(got, Err(Error::InvalidApiUrl(_))));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let got = ApiClient::new("ftp://example.com", Duration::from_secs(1));

        assert!(matches!(got, Err(Error::InvalidApiUrl(_))));
    }

    #[test]
    fn joins_paths_onto_base_path() {
        let client = ApiClient::new("https://bank.example.com/api/v1/", Duration::from_secs(1))
            .expect("valid URL");

        let url = client.url(&ApiPath::from("/accounts").push("acc-1")).unwrap();

        assert_eq!(url.as_str(), "https://bank.example.com/api/v1/accounts/acc-1");
    }

    #[test]
    fn joins_paths_onto_bare_host() {
        let client = ApiClient::new("https://bank.example.com", Duration::from_secs(1))
            .expect("valid URL");

        let url = client.url(&ApiPath::from("/users/pending")).unwrap();

        assert_eq!(url.as_str(), "https://bank.example.com/users/pending");
    }

    #[test]
    fn ids_cannot_leave_their_segment() {
        let client = ApiClient::new("https://bank.example.com/api", Duration::from_secs(1))
            .expect("valid URL");

        let traversal = client
            .url(&ApiPath::from("/accounts").push("../users/u-2/portal-access"))
            .unwrap();
        let query = client
            .url(&ApiPath::from("/accounts").push("a1?admin=true#x"))
            .unwrap();

        assert_eq!(
            traversal.as_str(),
            "https://bank.example.com/api/accounts/..%2Fusers%2Fu-2%2Fportal-access"
        );
        assert_eq!(traversal.query(), None);
        assert_eq!(
            query.as_str(),
            "https://bank.example.com/api/accounts/a1%3Fadmin=true%23x"
        );
        assert_eq!(query.query(), None);
        assert_eq!(query.fragment(), None);
    }

    #[test]
    fn dot_segment_ids_are_not_found() {
        let client = ApiClient::new("https://bank.example.com/api", Duration::from_secs(1))
            .expect("valid URL");

        for id in ["..", ".", ""] {
            let got = client.url(&ApiPath::from("/accounts").push(id));

            assert_eq!(got, Err(Error::NotFound), "id {id:?}");
        }
    }

    #[test]
    fn maps_auth_statuses() {
        assert_eq!(
            error_for_status(StatusCode::UNAUTHORIZED, ""),
            Error::Unauthorized
        );
        assert_eq!(error_for_status(StatusCode::FORBIDDEN, ""), Error::Forbidden);
        assert_eq!(error_for_status(StatusCode::NOT_FOUND, ""), Error::NotFound);
    }

    #[test]
    fn backend_error_uses_envelope_message() {
        let got = error_for_status(
            StatusCode::CONFLICT,
            r#"{"status":"error","message":"Request already processed","data":null}"#,
        );

        assert_eq!(
            got,
            Error::Backend {
                status: 409,
                message: "Request already processed".to_owned()
            }
        );
    }

    #[test]
    fn backend_error_without_body_uses_reason_phrase() {
        let got = error_for_status(StatusCode::BAD_GATEWAY, "");

        assert_eq!(
            got,
            Error::Backend {
                status: 502,
                message: "Bad Gateway".to_owned()
            }
        );
    }
}
