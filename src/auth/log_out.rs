//! Log-out route handler that ends the backend session, invalidates the auth cookie and redirects users.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState,
    api::AuthGateway,
    auth::{cookie::get_token_from_cookies, invalidate_auth_cookie},
    endpoints,
    store::SessionStores,
};

#[derive(Clone)]
pub struct LogOutState {
    pub cookie_key: Key,
    pub auth: Arc<dyn AuthGateway>,
    pub stores: SessionStores,
}

impl FromRef<AppState> for LogOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            auth: state.gateways.auth.clone(),
            stores: state.stores.clone(),
        }
    }
}

impl FromRef<LogOutState> for Key {
    fn from_ref(state: &LogOutState) -> Self {
        state.cookie_key.clone()
    }
}

/// End the session, forget the user's cached lists, invalidate the auth
/// cookie and redirect the client to the log-in page.
///
/// Also the landing spot for requests whose session the backend rejected, so
/// a missing or stale cookie is not an error here.
pub async fn get_log_out(State(state): State<LogOutState>, jar: PrivateCookieJar) -> Response {
    if let Ok(token) = get_token_from_cookies(&jar) {
        if let Err(error) = state.auth.logout(&token.access_token).await {
            tracing::warn!("Could not end the backend session for {}: {error}", token.user_id);
        }

        if let Err(error) = state.stores.clear(&token.user_id) {
            tracing::error!("Could not clear the cached lists for {}: {error}", token.user_id);
        }

        tracing::info!("User {} logged out", token.user_id);
    }

    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{
        body::Body,
        extract::{FromRef, State},
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::{Duration, OffsetDateTime};

    use crate::{
        api::{AccountsGateway, AuthSession},
        auth::{COOKIE_TOKEN, Token, set_auth_cookie},
        endpoints,
        pagination::PageQuery,
        store::FetchKey,
        test_utils::{demo_backend, test_state},
    };

    use super::{LogOutState, get_log_out};

    #[tokio::test]
    async fn log_out_invalidates_auth_cookie_and_redirects() {
        let backend = demo_backend();
        let app_state = test_state(backend.clone());
        let state = LogOutState::from_ref(&app_state);
        let access_token = backend.issue_token("u-asha").unwrap();
        let session = AuthSession {
            access_token: access_token.clone(),
            refresh_token: None,
            expires_in: None,
            user: backend.user("u-asha").unwrap(),
        };
        let jar = set_auth_cookie(
            PrivateCookieJar::new(state.cookie_key.clone()),
            &Token::new(&session, Duration::minutes(30)),
        )
        .unwrap();
        let page = PageQuery { page: 1, limit: 20 };
        app_state
            .stores
            .load("u-asha", FetchKey::new(page, ""), false, || {
                AccountsGateway::list(backend.as_ref(), &access_token, page)
            })
            .await
            .unwrap();

        let response = get_log_out(State(state), jar).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        assert_cookie_expired(&response);
        let cached = app_state
            .stores
            .select("u-asha", |store| store.accounts.key.clone())
            .unwrap();
        assert_eq!(cached, None, "cached lists should be dropped");
        assert!(
            AccountsGateway::list(backend.as_ref(), &access_token, page)
                .await
                .is_err(),
            "the backend session should be ended"
        );
    }

    #[tokio::test]
    async fn log_out_without_cookie_still_redirects() {
        let state = LogOutState::from_ref(&test_state(demo_backend()));
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_log_out(State(state), jar).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
    }

    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    fn assert_cookie_expired(response: &Response<Body>) {
        let mut found = false;

        for cookie_header in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_header.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            if cookie.name() != COOKIE_TOKEN {
                continue;
            }

            found = true;
            assert_eq!(
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
                "got expires {:?}, want {:?}",
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
            );
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }

        assert!(found, "expected the auth cookie to be invalidated");
    }
}
