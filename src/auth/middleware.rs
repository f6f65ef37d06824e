//! Authentication middleware that validates cookies, refreshes sessions, and handles redirects.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    api::{AccessToken, AuthGateway},
    auth::{
        Token,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
        token::access_expiry,
    },
    endpoints,
    user::{Role, UserId},
};

/// How close to expiry an access token has to be before it is refreshed.
const REFRESH_WINDOW: Duration = Duration::minutes(5);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// Used to refresh the backend token before it expires.
    pub auth: Arc<dyn AuthGateway>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            auth: state.gateways.auth.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// The logged in user, placed in the request extensions by the auth guards.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    pub access_token: AccessToken,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&Token> for Session {
    fn from(token: &Token) -> Self {
        Self {
            user_id: token.user_id.clone(),
            name: token.name.clone(),
            role: token.role,
            access_token: token.access_token.clone(),
        }
    }
}

/// Swap the backend tokens for fresh ones if the access token is about to expire.
///
/// A failed refresh keeps the old tokens: the backend answers 401 once the
/// access token is no longer accepted.
async fn refresh_if_needed(auth: &dyn AuthGateway, mut token: Token) -> Token {
    let Some(refresh_token) = token.refresh_token.as_deref() else {
        return token;
    };

    let now = OffsetDateTime::now_utc();

    if token.access_expires_at - now > REFRESH_WINDOW {
        return token;
    }

    match auth.refresh_token(refresh_token).await {
        Ok(refreshed) => {
            tracing::debug!("Refreshed the access token for user {}", token.user_id);
            token.access_token = refreshed.access_token;
            token.access_expires_at = access_expiry(refreshed.expires_in, now);
            if refreshed.refresh_token.is_some() {
                token.refresh_token = refreshed.refresh_token;
            }
        }
        Err(error) => {
            tracing::warn!(
                "Could not refresh the access token for user {}: {error}",
                token.user_id
            );
        }
    }

    token
}

/// Middleware function that checks for a valid authorization cookie.
/// The [Session] is placed into request and then the request executed normally if the cookie is valid, otherwise a redirect to the log-in page is returned using `get_redirect`.
///
/// **Note**: Route handlers can use the function argument `Extension(session): Extension<Session>` to receive the session.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key` for decrypting and verifying the cookie contents.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to dashboard."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to dashboard.");
        }

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };
    let token = match get_token_from_cookies(&jar) {
        Ok(token) => token,
        Err(_) => return get_redirect(&log_in_redirect_url),
    };
    let token = refresh_if_needed(state.auth.as_ref(), token).await;

    parts.extensions.insert(Session::from(&token));
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(
        jar.clone(),
        token,
        state.cookie_duration,
    ) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid authorization cookie.
/// The [Session] is placed into request and then the request executed normally if the cookie is valid, otherwise a redirect to the log-in page is returned.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function that checks for a valid authorization cookie.
/// The [Session] is placed into request and then the request executed normally if the cookie is valid, otherwise a HTMX redirect to the log-in page is returned.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

/// Middleware function that only lets administrators through.
///
/// Must be layered inside one of the auth guards, which provide the [Session].
pub async fn admin_guard(request: Request, next: Next) -> Response {
    let is_htmx = request.headers().contains_key("hx-request");

    match request.extensions().get::<Session>() {
        Some(session) if session.is_admin() => next.run(request).await,
        Some(session) => {
            tracing::warn!(
                "User {} tried to open admin route {}",
                session.user_id,
                request.uri().path()
            );

            if is_htmx {
                Error::Forbidden.into_alert_response()
            } else {
                Error::Forbidden.into_response()
            }
        }
        None => {
            tracing::error!("Admin guard used without an auth guard.");
            Error::Unauthorized.into_response()
        }
    }
}
