use std::sync::Arc;

use axum::{body::Body, response::Response};

use crate::{
    AppState, FakeBackend, Gateways, PaginationConfig, auth::Session, user::Role,
};

pub(crate) const TEST_COOKIE_SECRET: &str = "a-test-secret-that-is-long-enough";

/// The demo backend shared with the app state built by [test_state].
pub(crate) fn demo_backend() -> Arc<FakeBackend> {
    Arc::new(FakeBackend::with_demo_data())
}

#[track_caller]
pub(crate) fn test_state(backend: Arc<FakeBackend>) -> AppState {
    AppState::new(
        TEST_COOKIE_SECRET,
        "Etc/UTC",
        PaginationConfig::default(),
        Gateways::fake(backend),
    )
}

/// A logged in session for `user_id`, as the auth guard would provide it.
#[track_caller]
pub(crate) fn session_for(backend: &FakeBackend, user_id: &str) -> Session {
    let user = backend.user(user_id).expect("No such test user");
    let access_token = backend
        .issue_token(user_id)
        .expect("Could not issue test token");

    Session {
        user_id: user.id,
        name: user.name,
        role: user.role,
        access_token,
    }
}

#[track_caller]
pub(crate) fn admin_session(backend: &FakeBackend) -> Session {
    let session = session_for(backend, "u-admin");
    assert_eq!(session.role, Role::Admin);
    session
}

#[track_caller]
pub(crate) fn user_session(backend: &FakeBackend) -> Session {
    session_for(backend, "u-asha")
}

pub(crate) async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).to_string()
}
