//! Defines the endpoint for removing a bank account.

use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};

use crate::{
    account::{AccountId, create_endpoint::AccountEndpointState},
    alert::Alert,
    auth::Session,
    listing::{ACCOUNTS_CHANGED, mutation_response},
};

/// A route handler for removing an account, tells the accounts table to reload on success.
pub async fn delete_account_endpoint(
    State(state): State<AccountEndpointState>,
    Extension(session): Extension<Session>,
    Path(account_id): Path<AccountId>,
) -> Response {
    match state
        .gateways
        .accounts
        .delete(&session.access_token, &account_id)
        .await
    {
        Ok(()) => {
            tracing::info!("User {} deleted account {account_id}", session.user_id);
            state.forget_accounts(&session);

            mutation_response(ACCOUNTS_CHANGED, Alert::success("Account deleted", ""))
        }
        Err(error) => {
            tracing::error!("Could not delete account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };

    use crate::{
        account::create_endpoint::AccountEndpointState,
        test_utils::{demo_backend, get_header, session_for, test_state, user_session},
    };

    use super::delete_account_endpoint;

    #[tokio::test]
    async fn deletes_account_and_triggers_reload() {
        let backend = demo_backend();
        let state = AccountEndpointState::from_ref(&test_state(backend.clone()));

        let response = delete_account_endpoint(
            State(state),
            Extension(user_session(&backend)),
            Path("acc-asha-2".to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(get_header(&response, "hx-trigger"), "accounts-changed");
        let ids: Vec<_> = backend
            .accounts_of("u-asha")
            .into_iter()
            .map(|account| account.id)
            .collect();
        assert_eq!(ids, ["acc-asha-1"]);
    }

    #[tokio::test]
    async fn another_users_account_is_not_found() {
        let backend = demo_backend();
        let state = AccountEndpointState::from_ref(&test_state(backend.clone()));

        let response = delete_account_endpoint(
            State(state),
            Extension(session_for(&backend, "u-ravi")),
            Path("acc-asha-2".to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(backend.accounts_of("u-asha").len(), 2);
    }
}
