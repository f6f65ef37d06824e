//! Defines the endpoint for updating a bank account.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    account::{AccountDraft, AccountId, create_endpoint::AccountEndpointState, form::AccountForm},
    auth::Session,
    endpoints,
};

/// A route handler for updating an account, redirects to the accounts view on success.
pub async fn edit_account_endpoint(
    State(state): State<AccountEndpointState>,
    Extension(session): Extension<Session>,
    Path(account_id): Path<AccountId>,
    Form(form): Form<AccountForm>,
) -> Response {
    let draft = match AccountDraft::try_from(form) {
        Ok(draft) => draft,
        Err(error) => return error.into_alert_response(),
    };

    match state
        .gateways
        .accounts
        .update(&session.access_token, &account_id, &draft)
        .await
    {
        Ok(_) => {
            tracing::info!("User {} updated account {account_id}", session.user_id);
            state.forget_accounts(&session);

            (
                HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not update account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Form,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };

    use crate::{
        account::{create_endpoint::AccountEndpointState, form::AccountForm},
        endpoints,
        test_utils::{assert_hx_redirect, demo_backend, session_for, test_state, user_session},
    };

    use super::edit_account_endpoint;

    fn renamed(holder_name: &str) -> AccountForm {
        AccountForm {
            holder_name: holder_name.to_owned(),
            account_number: "32109876543".to_owned(),
            ifsc_code: "SBIN0004567".to_owned(),
        }
    }

    #[tokio::test]
    async fn updates_account_and_redirects() {
        let backend = demo_backend();
        let state = AccountEndpointState::from_ref(&test_state(backend.clone()));

        let response = edit_account_endpoint(
            State(state),
            Extension(user_session(&backend)),
            Path("acc-asha-2".to_owned()),
            Form(renamed("Asha R. Rao")),
        )
        .await;

        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);
        let accounts = backend.accounts_of("u-asha");
        let updated = accounts
            .iter()
            .find(|account| account.id == "acc-asha-2")
            .unwrap();
        assert_eq!(updated.holder_name, "Asha R. Rao");
        assert_eq!(updated.balance, 48_000.0);
    }

    #[tokio::test]
    async fn blank_holder_is_rejected() {
        let backend = demo_backend();
        let state = AccountEndpointState::from_ref(&test_state(backend.clone()));

        let response = edit_account_endpoint(
            State(state),
            Extension(user_session(&backend)),
            Path("acc-asha-2".to_owned()),
            Form(renamed("   ")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn another_users_account_is_not_found() {
        let backend = demo_backend();
        let state = AccountEndpointState::from_ref(&test_state(backend.clone()));

        let response = edit_account_endpoint(
            State(state),
            Extension(session_for(&backend, "u-ravi")),
            Path("acc-asha-2".to_owned()),
            Form(renamed("Ravi Kumar")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(
            backend
                .accounts_of("u-asha")
                .iter()
                .all(|account| account.holder_name == "Asha Rao")
        );
    }
}
