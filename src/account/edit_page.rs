//! Defines the page for editing a bank account.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Gateways,
    account::{
        AccountId,
        form::{FormTarget, account_form, account_form_view},
    },
    auth::Session,
    endpoints::{self, format_endpoint},
};

#[derive(Debug, Clone)]
pub struct EditAccountPageState {
    pub gateways: Gateways,
}

impl FromRef<AppState> for EditAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            gateways: state.gateways.clone(),
        }
    }
}

/// Render the form for editing one of the user's accounts, prefilled with its details.
pub async fn get_edit_account_page(
    State(state): State<EditAccountPageState>,
    Extension(session): Extension<Session>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let account = match state
        .gateways
        .accounts
        .get(&session.access_token, &account_id)
        .await
    {
        Ok(account) => account,
        Err(error) => return error.into_response(),
    };

    let update_url = format_endpoint(endpoints::ACCOUNT, &account.id);
    let form = account_form(FormTarget::Update(&update_url), Some(&account), "Save changes");
    account_form_view("Edit account", endpoints::ACCOUNTS_VIEW, &session, &form).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };

    use crate::test_utils::{
        assert_form_input_with_value, assert_hx_endpoint, assert_valid_html, demo_backend,
        must_get_form, parse_html_document, session_for, test_state, user_session,
    };

    use super::{EditAccountPageState, get_edit_account_page};

    #[tokio::test]
    async fn form_is_prefilled() {
        let backend = demo_backend();
        let state = EditAccountPageState::from_ref(&test_state(backend.clone()));

        let response = get_edit_account_page(
            State(state),
            Extension(user_session(&backend)),
            Path("acc-asha-2".to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/accounts/acc-asha-2", "hx-put");
        assert_form_input_with_value(&form, "holder_name", "text", "Asha Rao");
        assert_form_input_with_value(&form, "account_number", "text", "32109876543");
        assert_form_input_with_value(&form, "ifsc_code", "text", "SBIN0004567");
    }

    #[tokio::test]
    async fn another_users_account_is_not_found() {
        let backend = demo_backend();
        let state = EditAccountPageState::from_ref(&test_state(backend.clone()));

        let response = get_edit_account_page(
            State(state),
            Extension(session_for(&backend, "u-ravi")),
            Path("acc-asha-1".to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
