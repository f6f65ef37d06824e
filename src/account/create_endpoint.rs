//! Defines the endpoint for adding a bank account.

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    AppState, Gateways,
    account::{AccountDraft, BankAccount, form::AccountForm},
    auth::Session,
    endpoints,
    store::SessionStores,
};

/// The state needed to change a user's accounts.
#[derive(Debug, Clone)]
pub struct AccountEndpointState {
    pub gateways: Gateways,
    pub stores: SessionStores,
}

impl FromRef<AppState> for AccountEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            gateways: state.gateways.clone(),
            stores: state.stores.clone(),
        }
    }
}

impl AccountEndpointState {
    /// Drop the cached accounts so the next table load sees the change.
    pub(super) fn forget_accounts(&self, session: &Session) {
        if let Err(error) = self.stores.invalidate::<BankAccount>(&session.user_id) {
            tracing::error!("Could not invalidate the cached accounts: {error}");
        }
    }
}

/// A route handler for adding a bank account, redirects to the accounts view on success.
pub async fn create_account_endpoint(
    State(state): State<AccountEndpointState>,
    Extension(session): Extension<Session>,
    Form(form): Form<AccountForm>,
) -> Response {
    let draft = match AccountDraft::try_from(form) {
        Ok(draft) => draft,
        Err(error) => return error.into_alert_response(),
    };

    match state.gateways.accounts.create(&session.access_token, &draft).await {
        Ok(account) => {
            tracing::info!("User {} added account {}", session.user_id, account.id);
            state.forget_accounts(&session);

            (
                HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not add account {draft:?}: {error}");
            error.into_alert_response()
        }
    }
}
