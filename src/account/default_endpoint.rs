//! Defines the endpoint for choosing the default bank account.

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
    store::Action,
};

/// A route handler for making an account the user's only default account.
///
/// The cached accounts are updated in place once the backend accepts the
/// change, so the reloaded table shows exactly one default.
pub async fn set_default_account_endpoint(
    State(state): State<AccountEndpointState>,
    Extension(session): Extension<Session>,
    Path(account_id): Path<AccountId>,
) -> Response {
    if let Err(error) = state
        .gateways
        .accounts
        .set_default(&session.access_token, &account_id)
        .await
    {
        tracing::error!("Could not make {account_id} the default account: {error}");
        return error.into_alert_response();
    }

    tracing::info!("User {} set default account {account_id}", session.user_id);

    if let Err(error) = state.stores.dispatch(
        &session.user_id,
        Action::DefaultAccountSet {
            id: account_id.clone(),
        },
    ) {
        tracing::error!("Could not update the cached accounts: {error}");
    }

    mutation_response(
        ACCOUNTS_CHANGED,
        Alert::success("Default account updated", &account_id),
    )
}
