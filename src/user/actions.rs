//! The modal where an admin grants or denies a new user's portal access.

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    AppState, Error, Gateways,
    alert::Alert,
    auth::Session,
    endpoints::{self, format_endpoint},
    html::date_time,
    listing::{USERS_CHANGED, mutation_response},
    modal::{Modal, ModalFrame, UserDetailsForm},
    store::SessionStores,
    timezone::get_local_offset,
    user::{PortalAccessDecision, User},
};

/// The state needed to review a user's portal access.
#[derive(Debug, Clone)]
pub struct PortalAccessState {
    pub gateways: Gateways,
    pub stores: SessionStores,
    pub local_timezone: String,
}

impl FromRef<AppState> for PortalAccessState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            gateways: state.gateways.clone(),
            stores: state.stores.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

const CONFIRM_LABEL: &str = "Save decision";

fn user_details(user: &User, local_offset: UtcOffset) -> Markup {
    let yes_no = |value: bool| if value { "Yes" } else { "No" };

    html!(
        dl class="grid grid-cols-2 gap-2 text-sm text-gray-700 dark:text-gray-300"
        {
            dt class="font-medium" { "Name" }
            dd { (user.name) }

            dt class="font-medium" { "Email" }
            dd { (user.email) }

            dt class="font-medium" { "Phone" }
            dd { (user.phone_number.as_deref().unwrap_or("-")) }

            dt class="font-medium" { "Email verified" }
            dd { (yes_no(user.is_email_verified)) }

            dt class="font-medium" { "Phone verified" }
            dd { (yes_no(user.is_phone_verified)) }

            @if let Some(created_at) = user.created_at {
                dt class="font-medium" { "Registered" }
                dd { (date_time(created_at, local_offset)) }
            }
        }
    )
}

/// The modal showing a registered user and the portal access decision.
pub async fn get_user_modal(
    State(state): State<PortalAccessState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<String>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let user = match state.gateways.users.get(&session.access_token, &user_id).await {
        Ok(user) => user,
        Err(error) => return error.into_alert_response(),
    };

    let frame = ModalFrame {
        title: "Portal access",
        confirm_label: CONFIRM_LABEL,
        confirm_url: format_endpoint(endpoints::PORTAL_ACCESS, &user.id),
        validate_url: format_endpoint(endpoints::USER_MODAL_VALIDATE, &user.id),
        details: user_details(&user, local_offset),
    };

    Modal::open(UserDetailsForm::default())
        .view(&frame)
        .into_response()
}

/// Re-render the footer once a decision is picked.
pub async fn validate_user_modal(Form(form): Form<UserDetailsForm>) -> Markup {
    Modal::open(form).footer(CONFIRM_LABEL, true)
}

/// Grant or deny the user's portal access.
pub async fn submit_portal_access(
    State(state): State<PortalAccessState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<String>,
    Form(form): Form<UserDetailsForm>,
) -> Response {
    let users = state.gateways.users.clone();
    let mut modal = Modal::open(form);
    let mut decision = None;

    let result = modal
        .submit(|chosen: PortalAccessDecision| {
            decision = Some(chosen);
            let users = users.clone();
            let token = session.access_token.clone();
            let user_id = user_id.clone();

            async move {
                users
                    .set_portal_access(&token, &user_id, chosen.grants_access())
                    .await
            }
        })
        .await
        .and_then(|()| state.stores.invalidate::<User>(&session.user_id));

    match (result, decision) {
        (Ok(()), Some(decision)) => {
            tracing::info!(
                "Admin {} chose to {} portal access for {user_id}",
                session.user_id,
                decision.as_query_value()
            );

            let message = if decision.grants_access() {
                "Portal access granted"
            } else {
                "Portal access denied"
            };

            mutation_response(USERS_CHANGED, Alert::success(message, &user_id))
        }
        (Ok(()), None) => Error::Validation("Choose a decision.".to_owned()).into_alert_response(),
        (Err(error), _) => error.into_alert_response(),
    }
}
