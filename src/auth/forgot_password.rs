//! The page for requesting a password reset email.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState,
    api::AuthGateway,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, auth_card, base, link, loading_spinner, text_input},
};

fn forgot_password_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::FORGOT_PASSWORD_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Enter the email address you registered with and we will send you a link to reset your password."
            }

            (text_input("Email", "email", "email", "", None))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Send reset link"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Remembered it? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

/// Renders the form for requesting a password reset email.
pub async fn get_forgot_password_page() -> Response {
    let content = auth_card("Forgot your password?", &forgot_password_form());
    base("Forgot Password", &content).into_response()
}

#[derive(Clone)]
pub struct ForgotPasswordState {
    pub auth: Arc<dyn AuthGateway>,
}

impl FromRef<AppState> for ForgotPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth: state.gateways.auth.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Ask the backend to email a reset link.
///
/// The reply is the same whether or not the address is registered.
pub async fn post_forgot_password(
    State(state): State<ForgotPasswordState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    if let Err(error) = state.auth.reset_password(form.email.trim()).await {
        return error.into_alert_response();
    }

    html! {
        div id="reset-requested" class="space-y-4 text-gray-900 dark:text-white"
        {
            p
            {
                "If an account exists for that address, a link to reset your password is on its way."
            }

            p { (link(endpoints::LOG_IN_VIEW, "Back to log in")) }
        }
    }
    .into_response()
}
