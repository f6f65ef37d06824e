//! The registration page for requesting an account.
//!
//! New accounts start without portal access, an administrator approves them
//! before they can log in.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    api::{AuthGateway, Registration},
    auth::password::{PASSWORD_INPUT_MIN_LENGTH, check_password_strength},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, auth_card, base, link,
        loading_spinner, password_input, text_input,
    },
};

/// The messages shown next to the fields of the registration form.
#[derive(Debug, Default)]
struct FieldErrors<'a> {
    form: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(data: &RegisterForm, errors: FieldErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-swap="outerHTML"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(error_message) = errors.form {
                p class="text-red-500 text-base" data-form-error="true" { (error_message) }
            }

            (text_input("Full name", "name", "text", &data.name, None))
            (text_input("Email", "email", "email", &data.email, None))

            div
            {
                label for="phone_number" class=(FORM_LABEL_STYLE) { "Phone number (optional)" }
                input
                    type="tel"
                    name="phone_number"
                    id="phone_number"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(data.phone_number);
            }

            (password_input("Password", "password", PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (password_input(
                "Confirm password",
                "confirm_password",
                PASSWORD_INPUT_MIN_LENGTH,
                errors.confirm_password
            ))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

fn registration_received() -> Markup {
    html! {
        div id="registration-received" class="space-y-4 text-gray-900 dark:text-white"
        {
            p
            {
                "Thanks for registering. Your account is awaiting admin approval, "
                "you can log in once an administrator has granted portal access."
            }

            p { (link(endpoints::LOG_IN_VIEW, "Back to log in")) }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form(&RegisterForm::default(), FieldErrors::default());
    let content = auth_card("Create an account", &registration_form);
    base("Register", &content).into_response()
}

/// The state needed for registering a new user.
#[derive(Clone)]
pub struct RegistrationState {
    pub auth: Arc<dyn AuthGateway>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth: state.gateways.auth.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

/// Check the form and ask the backend to create the account.
///
/// Problems are shown on the re-rendered form, which keeps everything but the passwords.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let kept = RegisterForm {
        name: user_data.name.trim().to_owned(),
        email: user_data.email.trim().to_owned(),
        phone_number: user_data.phone_number.trim().to_owned(),
        ..Default::default()
    };

    if kept.name.is_empty() || kept.email.is_empty() {
        let errors = FieldErrors {
            form: Some("Enter your name and email address."),
            ..Default::default()
        };
        return registration_form(&kept, errors).into_response();
    }

    if let Err(error) = check_password_strength(&user_data.password, &[&kept.name, &kept.email]) {
        let message = error.to_string();
        let errors = FieldErrors {
            password: Some(&message),
            ..Default::default()
        };
        return registration_form(&kept, errors).into_response();
    }

    if user_data.password != user_data.confirm_password {
        let errors = FieldErrors {
            confirm_password: Some("Passwords do not match"),
            ..Default::default()
        };
        return registration_form(&kept, errors).into_response();
    }

    let registration = Registration {
        name: kept.name.clone(),
        email: kept.email.clone(),
        phone_number: (!kept.phone_number.is_empty()).then(|| kept.phone_number.clone()),
        password: user_data.password,
    };

    match state.auth.register(&registration).await {
        Ok(()) => {
            tracing::info!("Registered {}, awaiting portal access", registration.email);
            registration_received().into_response()
        }
        Err(Error::Backend { status, message }) if (400..500).contains(&status) => {
            let errors = FieldErrors {
                form: Some(&message),
                ..Default::default()
            };
            registration_form(&kept, errors).into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
