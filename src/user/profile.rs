//! The profile page, where users update their details and change their password.

use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    api::{AuthGateway, PasswordChange},
    auth::{PASSWORD_INPUT_MIN_LENGTH, Session, check_password_strength},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        loading_spinner, password_input, text_input,
    },
    navigation::NavBar,
    user::{ProfileUpdate, User},
};

/// The state needed by the profile page and its forms.
#[derive(Clone)]
pub struct ProfileState {
    pub auth: Arc<dyn AuthGateway>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth: state.gateways.auth.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
}

impl TryFrom<ProfileForm> for ProfileUpdate {
    type Error = Error;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        let name = form.name.trim();
        let phone_number = form.phone_number.trim();

        if name.is_empty() {
            return Err(Error::Validation("Enter your name.".to_owned()));
        }

        if !phone_number.is_empty()
            && !phone_number
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'))
        {
            return Err(Error::Validation(
                "A phone number may only contain digits, spaces, '+' and '-'.".to_owned(),
            ));
        }

        Ok(ProfileUpdate {
            name: name.to_owned(),
            phone_number: (!phone_number.is_empty()).then(|| phone_number.to_owned()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

fn profile_form(user: &User, error: Option<&str>) -> Markup {
    html!(
        form
            id="profile-form"
            hx-put=(endpoints::PROFILE_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="#profile-submit"
            class="space-y-4"
        {
            @if let Some(error) = error {
                p class="text-red-500 text-base" data-form-error="true" { (error) }
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }
                input
                    type="email"
                    id="email"
                    value=(user.email)
                    readonly
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (text_input("Full name", "name", "text", &user.name, None))

            div
            {
                label for="phone_number" class=(FORM_LABEL_STYLE) { "Phone number (optional)" }
                input
                    type="tel"
                    id="phone_number"
                    name="phone_number"
                    value=(user.phone_number.as_deref().unwrap_or_default())
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Role: " (user.role)
                @if user.is_email_verified { " · Email verified" }
                @if user.is_phone_verified { " · Phone verified" }
            }

            button type="submit" id="profile-submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                "Save profile"
            }
        }
    )
}

/// The messages shown next to the fields of the change password form.
#[derive(Debug, Default)]
struct PasswordErrors<'a> {
    form: Option<&'a str>,
    new_password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn change_password_form(errors: PasswordErrors) -> Markup {
    html!(
        form
            id="change-password-form"
            hx-post=(endpoints::CHANGE_PASSWORD_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="#change-password-submit"
            class="space-y-4"
        {
            @if let Some(error) = errors.form {
                p class="text-red-500 text-base" data-form-error="true" { (error) }
            }

            (password_input("Current password", "current_password", 0, None))
            (password_input("New password", "new_password", PASSWORD_INPUT_MIN_LENGTH, errors.new_password))
            (password_input(
                "Confirm new password",
                "confirm_password",
                PASSWORD_INPUT_MIN_LENGTH,
                errors.confirm_password
            ))

            button type="submit" id="change-password-submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                "Change password"
            }
        }
    )
}

/// Display the user's profile.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(session): Extension<Session>,
) -> Response {
    let user = match state.auth.profile(&session.access_token).await {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW, session.is_admin()).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-8"
            {
                section class="space-y-4"
                {
                    h1 class="text-xl font-bold" { "Profile" }
                    (profile_form(&user, None))
                }

                section class="space-y-4"
                {
                    h2 class="text-lg font-bold" { "Change password" }
                    (change_password_form(PasswordErrors::default()))
                }
            }
        }
    );

    base("Profile", &content).into_response()
}

/// Save the user's name and phone number.
pub async fn update_profile(
    State(state): State<ProfileState>,
    Extension(session): Extension<Session>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let submitted = User {
        id: session.user_id.clone(),
        email: String::new(),
        name: form.name.clone(),
        phone_number: Some(form.phone_number.clone()),
        role: session.role,
        is_portal_access: true,
        is_email_verified: false,
        is_phone_verified: false,
        created_at: None,
    };

    let update = match ProfileUpdate::try_from(form) {
        Ok(update) => update,
        Err(error) => return profile_form(&submitted, Some(&error.to_string())).into_response(),
    };

    match state.auth.update_profile(&session.access_token, &update).await {
        Ok(user) => {
            tracing::info!("User {} updated their profile", session.user_id);

            html!(
                (profile_form(&user, None))
                (Alert::success("Profile saved", "").into_oob_html())
            )
            .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

/// Check the new password and ask the backend to change it.
pub async fn change_password(
    State(state): State<ProfileState>,
    Extension(session): Extension<Session>,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    if form.current_password.is_empty() {
        let errors = PasswordErrors {
            form: Some("Enter your current password."),
            ..Default::default()
        };
        return change_password_form(errors).into_response();
    }

    if let Err(error) = check_password_strength(&form.new_password, &[&session.name]) {
        let message = error.to_string();
        let errors = PasswordErrors {
            new_password: Some(&message),
            ..Default::default()
        };
        return change_password_form(errors).into_response();
    }

    if form.new_password != form.confirm_password {
        let errors = PasswordErrors {
            confirm_password: Some("Passwords do not match"),
            ..Default::default()
        };
        return change_password_form(errors).into_response();
    }

    let change = PasswordChange {
        current_password: form.current_password,
        new_password: form.new_password,
    };

    match state.auth.change_password(&session.access_token, &change).await {
        Ok(()) => {
            tracing::info!("User {} changed their password", session.user_id);

            html!(
                (change_password_form(PasswordErrors::default()))
                (Alert::success("Password changed", "Use the new password next time you log in.").into_oob_html())
            )
            .into_response()
        }
        Err(Error::Backend { status, message }) if (400..500).contains(&status) => {
            let errors = PasswordErrors {
                form: Some(&message),
                ..Default::default()
            };
            change_password_form(errors).into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
