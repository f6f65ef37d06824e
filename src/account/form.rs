//! The form shared by the pages for adding and editing a bank account.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    account::{AccountDraft, BankAccount},
    auth::Session,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
};

/// The form data for adding or editing an account.
#[derive(Debug, Default, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub holder_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub ifsc_code: String,
}

impl TryFrom<AccountForm> for AccountDraft {
    type Error = Error;

    fn try_from(form: AccountForm) -> Result<Self, Self::Error> {
        AccountDraft::new(&form.holder_name, &form.account_number, &form.ifsc_code)
    }
}

/// Where the form is sent and how.
pub(super) enum FormTarget<'a> {
    Create(&'a str),
    Update(&'a str),
}

fn field(label: &str, name: &str, value: &str, pattern: &str, hint: &str) -> Markup {
    html!(
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                id=(name)
                type="text"
                name=(name)
                value=(value)
                pattern=(pattern)
                title=(hint)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }
    )
}

pub(super) fn account_form(target: FormTarget, account: Option<&BankAccount>, submit_label: &str) -> Markup {
    let (hx_post, hx_put) = match target {
        FormTarget::Create(url) => (Some(url), None),
        FormTarget::Update(url) => (None, Some(url)),
    };
    let value = |get: fn(&BankAccount) -> &str| account.map(get).unwrap_or_default();

    html!(
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            (field(
                "Account holder",
                "holder_name",
                value(|account| account.holder_name.as_str()),
                ".*\\S.*",
                "The name the bank has on record",
            ))
            (field(
                "Account number",
                "account_number",
                value(|account| account.account_number.as_str()),
                "[0-9 ]{9,22}",
                "9 to 18 digits",
            ))
            (field(
                "IFSC code",
                "ifsc_code",
                value(|account| account.ifsc_code.as_str()),
                "[A-Za-z]{4}0[A-Za-z0-9]{6}",
                "Four letters, a zero, then six letters or digits, e.g. HDFC0001234",
            ))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                (submit_label)
            }
        }
    )
}

pub(super) fn account_form_view(
    title: &str,
    active_endpoint: &str,
    session: &Session,
    form: &Markup,
) -> Markup {
    let nav_bar = NavBar::new(active_endpoint, session.is_admin()).into_html();

    let content = html!(
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="w-full mb-4 text-xl font-bold" { (title) }
            (form)
        }
    );

    base(title, &content)
}
