//! The pages and endpoints for raising fund and transfer requests.

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error, Gateways,
    account::{BankAccount, default_account},
    api::RequestResource,
    auth::Session,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, DEFAULT_CURRENCY, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, base, format_currency, loading_spinner,
    },
    navigation::NavBar,
    pagination::{PageQuery, PaginationConfig},
    request::{FundRequest, NewFundRequest, NewTransferRequest, Reviewable, TransferRequest},
    store::SessionStores,
};

/// The payment methods a user can say they paid with.
const PAYMENT_METHODS: [&str; 4] = ["UPI", "NEFT", "IMPS", "RTGS"];

const CURRENCIES: [&str; 3] = ["INR", "USD", "EUR"];

/// The state needed to raise a request.
#[derive(Debug, Clone)]
pub struct CreateRequestState {
    pub gateways: Gateways,
    pub stores: SessionStores,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for CreateRequestState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            gateways: state.gateways.clone(),
            stores: state.stores.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Parse a positive amount of money from a form field.
fn parse_amount(raw: &str) -> Result<f64, Error> {
    let raw = raw.trim();
    let amount: f64 = raw
        .replace(',', "")
        .parse()
        .map_err(|_| Error::Validation(format!("\"{raw}\" is not an amount of money.")))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::Validation(
            "The amount must be greater than zero.".to_owned(),
        ));
    }

    Ok((amount * 100.0).round() / 100.0)
}

fn amount_input() -> Markup {
    html!(
        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                id="amount"
                type="number"
                name="amount"
                min="0.01"
                step="0.01"
                placeholder="0.00"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }
    )
}

fn submit_button(label: &str) -> Markup {
    html!(
        button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
        {
            span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
            (label)
        }
    )
}

fn new_request_view(title: &str, active_endpoint: &str, session: &Session, form: &Markup) -> Markup {
    let nav_bar = NavBar::new(active_endpoint, session.is_admin()).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="w-full mb-4 text-xl font-bold" { (title) }
            (form)
        }
    };

    base(title, &content)
}

fn new_fund_request_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::FUND_REQUESTS_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            (amount_input())

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                select id="currency" name="currency" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for currency in CURRENCIES {
                        option value=(currency) selected[currency == DEFAULT_CURRENCY] { (currency) }
                    }
                }
            }

            div
            {
                label for="payment_method" class=(FORM_LABEL_STYLE) { "Paid with" }

                select id="payment_method" name="payment_method" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for method in PAYMENT_METHODS {
                        option value=(method) { (method) }
                    }
                }
            }

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "Notes (optional)" }

                textarea
                    id="notes"
                    name="notes"
                    rows="3"
                    placeholder="e.g. the UTR of your payment"
                    class=(FORM_TEXT_INPUT_STYLE)
                {}
            }

            (submit_button("Submit fund request"))
        }
    }
}

fn new_transfer_form(accounts: &[BankAccount]) -> Markup {
    if accounts.is_empty() {
        return html! {
            p class="w-full"
            {
                "Add a bank account before requesting a transfer. "
                a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE) { "Add an account" }
            }
        };
    }

    let selected = default_account(accounts).map(|account| account.id.as_str());

    html! {
        form
            hx-post=(endpoints::TRANSFERS_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="account_id" class=(FORM_LABEL_STYLE) { "To account" }

                select id="account_id" name="account_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for account in accounts {
                        option value=(account.id) selected[selected == Some(account.id.as_str())]
                        {
                            (account.holder_name) " " (account.masked_number())
                            " (" (format_currency(account.balance, DEFAULT_CURRENCY)) ")"
                        }
                    }
                }
            }

            (amount_input())

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="e.g. Rent for May"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (submit_button("Request transfer"))
        }
    }
}

/// Render the page for raising a fund request.
pub async fn get_new_fund_request_page(Extension(session): Extension<Session>) -> Response {
    new_request_view(
        "New fund request",
        endpoints::NEW_FUND_REQUEST_VIEW,
        &session,
        &new_fund_request_form(),
    )
    .into_response()
}

/// Render the page for requesting a transfer to one of the user's accounts.
pub async fn get_new_transfer_page(
    State(state): State<CreateRequestState>,
    Extension(session): Extension<Session>,
) -> Response {
    let page = PageQuery::new(
        Some(1),
        Some(state.pagination_config.max_page_size),
        &state.pagination_config,
    );

    let accounts = match state.gateways.accounts.list(&session.access_token, page).await {
        Ok(accounts) => accounts.items,
        Err(error) => return error.into_response(),
    };

    new_request_view(
        "New transfer",
        endpoints::NEW_TRANSFER_VIEW,
        &session,
        &new_transfer_form(&accounts),
    )
    .into_response()
}

/// The form data for raising a fund request.
#[derive(Debug, Deserialize)]
pub struct FundRequestForm {
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub notes: String,
}

impl TryFrom<FundRequestForm> for NewFundRequest {
    type Error = Error;

    fn try_from(form: FundRequestForm) -> Result<Self, Error> {
        let amount = parse_amount(&form.amount)?;
        let payment_method = form.payment_method.trim();

        if payment_method.is_empty() {
            return Err(Error::Validation(
                "Choose how you paid for this request.".to_owned(),
            ));
        }

        let currency = match form.currency.trim() {
            "" => DEFAULT_CURRENCY.to_owned(),
            currency => currency.to_ascii_uppercase(),
        };
        let notes = form.notes.trim();

        Ok(Self {
            amount,
            currency,
            payment_method: payment_method.to_owned(),
            notes: (!notes.is_empty()).then(|| notes.to_owned()),
        })
    }
}

/// The form data for requesting a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferRequestForm {
    #[serde(default)]
    pub account_id: String,
    pub amount: String,
    #[serde(default)]
    pub description: String,
}

impl TryFrom<TransferRequestForm> for NewTransferRequest {
    type Error = Error;

    fn try_from(form: TransferRequestForm) -> Result<Self, Error> {
        let account_id = form.account_id.trim();

        if account_id.is_empty() {
            return Err(Error::Validation(
                "Choose the account to transfer to.".to_owned(),
            ));
        }

        let amount = parse_amount(&form.amount)?;
        let description = form.description.trim();

        if description.is_empty() {
            return Err(Error::Validation(
                "Describe what the transfer is for.".to_owned(),
            ));
        }

        Ok(Self {
            account_id: account_id.to_owned(),
            amount,
            description: description.to_owned(),
        })
    }
}

async fn create_request<R: RequestResource>(
    state: &CreateRequestState,
    session: &Session,
    draft: Result<R::Draft, Error>,
    list_route: &str,
) -> Response {
    let draft = match draft {
        Ok(draft) => draft,
        Err(error) => return error.into_alert_response(),
    };

    let gateway = R::gateway(&state.gateways);

    match gateway.create(&session.access_token, &draft).await {
        Ok(request) => {
            tracing::info!(
                "User {} raised {} request {}",
                session.user_id,
                R::KIND,
                request.id()
            );

            if let Err(error) = state.stores.invalidate::<R>(&session.user_id) {
                tracing::error!("Could not invalidate the cached {} requests: {error}", R::KIND);
            }

            (HxRedirect(list_route.to_owned()), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => {
            tracing::error!("Could not create {} request {draft:?}: {error}", R::KIND);
            error.into_alert_response()
        }
    }
}

/// A route handler for raising a fund request, redirects to the user's fund requests on success.
pub async fn create_fund_request_endpoint(
    State(state): State<CreateRequestState>,
    Extension(session): Extension<Session>,
    Form(form): Form<FundRequestForm>,
) -> Response {
    create_request::<FundRequest>(
        &state,
        &session,
        NewFundRequest::try_from(form),
        endpoints::FUND_REQUESTS_VIEW,
    )
    .await
}

/// A route handler for requesting a transfer, redirects to the user's transfers on success.
pub async fn create_transfer_request_endpoint(
    State(state): State<CreateRequestState>,
    Extension(session): Extension<Session>,
    Form(form): Form<TransferRequestForm>,
) -> Response {
    create_request::<TransferRequest>(
        &state,
        &session,
        NewTransferRequest::try_from(form),
        endpoints::TRANSFERS_VIEW,
    )
    .await
}
