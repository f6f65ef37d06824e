//! The landing page after logging in: the default account, the total balance
//! and the most recent transactions.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    Error,
    account::{BankAccount, default_account, total_balance},
    auth::Session,
    endpoints,
    html::{DEFAULT_CURRENCY, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    listing::{ListQuery, TableState},
    navigation::NavBar,
    store::FetchKey,
    transaction::{Transaction, transactions_rows},
};

/// How many transactions the dashboard shows.
const RECENT_TRANSACTION_COUNT: usize = 5;

const CARD_STYLE: &str = "p-6 bg-white border border-gray-200 rounded-lg shadow-sm \
    dark:bg-gray-800 dark:border-gray-700";

fn balance_card(accounts: &[BankAccount]) -> Markup {
    html!(
        div class=(CARD_STYLE) data-card="total-balance"
        {
            h2 class="mb-2 text-sm font-medium text-gray-500 dark:text-gray-400" { "Total balance" }
            p class="text-2xl font-bold" { (format_currency(total_balance(accounts), DEFAULT_CURRENCY)) }
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Across " (accounts.len()) @if accounts.len() == 1 { " account" } @else { " accounts" }
            }
        }
    )
}

fn default_account_card(accounts: &[BankAccount]) -> Markup {
    html!(
        div class=(CARD_STYLE) data-card="default-account"
        {
            h2 class="mb-2 text-sm font-medium text-gray-500 dark:text-gray-400" { "Default account" }

            @match default_account(accounts) {
                Some(account) => {
                    p class="text-lg font-semibold" { (account.holder_name) }
                    p class="font-mono" { (account.masked_number()) " · " (account.ifsc_code) }
                    p class="text-sm" { (format_currency(account.balance, DEFAULT_CURRENCY)) }
                }
                None => {
                    p
                    {
                        "No default account. "
                        a href=(endpoints::ACCOUNTS_VIEW) class=(LINK_STYLE) { "Manage accounts" }
                    }
                }
            }
        }
    )
}

fn recent_transactions(transactions: &[Transaction], show_user: bool, local_offset: UtcOffset) -> Markup {
    let recent: Vec<_> = transactions.iter().take(RECENT_TRANSACTION_COUNT).collect();

    html!(
        section class="w-full space-y-2"
        {
            header class="flex justify-between items-baseline"
            {
                h2 class="text-lg font-semibold" { "Recent transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            (transactions_rows(&recent, show_user, local_offset))
        }
    )
}

async fn dashboard_content(state: &TableState, session: &Session) -> Result<Markup, Error> {
    let page = ListQuery::default().page_query(&state.pagination_config);
    let local_offset = state.local_offset()?;
    let token = &session.access_token;
    let gateways = &state.gateways;

    // Both lists share the cache with the accounts and transactions pages.
    let accounts = state
        .stores
        .load::<BankAccount, _, _>(&session.user_id, FetchKey::new(page, ""), true, || {
            gateways.accounts.list(token, page)
        })
        .await?;
    let transactions = state
        .stores
        .load::<Transaction, _, _>(&session.user_id, FetchKey::new(page, ""), true, || {
            gateways.transactions.list(token, page)
        })
        .await?;

    Ok(html!(
        div class="grid w-full gap-4 md:grid-cols-2"
        {
            (balance_card(&accounts.items))
            (default_account_card(&accounts.items))
        }

        (recent_transactions(&transactions.items, session.is_admin(), local_offset))
    ))
}

/// Display an overview of the user's accounts and recent activity.
pub async fn get_dashboard_page(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
) -> Response {
    let dashboard = match dashboard_content(&state, &session).await {
        Ok(dashboard) => dashboard,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW, session.is_admin()).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Welcome, " (session.name) }
                (dashboard)
            }
        }
    );

    base("Dashboard", &content).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{FromRef, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};

    use crate::{
        Error,
        listing::TableState,
        test_utils::{
            assert_valid_html, demo_backend, parse_html_document, session_for, test_state,
            user_session,
        },
    };

    use super::get_dashboard_page;

    fn card_text(html: &Html, card: &str) -> String {
        let selector = Selector::parse(&format!("[data-card='{card}']")).unwrap();

        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("card {card} missing"))
            .text()
            .collect()
    }

    #[tokio::test]
    async fn shows_balance_default_account_and_recent_transactions() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));

        let response = get_dashboard_page(State(state), Extension(user_session(&backend))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(card_text(&html, "total-balance").contains("₹173,000.50"));
        assert!(card_text(&html, "default-account").contains("••••5678"));
        let rows = html
            .select(&Selector::parse("tr[data-transaction-id]").unwrap())
            .count();
        assert_eq!(rows, 5);
    }

    #[tokio::test]
    async fn user_without_accounts_is_told_how_to_add_one() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));

        let response =
            get_dashboard_page(State(state), Extension(session_for(&backend, "u-admin"))).await;

        let html = parse_html_document(response).await;
        assert!(card_text(&html, "default-account").contains("No default account."));
        assert!(card_text(&html, "total-balance").contains("₹0.00"));
    }

    #[tokio::test]
    async fn backend_failure_shows_error_page() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));
        let session = user_session(&backend);
        backend.fail_with(Some(Error::Network("connection refused".to_owned())));

        let response = get_dashboard_page(State(state), Extension(session)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
