//! Defines the page listing transactions, the user's own or everyone's for admins.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    Error,
    auth::Session,
    endpoints,
    html::{
        DEFAULT_CURRENCY, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, date_time, empty_table_row, format_currency, status_badge,
    },
    listing::{ListQuery, REQUESTS_CHANGED, TableState, TableTarget, filter_bar, paged_table},
    navigation::NavBar,
    request::status_categories,
    store::FetchKey,
    transaction::Transaction,
};

const TRANSACTIONS_TARGET: TableTarget<'static> = TableTarget {
    view_route: endpoints::TRANSACTIONS_VIEW,
    fragment_route: endpoints::TRANSACTIONS_TABLE,
    container_id: "transactions-table",
    // Approving or processing a request records a transaction.
    refresh_event: REQUESTS_CHANGED,
    fixed_params: &[],
};

/// The amount with a sign showing which way the money moved.
fn signed_amount(transaction: &Transaction) -> Markup {
    let (sign, style) = if transaction.transaction_type.is_outgoing() {
        ("-", "text-red-700 dark:text-red-400")
    } else {
        ("+", "text-green-700 dark:text-green-400")
    };

    html!(
        span class=(style) { (sign) (format_currency(transaction.amount, DEFAULT_CURRENCY)) }
    )
}

pub(crate) fn transactions_rows(
    transactions: &[&Transaction],
    show_user: bool,
    local_offset: UtcOffset,
) -> Markup {
    let column_count = if show_user { 7 } else { 6 };

    html!(
        div class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        @if show_user {
                            th scope="col" class=(TABLE_CELL_STYLE) { "User" }
                        }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                        {
                            td class="px-6 py-4 font-mono" { (transaction.id) }
                            td class="px-6 py-4 whitespace-nowrap"
                            {
                                (date_time(transaction.created_at, local_offset))
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                            @if show_user {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if let Some(user) = &transaction.user {
                                        (user.name)
                                    } @else {
                                        "-"
                                    }
                                }
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.transaction_type.label()) }
                            td class="px-6 py-4 text-right whitespace-nowrap"
                            {
                                (signed_amount(transaction))
                            }
                            td class=(TABLE_CELL_STYLE) { (status_badge(transaction.status)) }
                        }
                    }

                    @if transactions.is_empty() {
                        (empty_table_row(column_count, "No transactions found."))
                    }
                }
            }
        }
    )
}

async fn transactions_table(
    state: &TableState,
    session: &Session,
    query: &ListQuery,
    refresh: bool,
) -> Result<Markup, Error> {
    let page = query.page_query(&state.pagination_config);
    let local_offset = state.local_offset()?;
    let transactions = &state.gateways.transactions;

    let loaded = state
        .stores
        .load::<Transaction, _, _>(
            &session.user_id,
            FetchKey::new(page, ""),
            refresh,
            || transactions.list(&session.access_token, page),
        )
        .await?;

    let rows = query.filter().apply(&loaded.items);

    Ok(paged_table(
        &TRANSACTIONS_TARGET,
        query,
        page,
        &loaded.info,
        state.pagination_config.max_pages,
        &transactions_rows(&rows, session.is_admin(), local_offset),
    ))
}

/// Display the transactions the backend shows the logged in user.
pub async fn get_transactions_page(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    let table = match transactions_table(&state, &session, &query, true).await {
        Ok(table) => table,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW, session.is_admin()).into_html();
    let categories = status_categories();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Transactions" }

                (filter_bar(&TRANSACTIONS_TARGET, &query, &categories))
                (table)
            }
        }
    );

    base("Transactions", &content).into_response()
}

pub async fn get_transactions_table(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    match transactions_table(&state, &session, &query, query.refresh).await {
        Ok(table) => table.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{FromRef, Query, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};

    use crate::{
        api::RecordedFetch,
        listing::{ListQuery, TableState},
        pagination::PageQuery,
        test_utils::{
            admin_session, assert_valid_html, demo_backend, parse_html_document,
            parse_html_fragment, test_state, user_session,
        },
    };

    use super::{get_transactions_page, get_transactions_table};

    fn transaction_ids(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("tr[data-transaction-id]").unwrap())
            .filter_map(|row| row.value().attr("data-transaction-id").map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn user_sees_only_own_transactions_newest_first() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));

        let response = get_transactions_page(
            State(state),
            Extension(user_session(&backend)),
            Query(ListQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let ids = transaction_ids(&html);
        assert_eq!(ids.len(), 15);
        assert_eq!(ids.first().map(String::as_str), Some("txn-029"));
        assert!(!html.html().contains(">User<"));
    }

    #[tokio::test]
    async fn admin_sees_user_column() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));

        let response = get_transactions_table(
            State(state),
            Extension(admin_session(&backend)),
            Query(ListQuery::default()),
        )
        .await;

        let html = parse_html_fragment(response).await;
        assert_eq!(transaction_ids(&html).len(), 20);
        assert!(html.html().contains(">User<"));
    }

    #[tokio::test]
    async fn second_page_is_fetched_once() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));
        let session = admin_session(&backend);
        let second_page = ListQuery {
            page: Some(2),
            ..Default::default()
        };

        get_transactions_table(
            State(state.clone()),
            Extension(session.clone()),
            Query(second_page.clone()),
        )
        .await;
        let response =
            get_transactions_table(State(state), Extension(session), Query(second_page)).await;

        assert_eq!(
            backend.recorded_fetches(),
            [RecordedFetch {
                resource: "transactions",
                page: PageQuery { page: 2, limit: 20 },
                status: None,
            }]
        );
        let html = parse_html_fragment(response).await;
        assert_eq!(transaction_ids(&html).len(), 10);
    }

    #[tokio::test]
    async fn status_filter_narrows_rows() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));

        let response = get_transactions_table(
            State(state),
            Extension(user_session(&backend)),
            Query(ListQuery {
                category: "REJECTED".to_owned(),
                ..Default::default()
            }),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let statuses: Vec<_> = html
            .select(&Selector::parse("tr[data-transaction-id] [data-status]").unwrap())
            .filter_map(|badge| badge.value().attr("data-status"))
            .collect();
        assert!(!statuses.is_empty());
        assert!(statuses.iter().all(|status| *status == "REJECTED"));
    }
}
