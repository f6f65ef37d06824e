//! Defines the page listing the user's bank accounts.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    account::{BankAccount, default_account, total_balance},
    auth::Session,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_ACTION_STYLE, BUTTON_DELETE_STYLE, DEFAULT_CURRENCY, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        empty_table_row, format_currency, link,
    },
    listing::{ACCOUNTS_CHANGED, ListQuery, TableState, TableTarget, filter_bar, paged_table},
    navigation::NavBar,
    store::FetchKey,
};

const ACCOUNTS_TARGET: TableTarget<'static> = TableTarget {
    view_route: endpoints::ACCOUNTS_VIEW,
    fragment_route: endpoints::ACCOUNTS_TABLE,
    container_id: "accounts-table",
    refresh_event: ACCOUNTS_CHANGED,
    fixed_params: &[],
};

fn account_actions(account: &BankAccount) -> Markup {
    html!(
        div class="flex gap-4"
        {
            @if !account.is_default {
                button
                    type="button"
                    class=(BUTTON_ACTION_STYLE)
                    data-action="make-default"
                    hx-put=(format_endpoint(endpoints::DEFAULT_ACCOUNT, &account.id))
                    hx-swap="none"
                    hx-target-error="#alert-container"
                {
                    "Make default"
                }
            }

            (link(&format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, &account.id), "Edit"))

            button
                type="button"
                class=(BUTTON_DELETE_STYLE)
                data-action="delete"
                hx-delete=(format_endpoint(endpoints::ACCOUNT, &account.id))
                hx-confirm={
                    "Delete the account " (account.masked_number())
                    " held by " (account.holder_name) "?"
                }
                hx-swap="none"
                hx-target-error="#alert-container"
            {
                "Delete"
            }
        }
    )
}

fn accounts_rows(accounts: &[&BankAccount]) -> Markup {
    html!(
        div class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Holder" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "IFSC" }
                        th scope="col" class="px-6 py-4 text-right" { "Balance" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for account in accounts {
                        tr class=(TABLE_ROW_STYLE) data-account-id=(account.id)
                        {
                            th
                                scope="row"
                                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                            {
                                (account.holder_name)

                                @if account.is_default {
                                    span
                                        class="ms-2 text-xs font-medium px-2 py-0.5 rounded \
                                        bg-blue-100 text-blue-800 dark:bg-blue-900 dark:text-blue-300"
                                        data-default
                                    {
                                        "Default"
                                    }
                                }
                            }
                            td class="px-6 py-4 font-mono" { (account.masked_number()) }
                            td class=(TABLE_CELL_STYLE) { (account.ifsc_code) }
                            td class="px-6 py-4 text-right whitespace-nowrap"
                            {
                                (format_currency(account.balance, DEFAULT_CURRENCY))
                            }
                            td class=(TABLE_CELL_STYLE) { (account_actions(account)) }
                        }
                    }

                    @if accounts.is_empty() {
                        (empty_table_row(5, "No accounts yet."))
                    }
                }
            }
        }
    )
}

fn balance_summary(accounts: &[BankAccount]) -> Markup {
    html!(
        p class="text-sm text-gray-700 dark:text-gray-300" data-total-balance
        {
            "Total balance: "
            span class="font-semibold" { (format_currency(total_balance(accounts), DEFAULT_CURRENCY)) }

            @if let Some(account) = default_account(accounts) {
                " · Default: " (account.holder_name) " " (account.masked_number())
            }
        }
    )
}

async fn accounts_table(
    state: &TableState,
    session: &Session,
    query: &ListQuery,
    refresh: bool,
) -> Result<Markup, Error> {
    let page = query.page_query(&state.pagination_config);
    let accounts = &state.gateways.accounts;

    let loaded = state
        .stores
        .load::<BankAccount, _, _>(
            &session.user_id,
            FetchKey::new(page, ""),
            refresh,
            || accounts.list(&session.access_token, page),
        )
        .await?;

    let rows = query.filter().apply(&loaded.items);
    let table = html!(
        (balance_summary(&loaded.items))
        (accounts_rows(&rows))
    );

    Ok(paged_table(
        &ACCOUNTS_TARGET,
        query,
        page,
        &loaded.info,
        state.pagination_config.max_pages,
        &table,
    ))
}

/// Display the user's bank accounts with their balances.
pub async fn get_accounts_page(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    let table = match accounts_table(&state, &session, &query, true).await {
        Ok(table) => table,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW, session.is_admin()).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE) { "Add account" }
                }

                (filter_bar(&ACCOUNTS_TARGET, &query, &[]))
                (table)
            }
        }
    );

    base("Accounts", &content).into_response()
}

/// The accounts table, for paging, searching and reloading after a change.
pub async fn get_accounts_table(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    match accounts_table(&state, &session, &query, query.refresh).await {
        Ok(table) => table.into_response(),
        Err(error) => error.into_alert_response(),
    }
}
