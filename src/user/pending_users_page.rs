//! The admin page listing registered users who are waiting for portal access.

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
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_ACTION_STYLE, MODAL_CONTAINER_ID, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, date_time, empty_table_row,
    },
    listing::{ListQuery, TableState, TableTarget, USERS_CHANGED, filter_bar, paged_table},
    navigation::NavBar,
    store::FetchKey,
    user::User,
};

const PENDING_USERS_TARGET: TableTarget<'static> = TableTarget {
    view_route: endpoints::PENDING_USERS_VIEW,
    fragment_route: endpoints::PENDING_USERS_TABLE,
    container_id: "pending-users-table",
    refresh_event: USERS_CHANGED,
    fixed_params: &[],
};

fn verified_badge(is_verified: bool, label: &str) -> Markup {
    let style = if is_verified {
        "text-xs font-medium px-2 py-0.5 rounded bg-green-100 text-green-800 \
        dark:bg-green-900 dark:text-green-300"
    } else {
        "text-xs font-medium px-2 py-0.5 rounded bg-gray-100 text-gray-600 \
        dark:bg-gray-700 dark:text-gray-300"
    };

    html!(span class=(style) { (label) @if !is_verified { " unverified" } })
}

fn pending_users_rows(users: &[&User], local_offset: UtcOffset) -> Markup {
    html!(
        div class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Phone" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Verification" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Registered" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for user in users {
                        tr class=(TABLE_ROW_STYLE) data-user-id=(user.id)
                        {
                            th
                                scope="row"
                                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                            {
                                (user.name)
                            }
                            td class=(TABLE_CELL_STYLE) { (user.email) }
                            td class=(TABLE_CELL_STYLE) { (user.phone_number.as_deref().unwrap_or("-")) }
                            td class="px-6 py-4 space-x-1"
                            {
                                (verified_badge(user.is_email_verified, "Email"))
                                (verified_badge(user.is_phone_verified, "Phone"))
                            }
                            td class="px-6 py-4 whitespace-nowrap"
                            {
                                @if let Some(created_at) = user.created_at {
                                    (date_time(created_at, local_offset))
                                } @else {
                                    "-"
                                }
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                button
                                    type="button"
                                    class=(BUTTON_ACTION_STYLE)
                                    hx-get=(format_endpoint(endpoints::USER_MODAL, &user.id))
                                    hx-target={ "#" (MODAL_CONTAINER_ID) }
                                    hx-swap="innerHTML"
                                    hx-target-error="#alert-container"
                                {
                                    "Review"
                                }
                            }
                        }
                    }

                    @if users.is_empty() {
                        (empty_table_row(6, "Nobody is waiting for portal access."))
                    }
                }
            }
        }
    )
}

async fn pending_users_table(
    state: &TableState,
    session: &Session,
    query: &ListQuery,
    refresh: bool,
) -> Result<Markup, Error> {
    let page = query.page_query(&state.pagination_config);
    let local_offset = state.local_offset()?;
    let users = &state.gateways.users;

    let loaded = state
        .stores
        .load::<User, _, _>(
            &session.user_id,
            FetchKey::new(page, ""),
            refresh,
            || users.list_pending(&session.access_token, page),
        )
        .await?;

    let rows = query.filter().apply(&loaded.items);

    Ok(paged_table(
        &PENDING_USERS_TARGET,
        query,
        page,
        &loaded.info,
        state.pagination_config.max_pages,
        &pending_users_rows(&rows, local_offset),
    ))
}

/// Display the users waiting for portal access.
pub async fn get_pending_users_page(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    let table = match pending_users_table(&state, &session, &query, true).await {
        Ok(table) => table,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::PENDING_USERS_VIEW, session.is_admin()).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Users awaiting portal access" }

                (filter_bar(&PENDING_USERS_TARGET, &query, &[]))
                (table)
            }
        }
    );

    base("Users", &content).into_response()
}

pub async fn get_pending_users_table(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    match pending_users_table(&state, &session, &query, query.refresh).await {
        Ok(table) => table.into_response(),
        Err(error) => error.into_alert_response(),
    }
}
