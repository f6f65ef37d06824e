//! The admin page for reviewing everyone's fund and transfer requests.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    api::{RequestQuery, RequestResource},
    auth::Session,
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    listing::{ListQuery, REQUESTS_CHANGED, TableState, TableTarget, filter_bar, paged_table},
    navigation::NavBar,
    request::{FundRequest, RequestKind, RequestStatus, TableMode, TransferRequest, requests_table},
    store::FetchKey,
};

/// The status tab value that lists requests in every status.
const ALL_STATUSES: &str = "ALL";

/// The tab query parameters, read leniently so a bad link still shows a page.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewTabQuery {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    status: String,
}

/// Which kind of request, and which status, the admin is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReviewTab {
    kind: RequestKind,
    /// `None` lists every status.
    status: Option<RequestStatus>,
}

impl From<&ReviewTabQuery> for ReviewTab {
    fn from(query: &ReviewTabQuery) -> Self {
        let kind = match query.kind.as_str() {
            "transfer" => RequestKind::Transfer,
            _ => RequestKind::Fund,
        };

        let status = if query.status.eq_ignore_ascii_case(ALL_STATUSES) {
            None
        } else {
            Some(RequestStatus::from_query_value(&query.status).unwrap_or(RequestStatus::Pending))
        };

        Self { kind, status }
    }
}

impl ReviewTab {
    fn status_value(self) -> &'static str {
        self.status
            .map_or(ALL_STATUSES, RequestStatus::as_query_value)
    }

    fn params(self) -> [(&'static str, &'static str); 2] {
        [
            ("kind", self.kind.as_query_value()),
            ("status", self.status_value()),
        ]
    }

    fn url(self) -> String {
        let query = serde_urlencoded::to_string(self.params()).unwrap_or_default();

        format!("{}?{query}", endpoints::REVIEW_VIEW)
    }

    fn scope(self) -> String {
        format!("review:{}", self.status_value())
    }
}

fn review_target<'a>(fixed_params: &'a [(&'a str, &'a str)]) -> TableTarget<'a> {
    TableTarget {
        view_route: endpoints::REVIEW_VIEW,
        fragment_route: endpoints::REVIEW_TABLE,
        container_id: "review-table",
        refresh_event: REQUESTS_CHANGED,
        fixed_params,
    }
}

async fn review_table<R: RequestResource>(
    state: &TableState,
    session: &Session,
    tab: ReviewTab,
    query: &ListQuery,
    refresh: bool,
) -> Result<Markup, Error> {
    let page = query.page_query(&state.pagination_config);
    let local_offset = state.local_offset()?;
    let gateway = R::gateway(&state.gateways);

    let loaded = state
        .stores
        .load::<R, _, _>(
            &session.user_id,
            FetchKey::new(page, tab.scope()),
            refresh,
            || {
                gateway.list(
                    &session.access_token,
                    RequestQuery {
                        page,
                        status: tab.status,
                    },
                )
            },
        )
        .await?;

    let rows = query.filter().apply(&loaded.items);
    let table = requests_table(&rows, TableMode::Review, local_offset);
    let fixed_params = tab.params();

    Ok(paged_table(
        &review_target(&fixed_params),
        query,
        page,
        &loaded.info,
        state.pagination_config.max_pages,
        &table,
    ))
}

async fn review_table_for(
    state: &TableState,
    session: &Session,
    tab: ReviewTab,
    query: &ListQuery,
    refresh: bool,
) -> Result<Markup, Error> {
    match tab.kind {
        RequestKind::Fund => {
            review_table::<FundRequest>(state, session, tab, query, refresh).await
        }
        RequestKind::Transfer => {
            review_table::<TransferRequest>(state, session, tab, query, refresh).await
        }
    }
}

fn tab_link(url: &str, label: &str, is_current: bool) -> Markup {
    let style = if is_current {
        "inline-block px-4 py-2 rounded-t-lg border-b-2 border-blue-600 \
        text-blue-600 dark:text-blue-500 dark:border-blue-500"
    } else {
        "inline-block px-4 py-2 rounded-t-lg border-b-2 border-transparent \
        hover:text-gray-600 hover:border-gray-300 dark:hover:text-gray-300"
    };

    html!(
        li
        {
            a href=(url) class=(style) aria-current=[is_current.then_some("page")]
            {
                (label)
            }
        }
    )
}

fn review_tabs(current: ReviewTab) -> Markup {
    let statuses = RequestStatus::ALL
        .into_iter()
        .map(|status| (Some(status), status.label()))
        .chain([(None, "All")]);

    html!(
        nav class="space-y-2" aria-label="Review tabs"
        {
            ul
                class="flex flex-wrap text-sm font-medium text-center text-gray-500
                border-b border-gray-200 dark:text-gray-400 dark:border-gray-700"
            {
                @for kind in RequestKind::ALL {
                    @let tab = ReviewTab { kind, ..current };
                    (tab_link(&tab.url(), kind.label(), kind == current.kind))
                }
            }

            ul class="flex flex-wrap text-sm font-medium text-center text-gray-500 dark:text-gray-400"
            {
                @for (status, label) in statuses {
                    @let tab = ReviewTab { status, ..current };
                    (tab_link(&tab.url(), label, status == current.status))
                }
            }
        }
    )
}

/// Display the requests awaiting review, one kind and status at a time.
pub async fn get_review_page(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(tab_query): Query<ReviewTabQuery>,
    Query(query): Query<ListQuery>,
) -> Response {
    let tab = ReviewTab::from(&tab_query);
    let table = match review_table_for(&state, &session, tab, &query, true).await {
        Ok(table) => table,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::REVIEW_VIEW, session.is_admin()).into_html();
    let fixed_params = tab.params();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-6xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Review requests" }

                (review_tabs(tab))
                (filter_bar(&review_target(&fixed_params), &query, &[]))
                (table)
            }
        }
    );

    base("Review requests", &content).into_response()
}

/// The review table for paging, searching and reloading after an action.
pub async fn get_review_table(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(tab_query): Query<ReviewTabQuery>,
    Query(query): Query<ListQuery>,
) -> Response {
    let tab = ReviewTab::from(&tab_query);

    match review_table_for(&state, &session, tab, &query, query.refresh).await {
        Ok(table) => table.into_response(),
        Err(error) => error.into_alert_response(),
    }
}
