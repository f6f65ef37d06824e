//! The pages where users follow the fund and transfer requests they raised.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    api::{RequestQuery, RequestResource},
    auth::Session,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    listing::{ListQuery, REQUESTS_CHANGED, TableState, TableTarget, filter_bar, paged_table},
    navigation::NavBar,
    request::{FundRequest, RequestKind, RequestStatus, TableMode, TransferRequest, requests_table},
    store::FetchKey,
};

/// The scope the user's own requests are cached under.
const OWN_SCOPE: &str = "own";

/// Where the list of a user's own requests of one kind lives.
struct OwnRequestsPage {
    title: &'static str,
    new_request_route: &'static str,
    new_request_label: &'static str,
    target: TableTarget<'static>,
}

fn own_requests_page_for(kind: RequestKind) -> OwnRequestsPage {
    match kind {
        RequestKind::Fund => OwnRequestsPage {
            title: "Fund requests",
            new_request_route: endpoints::NEW_FUND_REQUEST_VIEW,
            new_request_label: "New fund request",
            target: TableTarget {
                view_route: endpoints::FUND_REQUESTS_VIEW,
                fragment_route: endpoints::FUND_REQUESTS_TABLE,
                container_id: "fund-requests-table",
                refresh_event: REQUESTS_CHANGED,
                fixed_params: &[],
            },
        },
        RequestKind::Transfer => OwnRequestsPage {
            title: "Transfers",
            new_request_route: endpoints::NEW_TRANSFER_VIEW,
            new_request_label: "New transfer",
            target: TableTarget {
                view_route: endpoints::TRANSFERS_VIEW,
                fragment_route: endpoints::TRANSFERS_TABLE,
                container_id: "transfers-table",
                refresh_event: REQUESTS_CHANGED,
                fixed_params: &[],
            },
        },
    }
}

/// The status choices of the filter bar.
pub fn status_categories() -> [(&'static str, &'static str); 4] {
    RequestStatus::ALL.map(|status| (status.as_query_value(), status.label()))
}

async fn own_requests_table<R: RequestResource>(
    state: &TableState,
    session: &Session,
    query: &ListQuery,
    refresh: bool,
) -> Result<Markup, Error> {
    let page_info = own_requests_page_for(R::KIND);
    let page = query.page_query(&state.pagination_config);
    let local_offset = state.local_offset()?;
    let gateway = R::gateway(&state.gateways);

    let loaded = state
        .stores
        .load::<R, _, _>(
            &session.user_id,
            FetchKey::new(page, OWN_SCOPE),
            refresh,
            || {
                gateway.list(
                    &session.access_token,
                    RequestQuery { page, status: None },
                )
            },
        )
        .await?;

    let filter = query.filter();
    let rows = filter.apply(&loaded.items);
    let table = requests_table(&rows, TableMode::Own, local_offset);

    Ok(paged_table(
        &page_info.target,
        query,
        page,
        &loaded.info,
        state.pagination_config.max_pages,
        &table,
    ))
}

async fn own_requests_page<R: RequestResource>(
    state: TableState,
    session: Session,
    query: ListQuery,
) -> Response {
    let page_info = own_requests_page_for(R::KIND);
    let table = match own_requests_table::<R>(&state, &session, &query, true).await {
        Ok(table) => table,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(page_info.target.view_route, session.is_admin()).into_html();
    let categories = status_categories();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (page_info.title) }

                    a href=(page_info.new_request_route) class=(LINK_STYLE)
                    {
                        (page_info.new_request_label)
                    }
                }

                (filter_bar(&page_info.target, &query, &categories))
                (table)
            }
        }
    );

    base(page_info.title, &content).into_response()
}

async fn own_requests_fragment<R: RequestResource>(
    state: TableState,
    session: Session,
    query: ListQuery,
) -> Response {
    match own_requests_table::<R>(&state, &session, &query, query.refresh).await {
        Ok(table) => table.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Display the fund requests the user has raised.
///
/// A page load always fetches, the table fragment reuses the loaded page
/// unless asked to refresh.
pub async fn get_fund_requests_page(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    own_requests_page::<FundRequest>(state, session, query).await
}

/// The table of the user's fund requests, for paging, filtering and reloading.
pub async fn get_fund_requests_table(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    own_requests_fragment::<FundRequest>(state, session, query).await
}

/// Display the transfer requests the user has raised.
pub async fn get_transfers_page(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    own_requests_page::<TransferRequest>(state, session, query).await
}

pub async fn get_transfers_table(
    State(state): State<TableState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListQuery>,
) -> Response {
    own_requests_fragment::<TransferRequest>(state, session, query).await
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{FromRef, Query, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        Error,
        api::RecordedFetch,
        listing::{ListQuery, TableState},
        pagination::PageQuery,
        test_utils::{
            assert_valid_html, body_text, demo_backend, parse_html_document,
            parse_html_fragment, test_state, user_session,
        },
    };

    use super::{get_fund_requests_page, get_fund_requests_table, get_transfers_page};

    fn row_ids(html: &scraper::Html) -> Vec<String> {
        html.select(&Selector::parse("tr[data-request-id]").unwrap())
            .filter_map(|row| row.value().attr("data-request-id").map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn page_lists_only_own_requests() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));
        let session = user_session(&backend);

        let response = get_fund_requests_page(
            State(state),
            Extension(session),
            Query(ListQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let ids = row_ids(&document);
        assert!(!ids.is_empty());
        for id in ids {
            let request = backend.fund_request(&id).unwrap();
            assert_eq!(request.user_id, "u-asha");
        }
    }

    #[tokio::test]
    async fn moving_to_page_two_fetches_exactly_that_page() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));
        let session = user_session(&backend);
        let first = ListQuery {
            page: Some(1),
            limit: Some(5),
            ..Default::default()
        };
        let second = ListQuery {
            page: Some(2),
            ..first.clone()
        };

        get_fund_requests_page(
            State(state.clone()),
            Extension(session.clone()),
            Query(first),
        )
        .await;
        let response =
            get_fund_requests_table(State(state), Extension(session), Query(second)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            backend.recorded_fetches(),
            [
                RecordedFetch {
                    resource: "fund-requests",
                    page: PageQuery { page: 1, limit: 5 },
                    status: None,
                },
                RecordedFetch {
                    resource: "fund-requests",
                    page: PageQuery { page: 2, limit: 5 },
                    status: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn filtering_reuses_the_loaded_page() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));
        let session = user_session(&backend);

        get_fund_requests_table(
            State(state.clone()),
            Extension(session.clone()),
            Query(ListQuery::default()),
        )
        .await;
        let response = get_fund_requests_table(
            State(state),
            Extension(session),
            Query(ListQuery {
                category: "REJECTED".to_owned(),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(backend.recorded_fetches().len(), 1);
        let html = parse_html_fragment(response).await;
        for id in row_ids(&html) {
            let request = backend.fund_request(&id).unwrap();
            assert_eq!(request.review.status.as_query_value(), "REJECTED");
        }
    }

    #[tokio::test]
    async fn refresh_fetches_again() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));
        let session = user_session(&backend);

        for refresh in [false, true] {
            get_fund_requests_table(
                State(state.clone()),
                Extension(session.clone()),
                Query(ListQuery {
                    refresh,
                    ..Default::default()
                }),
            )
            .await;
        }

        assert_eq!(backend.recorded_fetches().len(), 2);
    }

    #[tokio::test]
    async fn page_load_fetches_even_when_cached() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));
        let session = user_session(&backend);

        for _ in 0..2 {
            get_fund_requests_page(
                State(state.clone()),
                Extension(session.clone()),
                Query(ListQuery::default()),
            )
            .await;
        }

        assert_eq!(backend.recorded_fetches().len(), 2);
    }

    #[tokio::test]
    async fn fragment_failure_is_an_alert() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));
        let session = user_session(&backend);
        backend.fail_with(Some(Error::Network("connection refused".to_owned())));

        let response = get_fund_requests_table(
            State(state),
            Extension(session),
            Query(ListQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains("role=\"alert\""));
    }

    #[tokio::test]
    async fn transfers_page_links_to_new_transfer() {
        let backend = demo_backend();
        let state = TableState::from_ref(&test_state(backend.clone()));
        let session = user_session(&backend);

        let response =
            get_transfers_page(State(state), Extension(session), Query(ListQuery::default()))
                .await;

        assert!(body_text(response).await.contains("/transfers/new"));
    }
}
