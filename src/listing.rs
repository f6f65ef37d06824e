//! Client-side filtering of the loaded page and the shared controls for paged tables.

use axum::{
    extract::FromRef,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::{
    AppState, Error, Gateways,
    alert::Alert,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, table_loading_indicator},
    pagination::{
        PageInfo, PageQuery, PaginationConfig, PaginationIndicator, create_pagination_indicators,
    },
    store::SessionStores,
    timezone::get_local_offset,
};

/// Fired after a fund or transfer request changes.
pub const REQUESTS_CHANGED: &str = "requests-changed";
/// Fired after a bank account is added, changed or removed.
pub const ACCOUNTS_CHANGED: &str = "accounts-changed";
/// Fired after a user's portal access changes.
pub const USERS_CHANGED: &str = "users-changed";

/// The reply to a successful mutation made from a modal or a table row.
///
/// The body empties whatever the request targeted, the alert is swapped in
/// out-of-band and `event` makes the listening tables reload.
pub fn mutation_response(event: &'static str, alert: Alert) -> Response {
    ([("HX-Trigger", event)], alert.into_oob_html()).into_response()
}

/// The state needed by the pages and fragments that show a paged table.
#[derive(Debug, Clone)]
pub struct TableState {
    pub gateways: Gateways,
    pub stores: SessionStores,
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TableState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            gateways: state.gateways.clone(),
            stores: state.stores.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

impl TableState {
    pub fn local_offset(&self) -> Result<UtcOffset, Error> {
        get_local_offset(&self.local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(self.local_timezone.clone()))
    }
}

/// A record that can be narrowed down by the search box and category selector.
pub trait Searchable {
    /// The text fields the search box matches against.
    fn search_fields(&self) -> Vec<&str>;

    /// The value matched by the category selector, if the record has one.
    fn category(&self) -> Option<&str> {
        None
    }
}

/// A search term plus an optional category.
///
/// Only the currently loaded page is filtered, never the full remote collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub search: String,
    pub category: String,
}

impl ListFilter {
    pub fn new(search: &str, category: &str) -> Self {
        Self {
            search: search.trim().to_lowercase(),
            category: category.trim().to_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.category.is_empty()
    }

    /// Case-insensitive substring match on any search field, intersected with
    /// an exact (case-insensitive) category match.
    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        let category_matches = self.category.is_empty()
            || item
                .category()
                .is_some_and(|category| category.eq_ignore_ascii_case(&self.category));

        if !category_matches {
            return false;
        }

        self.search.is_empty()
            || item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&self.search))
    }

    pub fn apply<'a, T: Searchable>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }
}

/// The query string accepted by every paged table and its page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// Set by the table container when it reloads after a mutation.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub refresh: bool,
}

impl ListQuery {
    pub fn page_query(&self, config: &PaginationConfig) -> PageQuery {
        PageQuery::new(self.page, self.limit, config)
    }

    pub fn filter(&self) -> ListFilter {
        ListFilter::new(&self.search, &self.category)
    }

    /// The same query pointing at `page`, as a URL query string.
    pub fn to_query_string(&self, page: PageQuery) -> String {
        let query = ListQuery {
            page: Some(page.page),
            limit: Some(page.limit),
            refresh: false,
            ..self.clone()
        };

        serde_urlencoded::to_string(&query).unwrap_or_default()
    }
}

/// The routes and element id a paged table is served from.
#[derive(Debug, Clone, Copy)]
pub struct TableTarget<'a> {
    /// The full page route, pushed to the browser history on navigation.
    pub view_route: &'a str,
    /// The route serving only the table fragment.
    pub fragment_route: &'a str,
    /// The id of the element the fragment replaces.
    pub container_id: &'a str,
    /// The `HX-Trigger` event that makes the table reload itself.
    pub refresh_event: &'a str,
    /// Extra query parameters the table always carries, e.g. `kind=fund`.
    pub fixed_params: &'a [(&'a str, &'a str)],
}

impl TableTarget<'_> {
    fn url(&self, route: &str, query: &ListQuery, page: PageQuery, refresh: bool) -> String {
        let mut query_string = query.to_query_string(page);

        for (key, value) in self.fixed_params {
            let pair = serde_urlencoded::to_string([(key, value)]).unwrap_or_default();
            query_string = if query_string.is_empty() {
                pair
            } else {
                format!("{pair}&{query_string}")
            };
        }

        if refresh {
            query_string.push_str("&refresh=true");
        }

        format!("{route}?{query_string}")
    }

    pub fn view_url(&self, query: &ListQuery, page: PageQuery) -> String {
        self.url(self.view_route, query, page, false)
    }

    pub fn fragment_url(&self, query: &ListQuery, page: PageQuery) -> String {
        self.url(self.fragment_route, query, page, false)
    }

    pub fn refresh_url(&self, query: &ListQuery, page: PageQuery) -> String {
        self.url(self.fragment_route, query, page, true)
    }

    fn indicator_id(&self) -> String {
        format!("{}-indicator", self.container_id)
    }

    fn filter_form_id(&self) -> String {
        format!("{}-filters", self.container_id)
    }
}

/// Wrap a table fragment so it can reload itself.
///
/// The container re-fetches the current page when `refresh_event` fires on
/// the body, and `hx-sync` drops any response that a newer request superseded.
/// It also carries the loaded page for the [filter_bar], since the bar
/// itself is not replaced when the user moves between pages.
pub fn table_container(
    target: &TableTarget,
    query: &ListQuery,
    page: PageQuery,
    content: &Markup,
) -> Markup {
    html!(
        div
            id=(target.container_id)
            class="w-full"
            hx-get=(target.refresh_url(query, page))
            hx-trigger={ (target.refresh_event) " from:body" }
            hx-swap="outerHTML"
            hx-sync="this:replace"
            hx-indicator={ "#" (target.indicator_id()) }
            hx-target-error="#alert-container"
        {
            input type="hidden" form=(target.filter_form_id()) name="page" value=(page.page);
            input type="hidden" form=(target.filter_form_id()) name="limit" value=(page.limit);

            (table_loading_indicator(&target.indicator_id()))
            (content)
        }
    )
}

/// A table and its page links, wrapped by [table_container].
pub fn paged_table(
    target: &TableTarget,
    query: &ListQuery,
    page: PageQuery,
    info: &PageInfo,
    max_pages: u64,
    table: &Markup,
) -> Markup {
    let content = html!(
        (table)
        (pagination_nav(target, query, info, max_pages))
    );

    table_container(target, query, page, &content)
}

/// The search box and category selector above a table.
///
/// Both controls re-request the fragment for the current page. The server
/// reuses the loaded page for these requests, so filtering does not re-fetch.
pub fn filter_bar(target: &TableTarget, query: &ListQuery, categories: &[(&str, &str)]) -> Markup {
    let search_id = format!("{}-search", target.container_id);
    let category_id = format!("{}-category", target.container_id);

    html!(
        form
            id=(target.filter_form_id())
            class="flex flex-wrap gap-4 items-end w-full"
            hx-get=(target.fragment_route)
            hx-target={ "#" (target.container_id) }
            hx-swap="outerHTML"
            hx-trigger={ "input changed delay:300ms from:#" (search_id) ", change from:#" (category_id) }
            hx-sync={ "#" (target.container_id) ":replace" }
            hx-target-error="#alert-container"
            onsubmit="return false;"
        {
            @for (key, value) in target.fixed_params {
                input type="hidden" name=(key) value=(value);
            }

            div class="grow"
            {
                label for=(search_id) class=(FORM_LABEL_STYLE) { "Search" }
                input
                    type="search"
                    id=(search_id)
                    name="search"
                    value=(query.search)
                    placeholder="Search this page"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !categories.is_empty() {
                div
                {
                    label for=(category_id) class=(FORM_LABEL_STYLE) { "Status" }
                    select id=(category_id) name="category" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected[query.category.is_empty()] { "All" }
                        @for (value, label) in categories {
                            option
                                value=(value)
                                selected[query.category.eq_ignore_ascii_case(value)]
                            {
                                (label)
                            }
                        }
                    }
                }
            }
        }
    )
}

/// The numbered page links under a table.
///
/// Each link fetches exactly the page it names from the server.
pub fn pagination_nav(
    target: &TableTarget,
    query: &ListQuery,
    info: &PageInfo,
    max_pages: u64,
) -> Markup {
    let indicators = create_pagination_indicators(info.page, info.total_pages, max_pages);

    if indicators.is_empty() {
        return html!();
    }

    let page_link = |page: u64, text: String, current: bool| {
        let page_query = PageQuery {
            page,
            limit: info.limit,
        };
        let style = if current {
            "block px-3 py-2 rounded font-bold text-white bg-blue-600"
        } else {
            "block px-3 py-2 rounded text-blue-600 hover:underline dark:text-blue-500"
        };

        html!(
            a
                href=(target.view_url(query, page_query))
                class=(style)
                aria-current=[current.then_some("page")]
                data-page=(page)
                hx-get=(target.fragment_url(query, page_query))
                hx-target={ "#" (target.container_id) }
                hx-swap="outerHTML"
                hx-push-url=(target.view_url(query, page_query))
                hx-sync={ "#" (target.container_id) ":replace" }
            {
                (text)
            }
        )
    };

    html!(
        nav class="pagination flex justify-center my-4" aria-label="Pagination"
        {
            ul class="flex gap-2 items-center"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::CurrPage(page) => {
                                (page_link(page, page.to_string(), true))
                            }
                            PaginationIndicator::Page(page) => {
                                (page_link(page, page.to_string(), false))
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="px-3 py-2 text-gray-500" { "…" }
                            }
                            PaginationIndicator::BackButton(page) => {
                                (page_link(page, "Back".to_owned(), false))
                            }
                            PaginationIndicator::NextButton(page) => {
                                (page_link(page, "Next".to_owned(), false))
                            }
                        }
                    }
                }
            }
        }
    )
}
