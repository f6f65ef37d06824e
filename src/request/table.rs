//! The table of fund or transfer requests shown to users and to admins.

use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_ACTION_STYLE, BUTTON_DELETE_STYLE, MODAL_CONTAINER_ID, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, date_time, empty_table_row, format_currency,
        status_badge,
    },
    request::{ReviewAction, Reviewable, check_record},
};

/// Who the table is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// An admin reviewing everyone's requests, with the requester and the review actions.
    Review,
    /// A user looking at their own requests.
    Own,
}

/// The route for `template` filled in with the request kind and id.
pub fn review_url<R: Reviewable>(template: &str, id: &str) -> String {
    format_endpoint(&format_endpoint(template, R::KIND), id)
}

fn action_button<R: Reviewable>(request: &R, action: ReviewAction) -> Markup {
    let id = request.id();

    match action {
        ReviewAction::Process => html!(
            button
                type="button"
                class=(BUTTON_ACTION_STYLE)
                data-action="process"
                hx-get=(review_url::<R>(endpoints::PROCESS_MODAL, id))
                hx-target={ "#" (MODAL_CONTAINER_ID) }
                hx-swap="innerHTML"
                hx-target-error="#alert-container"
            {
                (action.label())
            }
        ),
        ReviewAction::Approve => html!(
            button
                type="button"
                class=(BUTTON_ACTION_STYLE)
                data-action="approve"
                hx-post=(review_url::<R>(endpoints::APPROVE_REQUEST, id))
                hx-confirm={ "Approve request " (id) " for " (format_currency(request.amount(), request.currency())) "?" }
                hx-target={ "#" (MODAL_CONTAINER_ID) }
                hx-swap="innerHTML"
                hx-target-error="#alert-container"
            {
                (action.label())
            }
        ),
        ReviewAction::Reject => html!(
            button
                type="button"
                class=(BUTTON_DELETE_STYLE)
                data-action="reject"
                hx-get=(review_url::<R>(endpoints::REJECT_MODAL, id))
                hx-target={ "#" (MODAL_CONTAINER_ID) }
                hx-swap="innerHTML"
                hx-target-error="#alert-container"
            {
                (action.label())
            }
        ),
    }
}

/// What the review has produced so far: the transaction ID, or why it was rejected.
fn review_outcome<R: Reviewable>(request: &R) -> Markup {
    let review = request.review();

    html!(
        @if let Some(reason) = &review.rejection_reason {
            span class="text-red-700 dark:text-red-400" { (reason) }
        } @else if let Some(transaction_id) = &review.transaction_id {
            span class="font-mono" { (transaction_id) }
        } @else {
            span class="text-gray-400" { "-" }
        }

        @if let Some(notes) = &review.notes {
            p class="text-xs text-gray-500 dark:text-gray-400" { (notes) }
        }
    )
}

/// Render `requests` as a table.
///
/// Records missing the fields their status requires are still shown, but logged.
pub fn requests_table<R: Reviewable>(
    requests: &[&R],
    mode: TableMode,
    local_offset: UtcOffset,
) -> Markup {
    for request in requests {
        if let Err(error) = check_record(request.review()) {
            tracing::warn!(
                "The {} request {} from the backend is inconsistent: {error}",
                R::KIND,
                request.id()
            );
        }
    }

    let column_count = match mode {
        TableMode::Review => 8,
        TableMode::Own => 6,
    };

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
                        @if mode == TableMode::Review {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Requested by" }
                        }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Details" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transaction ID / reason" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                        @if mode == TableMode::Review {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }
                }

                tbody
                {
                    @for request in requests {
                        tr class=(TABLE_ROW_STYLE) data-request-id=(request.id())
                        {
                            th
                                scope="row"
                                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                            {
                                (request.id())
                            }

                            @if mode == TableMode::Review {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if let Some(user) = request.requester() {
                                        div { (user.name) }
                                        div class="text-xs" { (user.email) }
                                    } @else {
                                        (request.owner_id().unwrap_or("Unknown"))
                                    }
                                }
                            }

                            td class=(TABLE_CELL_STYLE) { (request.summary()) }

                            td class="px-6 py-4 text-right whitespace-nowrap"
                            {
                                (format_currency(request.amount(), request.currency()))
                            }

                            td class=(TABLE_CELL_STYLE) { (status_badge(request.review().status)) }

                            td class=(TABLE_CELL_STYLE) { (review_outcome(*request)) }

                            td class="px-6 py-4 whitespace-nowrap"
                            {
                                (date_time(request.created_at(), local_offset))
                            }

                            @if mode == TableMode::Review {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    div class="flex gap-4"
                                    {
                                        @for action in request.review().status.available_actions() {
                                            (action_button(*request, *action))
                                        }
                                    }
                                }
                            }
                        }
                    }

                    @if requests.is_empty() {
                        (empty_table_row(column_count, "No requests to show."))
                    }
                }
            }
        }
    )
}
