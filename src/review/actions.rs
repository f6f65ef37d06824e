//! The admin actions on a single request: process, approve and reject.
//!
//! Processing and rejecting go through a modal that collects the transaction
//! ID or the reason. Approving only asks for confirmation in the browser.

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error, Gateways,
    alert::Alert,
    api::RequestResource,
    auth::Session,
    endpoints,
    html::format_currency,
    listing::{REQUESTS_CHANGED, mutation_response},
    modal::{Modal, ModalForm, ModalFrame, RejectReasonForm, TransactionIdForm},
    request::{
        FundRequest, RequestKind, ReviewAction, ReviewCommand, TransferRequest, review_url,
    },
    store::SessionStores,
};

/// Run `$body` with `$R` bound to the request type for `$kind`.
macro_rules! for_request_kind {
    ($kind:expr, $R:ident => $body:expr) => {
        match $kind {
            RequestKind::Fund => {
                type $R = FundRequest;
                $body
            }
            RequestKind::Transfer => {
                type $R = TransferRequest;
                $body
            }
        }
    };
}

/// The state needed by the review actions.
#[derive(Debug, Clone)]
pub struct ReviewActionState {
    pub gateways: Gateways,
    pub stores: SessionStores,
}

impl FromRef<AppState> for ReviewActionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            gateways: state.gateways.clone(),
            stores: state.stores.clone(),
        }
    }
}

const PROCESS_LABEL: &str = "Process";
const REJECT_LABEL: &str = "Reject";

fn request_details<R: RequestResource>(request: &R) -> Markup {
    html!(
        dl class="grid grid-cols-2 gap-2 text-sm text-gray-700 dark:text-gray-300"
        {
            dt class="font-medium" { "Request" }
            dd class="font-mono" { (request.id()) }

            @if let Some(user) = request.requester() {
                dt class="font-medium" { "Requested by" }
                dd { (user.name) " (" (user.email) ")" }
            }

            dt class="font-medium" { "Amount" }
            dd { (format_currency(request.amount(), request.currency())) }

            dt class="font-medium" { "Details" }
            dd { (request.summary()) }
        }
    )
}

/// Load the request and check `action` is allowed in its current status.
async fn reviewable_request<R: RequestResource>(
    state: &ReviewActionState,
    session: &Session,
    id: &str,
    action: ReviewAction,
) -> Result<R, Error> {
    let request = R::gateway(&state.gateways)
        .get(&session.access_token, id)
        .await?;
    request.review().status.next_for(action)?;

    Ok(request)
}

fn process_frame<R: RequestResource>(request: &R) -> ModalFrame<'static> {
    ModalFrame {
        title: "Process request",
        confirm_label: PROCESS_LABEL,
        confirm_url: review_url::<R>(endpoints::PROCESS_REQUEST, request.id()),
        validate_url: review_url::<R>(endpoints::PROCESS_MODAL_VALIDATE, request.id()),
        details: request_details(request),
    }
}

fn reject_frame<R: RequestResource>(request: &R) -> ModalFrame<'static> {
    ModalFrame {
        title: "Reject request",
        confirm_label: REJECT_LABEL,
        confirm_url: review_url::<R>(endpoints::REJECT_REQUEST, request.id()),
        validate_url: review_url::<R>(endpoints::REJECT_MODAL_VALIDATE, request.id()),
        details: request_details(request),
    }
}

/// Validate `form`, send the resulting command and refresh the admin's view.
async fn submit_review<R: RequestResource, F: ModalForm>(
    state: &ReviewActionState,
    session: &Session,
    id: &str,
    form: F,
    into_command: impl FnOnce(F::Output) -> ReviewCommand,
) -> Result<ReviewAction, Error> {
    let gateway = R::gateway(&state.gateways);
    let mut modal = Modal::open(form);
    let mut action = None;

    modal
        .submit(|output| {
            let command = into_command(output);
            action = Some(command.action());

            async move {
                gateway
                    .review(&session.access_token, id, &command)
                    .await
            }
        })
        .await?;

    state.stores.invalidate::<R>(&session.user_id)?;
    tracing::info!(
        "Admin {} took action on {} request {id}",
        session.user_id,
        R::KIND
    );

    action.ok_or_else(|| Error::Validation("No review action was taken.".to_owned()))
}

fn review_success(action: ReviewAction, id: &str) -> Response {
    let message = match action {
        ReviewAction::Process => "Request moved to processing",
        ReviewAction::Approve => "Request approved",
        ReviewAction::Reject => "Request rejected",
    };

    mutation_response(REQUESTS_CHANGED, Alert::success(message, id))
}

/// The modal for assigning a transaction ID to a pending request.
pub async fn get_process_modal(
    State(state): State<ReviewActionState>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(RequestKind, String)>,
) -> Response {
    let modal = Modal::open(TransactionIdForm::default());

    let result = for_request_kind!(kind, R => {
        reviewable_request::<R>(&state, &session, &id, ReviewAction::Process)
            .await
            .map(|request| modal.view(&process_frame(&request)))
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Re-render the process modal's footer as the admin types.
pub async fn validate_process_modal(Form(form): Form<TransactionIdForm>) -> Markup {
    Modal::open(form).footer(PROCESS_LABEL, true)
}

/// Move a pending request to processing.
pub async fn process_request(
    State(state): State<ReviewActionState>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(RequestKind, String)>,
    Form(form): Form<TransactionIdForm>,
) -> Response {
    let result = for_request_kind!(kind, R => {
        submit_review::<R, _>(&state, &session, &id, form, ReviewCommand::Process).await
    });

    match result {
        Ok(action) => review_success(action, &id),
        Err(error) => error.into_alert_response(),
    }
}

/// The modal for rejecting a request that is being processed.
pub async fn get_reject_modal(
    State(state): State<ReviewActionState>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(RequestKind, String)>,
) -> Response {
    let modal = Modal::open(RejectReasonForm::default());

    let result = for_request_kind!(kind, R => {
        reviewable_request::<R>(&state, &session, &id, ReviewAction::Reject)
            .await
            .map(|request| modal.view(&reject_frame(&request)))
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Re-render the reject modal's footer as the admin picks a reason.
pub async fn validate_reject_modal(Form(form): Form<RejectReasonForm>) -> Markup {
    Modal::open(form).footer(REJECT_LABEL, true)
}

/// Reject a request that is being processed.
pub async fn reject_request(
    State(state): State<ReviewActionState>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(RequestKind, String)>,
    Form(form): Form<RejectReasonForm>,
) -> Response {
    let result = for_request_kind!(kind, R => {
        submit_review::<R, _>(&state, &session, &id, form, |reason| ReviewCommand::Reject {
            reason,
        })
        .await
    });

    match result {
        Ok(action) => review_success(action, &id),
        Err(error) => error.into_alert_response(),
    }
}

/// Complete a request that is being processed.
pub async fn approve_request(
    State(state): State<ReviewActionState>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(RequestKind, String)>,
) -> Response {
    let result = for_request_kind!(kind, R => {
        let gateway = R::gateway(&state.gateways);

        match gateway.review(&session.access_token, &id, &ReviewCommand::Approve).await {
            Ok(()) => state.stores.invalidate::<R>(&session.user_id),
            Err(error) => Err(error),
        }
    });

    match result {
        Ok(()) => {
            tracing::info!("Admin {} approved {kind} request {id}", session.user_id);
            review_success(ReviewAction::Approve, &id)
        }
        Err(error) => error.into_alert_response(),
    }
}
