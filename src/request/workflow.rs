//! The review workflow shared by fund and transfer requests.
//!
//! A request starts out pending. An admin moves it to processing by assigning
//! the bank transaction ID, then either approves it (completed) or rejects it
//! with a reason. No transition leads back to pending.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Where a fund or transfer request, or a transaction, is in the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "processing")]
    Processing,
    #[serde(alias = "APPROVED", alias = "approved", alias = "completed")]
    Completed,
    #[serde(alias = "rejected")]
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::Processing,
        RequestStatus::Completed,
        RequestStatus::Rejected,
    ];

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn from_query_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "COMPLETED" | "APPROVED" => Some(Self::Completed),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }

    /// The status a request moves to when `action` is taken on it.
    pub fn next_for(self, action: ReviewAction) -> Result<Self, WorkflowError> {
        match (self, action) {
            (Self::Pending, ReviewAction::Process) => Ok(Self::Processing),
            (Self::Processing, ReviewAction::Approve) => Ok(Self::Completed),
            (Self::Processing, ReviewAction::Reject) => Ok(Self::Rejected),
            (from, action) => Err(WorkflowError::InvalidTransition { from, action }),
        }
    }

    /// The actions an admin may take on a request with this status.
    pub fn available_actions(self) -> &'static [ReviewAction] {
        match self {
            Self::Pending => &[ReviewAction::Process],
            Self::Processing => &[ReviewAction::Approve, ReviewAction::Reject],
            Self::Completed | Self::Rejected => &[],
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An admin action in the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewAction {
    Process,
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Process => "Process",
            Self::Approve => "Approve",
            Self::Reject => "Reject",
        }
    }
}

impl Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process => f.write_str("process"),
            Self::Approve => f.write_str("approve"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Why a review action was refused before it reached the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// The action does not apply to a request in the `from` state.
    #[error("cannot {action} a request that is {from}")]
    InvalidTransition {
        /// The status of the request.
        from: RequestStatus,
        /// The attempted action.
        action: ReviewAction,
    },

    /// Processing a request needs the bank transaction ID.
    #[error("enter the transaction ID for this request")]
    MissingTransactionId,

    /// Rejecting a request needs a reason.
    #[error("select or enter a reason for rejecting this request")]
    MissingRejectionReason,

    /// The submitted reason is not one of the listed reasons.
    #[error("the selected rejection reason is not recognised")]
    UnknownRejectionReason,
}

/// The reasons an admin can pick from when rejecting a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    PaymentNotReceived,
    AmountMismatch,
    InvalidPaymentDetails,
    SuspectedFraud,
    DuplicateRequest,
    Other,
}

impl RejectionReason {
    pub const ALL: [RejectionReason; 6] = [
        RejectionReason::PaymentNotReceived,
        RejectionReason::AmountMismatch,
        RejectionReason::InvalidPaymentDetails,
        RejectionReason::SuspectedFraud,
        RejectionReason::DuplicateRequest,
        RejectionReason::Other,
    ];

    pub fn value(self) -> &'static str {
        match self {
            Self::PaymentNotReceived => "payment-not-received",
            Self::AmountMismatch => "amount-mismatch",
            Self::InvalidPaymentDetails => "invalid-payment-details",
            Self::SuspectedFraud => "suspected-fraud",
            Self::DuplicateRequest => "duplicate-request",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PaymentNotReceived => "Payment not received",
            Self::AmountMismatch => "Amount does not match payment",
            Self::InvalidPaymentDetails => "Invalid payment details",
            Self::SuspectedFraud => "Suspected fraudulent activity",
            Self::DuplicateRequest => "Duplicate request",
            Self::Other => "Other",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|reason| reason.value().eq_ignore_ascii_case(value.trim()))
    }
}

/// Turn the selected reason and the free text box into the reason sent to the backend.
///
/// Listed reasons are sent as their label. "Other" needs non-blank free text.
pub fn resolve_rejection_reason(reason: &str, custom_reason: &str) -> Result<String, WorkflowError> {
    if reason.trim().is_empty() {
        return Err(WorkflowError::MissingRejectionReason);
    }

    match RejectionReason::from_value(reason) {
        None => Err(WorkflowError::UnknownRejectionReason),
        Some(RejectionReason::Other) => {
            let custom_reason = custom_reason.trim();

            if custom_reason.is_empty() {
                Err(WorkflowError::MissingRejectionReason)
            } else {
                Ok(custom_reason.to_owned())
            }
        }
        Some(reason) => Ok(reason.label().to_owned()),
    }
}

/// The validated input for moving a request to processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInput {
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ProcessInput {
    /// Trim both fields. A blank transaction ID is an error and blank notes become `None`.
    pub fn new(transaction_id: &str, notes: &str) -> Result<Self, WorkflowError> {
        let transaction_id = transaction_id.trim();

        if transaction_id.is_empty() {
            return Err(WorkflowError::MissingTransactionId);
        }

        let notes = notes.trim();
        let notes = (!notes.is_empty()).then(|| notes.to_owned());

        Ok(Self {
            transaction_id: transaction_id.to_owned(),
            notes,
        })
    }
}

/// A validated review action, ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    Process(ProcessInput),
    Approve,
    Reject { reason: String },
}

impl ReviewCommand {
    pub fn action(&self) -> ReviewAction {
        match self {
            Self::Process(_) => ReviewAction::Process,
            Self::Approve => ReviewAction::Approve,
            Self::Reject { .. } => ReviewAction::Reject,
        }
    }
}

/// The review fields shared by fund and transfer requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl ReviewState {
    pub fn pending() -> Self {
        Self {
            status: RequestStatus::Pending,
            transaction_id: None,
            notes: None,
            rejection_reason: None,
            updated_at: None,
        }
    }

    /// Move to the next status and record the input that came with the action.
    ///
    /// Leaves the state untouched when the action does not apply.
    pub fn apply(&mut self, command: &ReviewCommand, now: OffsetDateTime) -> Result<(), WorkflowError> {
        let next = self.status.next_for(command.action())?;

        match command {
            ReviewCommand::Process(input) => {
                self.transaction_id = Some(input.transaction_id.clone());
                self.notes = input.notes.clone();
            }
            ReviewCommand::Approve => {}
            ReviewCommand::Reject { reason } => {
                if reason.trim().is_empty() {
                    return Err(WorkflowError::MissingRejectionReason);
                }

                self.rejection_reason = Some(reason.trim().to_owned());
            }
        }

        self.status = next;
        self.updated_at = Some(now);

        Ok(())
    }
}

/// Check that a record from the backend carries the fields its status requires.
///
/// Processing requests need a transaction ID and rejected requests need a reason.
pub fn check_record(review: &ReviewState) -> Result<(), WorkflowError> {
    let is_blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());

    match review.status {
        RequestStatus::Processing if is_blank(&review.transaction_id) => {
            Err(WorkflowError::MissingTransactionId)
        }
        RequestStatus::Rejected if is_blank(&review.rejection_reason) => {
            Err(WorkflowError::MissingRejectionReason)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::{
        ProcessInput, RejectionReason, RequestStatus, ReviewAction, ReviewCommand, ReviewState,
        WorkflowError, check_record, resolve_rejection_reason,
    };

    #[test]
    fn allowed_transitions() {
        assert_eq!(
            RequestStatus::Pending.next_for(ReviewAction::Process),
            Ok(RequestStatus::Processing)
        );
        assert_eq!(
            RequestStatus::Processing.next_for(ReviewAction::Approve),
            Ok(RequestStatus::Completed)
        );
        assert_eq!(
            RequestStatus::Processing.next_for(ReviewAction::Reject),
            Ok(RequestStatus::Rejected)
        );
    }

    #[test]
    fn no_transition_returns_to_pending() {
        for status in RequestStatus::ALL {
            for action in [
                ReviewAction::Process,
                ReviewAction::Approve,
                ReviewAction::Reject,
            ] {
                assert_ne!(status.next_for(action), Ok(RequestStatus::Pending));
            }
        }
    }

    #[test]
    fn terminal_states_have_no_actions() {
        assert!(RequestStatus::Completed.available_actions().is_empty());
        assert!(RequestStatus::Rejected.available_actions().is_empty());
        assert_eq!(
            RequestStatus::Completed.next_for(ReviewAction::Reject),
            Err(WorkflowError::InvalidTransition {
                from: RequestStatus::Completed,
                action: ReviewAction::Reject
            })
        );
    }

    #[test]
    fn pending_cannot_be_approved_directly() {
        assert!(RequestStatus::Pending.next_for(ReviewAction::Approve).is_err());
    }

    #[test]
    fn approved_is_read_as_completed() {
        let status: RequestStatus = serde_json::from_str("\"APPROVED\"").unwrap();

        assert_eq!(status, RequestStatus::Completed);
        assert_eq!(
            RequestStatus::from_query_value("approved"),
            Some(RequestStatus::Completed)
        );
    }

    #[test]
    fn process_input_blank_notes_become_none() {
        let got = ProcessInput::new("TXN123", "   ").unwrap();

        assert_eq!(
            got,
            ProcessInput {
                transaction_id: "TXN123".to_owned(),
                notes: None
            }
        );
    }

    #[test]
    fn process_input_trims_fields() {
        let got = ProcessInput::new("  TXN9 ", " paid via NEFT ").unwrap();

        assert_eq!(got.transaction_id, "TXN9");
        assert_eq!(got.notes.as_deref(), Some("paid via NEFT"));
    }

    #[test]
    fn process_input_requires_transaction_id() {
        assert_eq!(
            ProcessInput::new(" \t", "notes"),
            Err(WorkflowError::MissingTransactionId)
        );
    }

    #[test]
    fn process_input_omits_missing_notes_on_the_wire() {
        let json = serde_json::to_string(&ProcessInput::new("TXN1", "").unwrap()).unwrap();

        assert_eq!(json, r#"{"transactionId":"TXN1"}"#);
    }

    #[test]
    fn listed_reason_uses_label() {
        let got = resolve_rejection_reason(RejectionReason::AmountMismatch.value(), "ignored");

        assert_eq!(got, Ok(RejectionReason::AmountMismatch.label().to_owned()));
    }

    #[test]
    fn other_reason_requires_text() {
        assert_eq!(
            resolve_rejection_reason("other", "  "),
            Err(WorkflowError::MissingRejectionReason)
        );
        assert_eq!(
            resolve_rejection_reason("other", " Customer asked to cancel "),
            Ok("Customer asked to cancel".to_owned())
        );
    }

    #[test]
    fn reason_must_be_selected_and_known() {
        assert_eq!(
            resolve_rejection_reason("", "text"),
            Err(WorkflowError::MissingRejectionReason)
        );
        assert_eq!(
            resolve_rejection_reason("bogus", ""),
            Err(WorkflowError::UnknownRejectionReason)
        );
    }

    #[test]
    fn apply_records_transaction_id_and_reason() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let mut state = ReviewState::pending();

        state
            .apply(
                &ReviewCommand::Process(ProcessInput::new("TXN1", "").unwrap()),
                now,
            )
            .unwrap();
        assert_eq!(state.status, RequestStatus::Processing);
        assert_eq!(state.transaction_id.as_deref(), Some("TXN1"));
        assert_eq!(check_record(&state), Ok(()));

        state
            .apply(
                &ReviewCommand::Reject {
                    reason: "Duplicate request".to_owned(),
                },
                now,
            )
            .unwrap();
        assert_eq!(state.status, RequestStatus::Rejected);
        assert_eq!(check_record(&state), Ok(()));
    }

    #[test]
    fn apply_leaves_state_unchanged_on_invalid_action() {
        let mut state = ReviewState::pending();
        let before = state.clone();

        let got = state.apply(&ReviewCommand::Approve, OffsetDateTime::UNIX_EPOCH);

        assert!(got.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn check_record_flags_missing_fields() {
        let mut state = ReviewState::pending();
        state.status = RequestStatus::Processing;
        assert_eq!(check_record(&state), Err(WorkflowError::MissingTransactionId));

        state.status = RequestStatus::Rejected;
        state.rejection_reason = Some(" ".to_owned());
        assert_eq!(check_record(&state), Err(WorkflowError::MissingRejectionReason));
    }
}
