use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    request::{RejectionReason, resolve_rejection_reason},
};

use super::ModalForm;

/// Collects why an admin is rejecting a request.
///
/// `reason` is one of the [RejectionReason] values. `custom_reason` is only
/// used, and then required, when the reason is "other".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RejectReasonForm {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub custom_reason: String,
}

impl ModalForm for RejectReasonForm {
    type Output = String;

    fn validate(&self) -> Result<String, Error> {
        Ok(resolve_rejection_reason(&self.reason, &self.custom_reason)?)
    }

    fn fields(&self) -> Markup {
        let is_other = self.reason == RejectionReason::Other.value();

        html!(
            div
            {
                label for="reason" class=(FORM_LABEL_STYLE) { "Reason" }
                select id="reason" name="reason" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[self.reason.is_empty()] disabled { "Choose a reason" }

                    @for reason in RejectionReason::ALL {
                        option value=(reason.value()) selected[self.reason == reason.value()]
                        {
                            (reason.label())
                        }
                    }
                }
            }

            div
            {
                label for="custom_reason" class=(FORM_LABEL_STYLE)
                {
                    "Details"
                    @if !is_other { " (only needed for \"Other\")" }
                }
                textarea
                    id="custom_reason"
                    name="custom_reason"
                    rows="3"
                    required[is_other]
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (self.custom_reason)
                }
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use crate::{
        Error,
        modal::{Modal, ModalForm},
        request::WorkflowError,
    };

    use super::RejectReasonForm;

    #[tokio::test]
    async fn other_without_text_never_calls_back() {
        let mut modal = Modal::open(RejectReasonForm {
            reason: "other".to_owned(),
            custom_reason: "  ".to_owned(),
        });
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let got = modal
            .submit(|_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(
            got,
            Err(Error::Workflow(WorkflowError::MissingRejectionReason))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!modal.can_confirm());
    }

    #[test]
    fn listed_reason_resolves_to_label() {
        let form = RejectReasonForm {
            reason: "duplicate-request".to_owned(),
            custom_reason: String::new(),
        };

        assert_eq!(form.validate().unwrap(), "Duplicate request");
    }

    #[test]
    fn other_uses_custom_text() {
        let form = RejectReasonForm {
            reason: "other".to_owned(),
            custom_reason: " Account frozen ".to_owned(),
        };

        assert_eq!(form.validate().unwrap(), "Account frozen");
    }

    #[test]
    fn no_reason_is_invalid() {
        assert!(RejectReasonForm::default().validate().is_err());
    }

    #[test]
    fn fields_select_current_reason() {
        let form = RejectReasonForm {
            reason: "suspected-fraud".to_owned(),
            custom_reason: String::new(),
        };

        let html = scraper::Html::parse_fragment(&form.fields().into_string());
        let selector = scraper::Selector::parse("option[selected]").unwrap();
        let selected: Vec<_> = html
            .select(&selector)
            .filter_map(|option| option.attr("value"))
            .collect();

        assert_eq!(selected, ["suspected-fraud"]);
    }
}
