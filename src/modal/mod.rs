//! Confirmation dialogs that collect a little input before a review action.
//!
//! A [Modal] is rebuilt from scratch for every request, so nothing typed into
//! a dialog survives closing it. The confirm button is only enabled while the
//! form validates, and the dialog re-validates through a small endpoint as the
//! user types.

mod reject_reason;
mod transaction_id;
mod user_details;

use std::future::Future;

use maud::{Markup, html};

use crate::{
    Error,
    alert::ALERT_CONTAINER_ID,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, MODAL_CONTAINER_ID, loading_spinner},
};

pub use reject_reason::RejectReasonForm;
pub use transaction_id::TransactionIdForm;
pub use user_details::UserDetailsForm;

/// The input collected by a modal.
pub trait ModalForm: Default {
    /// What the form turns into once it is valid.
    type Output;

    /// Check the input without side effects.
    fn validate(&self) -> Result<Self::Output, Error>;

    /// The form's inputs, filled in with the current values.
    fn fields(&self) -> Markup;
}

/// A dialog's form plus whether it is showing and whether a submit is in flight.
#[derive(Debug, Clone, Default)]
pub struct Modal<F> {
    pub form: F,
    open: bool,
    submitting: bool,
}

/// The parts of a dialog that depend on where it is used.
#[derive(Debug)]
pub struct ModalFrame<'a> {
    pub title: &'a str,
    pub confirm_label: &'a str,
    /// The route the form is posted to.
    pub confirm_url: String,
    /// The route that re-renders the footer as the input changes.
    pub validate_url: String,
    /// Read-only details shown above the inputs.
    pub details: Markup,
}

/// The id of the footer swapped in by the validate route.
pub const MODAL_FOOTER_ID: &str = "modal-footer";
/// The id of the confirm button.
pub const MODAL_CONFIRM_ID: &str = "modal-confirm";

impl<F: ModalForm> Modal<F> {
    /// An open dialog holding `form`.
    pub fn open(form: F) -> Self {
        Self {
            form,
            open: true,
            submitting: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Hide the dialog and forget its input.
    pub fn close(&mut self) {
        self.form = F::default();
        self.open = false;
        self.submitting = false;
    }

    pub fn can_confirm(&self) -> bool {
        !self.submitting && self.form.validate().is_ok()
    }

    /// Validate the form and hand the result to `callback`.
    ///
    /// Invalid input is returned as an error without calling `callback`. On
    /// success the dialog closes, on failure it stays open with the input intact.
    pub async fn submit<C, Fut>(&mut self, callback: C) -> Result<(), Error>
    where
        C: FnOnce(F::Output) -> Fut,
        Fut: Future<Output = Result<(), Error>>,
    {
        let output = self.form.validate()?;

        self.submitting = true;
        let result = callback(output).await;
        self.submitting = false;

        if result.is_ok() {
            self.close();
        }

        result
    }

    /// The confirm and cancel buttons.
    ///
    /// `show_problem` adds the validation message, which the validate route
    /// does once the user has started typing.
    pub fn footer(&self, confirm_label: &str, show_problem: bool) -> Markup {
        let problem = match self.form.validate() {
            Err(error) if show_problem => Some(error.to_string()),
            _ => None,
        };

        html!(
            div id=(MODAL_FOOTER_ID) class="flex flex-col gap-2 pt-4"
            {
                @if let Some(problem) = problem {
                    p class="text-sm text-red-600 dark:text-red-400" data-problem="true" { (problem) }
                }

                div class="flex gap-4"
                {
                    button
                        type="button"
                        class=(BUTTON_SECONDARY_STYLE)
                        hx-get=(endpoints::CLOSE_MODAL)
                        hx-target={ "#" (MODAL_CONTAINER_ID) }
                        hx-swap="innerHTML"
                    {
                        "Cancel"
                    }

                    button
                        type="submit"
                        id=(MODAL_CONFIRM_ID)
                        class=(BUTTON_PRIMARY_STYLE)
                        disabled[!self.can_confirm()]
                    {
                        span class="htmx-indicator" { (loading_spinner()) }
                        (confirm_label)
                    }
                }
            }
        )
    }

    /// The whole dialog, or nothing if it is closed.
    pub fn view(&self, frame: &ModalFrame) -> Markup {
        if !self.open {
            return html!();
        }

        html!(
            div
                id="modal"
                class="fixed inset-0 z-50 flex items-center justify-center bg-gray-900/50"
                role="dialog"
                aria-modal="true"
                aria-labelledby="modal-title"
            {
                form
                    class="w-full max-w-md p-6 space-y-4 bg-white rounded-lg shadow dark:bg-gray-800"
                    hx-post=(frame.confirm_url)
                    hx-target={ "#" (MODAL_CONTAINER_ID) }
                    hx-swap="innerHTML"
                    hx-target-error={ "#" (ALERT_CONTAINER_ID) }
                    hx-disabled-elt={ "#" (MODAL_CONFIRM_ID) }
                {
                    h2 id="modal-title" class="text-xl font-bold text-gray-900 dark:text-white"
                    {
                        (frame.title)
                    }

                    (frame.details)

                    div
                        class="space-y-4"
                        hx-post=(frame.validate_url)
                        hx-trigger="input changed delay:200ms, change"
                        hx-target={ "#" (MODAL_FOOTER_ID) }
                        hx-swap="outerHTML"
                    {
                        (self.form.fields())
                    }

                    (self.footer(frame.confirm_label, false))
                }
            }
        )
    }
}

/// Empty the modal container.
pub async fn close_modal() -> Markup {
    html!()
}
