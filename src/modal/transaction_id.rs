use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    request::ProcessInput,
};

use super::ModalForm;

/// Collects the payment reference an admin assigns when processing a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionIdForm {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub notes: String,
}

impl ModalForm for TransactionIdForm {
    type Output = ProcessInput;

    fn validate(&self) -> Result<ProcessInput, Error> {
        Ok(ProcessInput::new(&self.transaction_id, &self.notes)?)
    }

    fn fields(&self) -> Markup {
        html!(
            div
            {
                label for="transaction_id" class=(FORM_LABEL_STYLE) { "Transaction ID" }
                input
                    type="text"
                    id="transaction_id"
                    name="transaction_id"
                    value=(self.transaction_id)
                    placeholder="e.g. UTR123456789"
                    autofocus
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "Notes (optional)" }
                textarea id="notes" name="notes" rows="3" class=(FORM_TEXT_INPUT_STYLE)
                {
                    (self.notes)
                }
            }
        )
    }
}
