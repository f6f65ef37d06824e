use maud::{Markup, html};
use serde::Deserialize;

use crate::{Error, html::FORM_LABEL_STYLE, user::PortalAccessDecision};

use super::ModalForm;

/// The admin's decision on a newly registered user's portal access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserDetailsForm {
    #[serde(default)]
    pub decision: String,
}

impl ModalForm for UserDetailsForm {
    type Output = PortalAccessDecision;

    fn validate(&self) -> Result<PortalAccessDecision, Error> {
        PortalAccessDecision::from_value(&self.decision).ok_or_else(|| {
            Error::Validation("Choose whether to approve or deny portal access.".to_owned())
        })
    }

    fn fields(&self) -> Markup {
        let choices = [
            (PortalAccessDecision::Approve, "Approve portal access"),
            (PortalAccessDecision::Deny, "Deny portal access"),
        ];

        html!(
            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Decision" }

                @for (decision, label) in choices {
                    @let id = format!("decision-{}", decision.as_query_value());

                    div class="flex items-center gap-2 mb-2"
                    {
                        input
                            type="radio"
                            id=(id)
                            name="decision"
                            value=(decision.as_query_value())
                            checked[self.decision == decision.as_query_value()];
                        label for=(id) class="text-sm text-gray-900 dark:text-white" { (label) }
                    }
                }
            }
        )
    }
}
