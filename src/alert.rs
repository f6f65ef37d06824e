//! Alert system for displaying success and error messages to users.
//!
//! Every htmx mutation reports its outcome through these toasts. Error
//! responses are swapped into the page's alert container by the
//! response-targets extension, success alerts are sent out-of-band.

use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    Error { message: String, details: String },
}

/// The id of the element that alerts are swapped into.
pub const ALERT_CONTAINER_ID: &str = "alert-container";

impl Alert {
    /// Create a new success alert
    pub fn success(message: &str, details: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a new error alert
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (
                "flex items-start gap-3 p-4 text-sm rounded-lg shadow \
                text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "flex items-start gap-3 p-4 text-sm rounded-lg shadow \
                text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400",
                message,
                details,
            ),
        };

        html!(
            div class=(container_style) role="alert"
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="font-bold"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        )
    }

    /// Wrap the alert so htmx swaps it into the alert container regardless of
    /// the request's target.
    pub fn into_oob_html(self) -> Markup {
        html!(
            div id=(ALERT_CONTAINER_ID) hx-swap-oob="innerHTML"
            {
                (self.into_html())
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::{ALERT_CONTAINER_ID, Alert};

    #[test]
    fn error_alert_shows_message_and_details() {
        let markup = Alert::error("Could not save", "Try again").into_html();

        let html = Html::parse_fragment(&markup.into_string());
        let alert = html
            .select(&Selector::parse("[role=alert]").unwrap())
            .next()
            .expect("alert missing");
        let text = alert.text().collect::<String>();
        assert!(text.contains("Could not save"));
        assert!(text.contains("Try again"));
    }

    #[test]
    fn oob_alert_targets_container() {
        let markup = Alert::success("Saved", "").into_oob_html();

        let html = Html::parse_fragment(&markup.into_string());
        let container = html
            .select(&Selector::parse(&format!("#{ALERT_CONTAINER_ID}")).unwrap())
            .next()
            .expect("container missing");
        assert_eq!(container.attr("hx-swap-oob"), Some("innerHTML"));
    }
}
