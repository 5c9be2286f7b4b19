//! Alert system for displaying success and error messages to users.
//!
//! Alerts are swapped out-of-band into the alert container defined in
//! [base](crate::html::base), so they can be returned from any HTMX request
//! regardless of its target.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// An alert message to show the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with an explanation or fix underneath.
    Error { message: String, details: String },
}

impl Alert {
    /// Render the alert as the replacement for the page's alert container.
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::SuccessSimple { message } => (false, message, String::new()),
            Alert::Error { message, details } => (true, message, details),
        };

        let container_style = if is_error {
            "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
            dark:bg-gray-800 dark:text-red-400 shadow"
        } else {
            "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
            dark:bg-gray-800 dark:text-green-400 shadow"
        };

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    div class="flex items-start justify-between gap-4"
                    {
                        p class="font-medium" { (message) }

                        button
                            type="button"
                            aria-label="Close"
                            onclick="this.closest('#alert-container').classList.add('hidden')"
                        {
                            "×"
                        }
                    }

                    @if !details.is_empty() {
                        div class="mt-1" { (details) }
                    }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
