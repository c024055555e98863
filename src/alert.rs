//! Alert fragments for reporting errors in response to HTMX requests.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// An error alert that is swapped into the `#alert-container` element out-of-band.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert<'a> {
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self { message, details }
    }

    pub fn into_html(self) -> Markup {
        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class="p-4 mb-4 text-sm border rounded-lg text-red-800 bg-red-50 \
                        border-red-300 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
                {
                    div class="flex items-center justify-between"
                    {
                        span class="font-medium" { (self.message) }

                        button
                            type="button"
                            aria-label="Close"
                            onclick="this.closest('#alert-container').classList.add('hidden')"
                        {
                            "×"
                        }
                    }

                    @if !self.details.is_empty() {
                        p class="mt-1" { (self.details) }
                    }
                }
            }
        )
    }

    /// Render the alert as a response with `status_code`.
    pub fn into_response_with_status(self, status_code: StatusCode) -> Response {
        (status_code, Html(self.into_html().into_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn alert_contains_message_and_details() {
        let html = Html::parse_fragment(
            &Alert::error("Something broke", "Try again")
                .into_html()
                .into_string(),
        );
        let alert = html
            .select(&Selector::parse("[role='alert']").unwrap())
            .next()
            .expect("could not find alert");
        let text = alert.text().collect::<String>();

        assert!(text.contains("Something broke"));
        assert!(text.contains("Try again"));
    }

    #[test]
    fn alert_omits_empty_details() {
        let html = Html::parse_fragment(&Alert::error("Oops", "").into_html().into_string());

        assert_eq!(html.select(&Selector::parse("p").unwrap()).count(), 0);
    }

    #[test]
    fn response_uses_given_status() {
        let response = Alert::error("Bad", "").into_response_with_status(StatusCode::BAD_REQUEST);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
