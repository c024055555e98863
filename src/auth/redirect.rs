//! Building the log-in URL that brings the user back to where they were.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Only same-site paths are followed after logging in, and never the log-in page itself.
fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW
}

/// Reduce `raw_url` to a safe relative path and query, or `None` if it points off-site.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();
    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in URL for a request that was refused.
///
/// Page requests return to their own URL. HTMX requests under `/api` return
/// to the page that sent them, taken from the `HX-Current-URL` header.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

pub fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::debug!("No HX-Request header on {}.", request.uri());
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;

    // HX-Current-URL is absolute, so only its path and query are kept.
    let path_and_query = current_url.parse::<Uri>().ok()?.path_and_query()?.to_owned();
    let redirect_url = path_and_query.as_str();

    if is_safe_redirect_url(redirect_url) {
        Some(redirect_url.to_owned())
    } else {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
        None
    }
}
