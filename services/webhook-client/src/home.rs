//! Home view and raw log download

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tracing::warn;

use crate::{AppState, html, metrics};

/// Public path of the raw log file.
pub const LOG_DOWNLOAD_PATH: &str = "/messages/messages.txt";

/// Render the home page with the log inline. An unreadable log renders empty.
pub async fn render(state: &AppState) -> Response {
    let contents = match state.log.read().await {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %state.log.path().display(), error = %e, "failed to read message log");
            metrics::record_log_error("read");
            String::new()
        }
    };
    Html(html::home_page(&contents)).into_response()
}

/// GET /messages/messages.txt: the log as plain text.
pub async fn download_log(State(state): State<AppState>) -> Response {
    match state.log.read().await {
        Ok(contents) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            contents,
        )
            .into_response(),
        Err(e) => {
            warn!(path = %state.log.path().display(), error = %e, "failed to read message log");
            metrics::record_log_error("read");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
