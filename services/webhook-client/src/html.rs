//! HTML fragments returned to browsers

use axum::response::{Html, IntoResponse, Response};

/// Escape text for inclusion in an HTML body.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Inline error heading, rendered with a 200 status.
pub fn error_message(message: &str) -> Response {
    Html(format!("<h3>{}</h3>", escape(message))).into_response()
}

/// The home page around the current log contents.
pub fn home_page(log_contents: &str) -> String {
    format!(
        r#"<html>
    <head>
        <title>Webhook Client App</title>
    </head>
    <body>
        <h2>Webhook Client App</h2>
        <br />
        <a href="{}">Download Log</a>
        <br />
        <h4>Webhook Output:</h4>
        <pre>
{}
        </pre>
    </body>
</html>
"#,
        crate::home::LOG_DOWNLOAD_PATH,
        escape(log_contents),
    )
}
