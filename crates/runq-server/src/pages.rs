//! Server-rendered HTML pages.
//!
//! ページは小さいのでテンプレートエンジンは使わず format! で組み立てる。
//! 埋め込む値は必ず `escape_html` を通す。

use axum::http::StatusCode;

use runq_core::domain::JobStatus;

const STYLESHEET: &str = "/static/style.css";

/// Seconds between automatic reloads of an unfinished result page.
const REFRESH_SECS: u32 = 2;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"{STYLESHEET}\">\n{head_extra}</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

pub fn home_page() -> String {
    layout(
        "runq",
        "",
        "<h1>runq</h1>\n\
         <form method=\"post\" action=\"/submit\">\n\
         <input type=\"text\" name=\"pkg\" placeholder=\"github.com/user/package\" required>\n\
         <button type=\"submit\">Submit</button>\n\
         </form>",
    )
}

/// `link` is the already-encoded path of the status endpoint.
pub fn result_page(status: &JobStatus, link: &str) -> String {
    let (state, refresh) = if status.finished {
        ("finished", String::new())
    } else {
        (
            "running",
            format!("<meta http-equiv=\"refresh\" content=\"{REFRESH_SECS}\">\n"),
        )
    };
    let body = format!(
        "<h1>{id}</h1>\n<p class=\"state\" data-finished=\"{finished}\">{state}</p>\n\
         <pre>{output}</pre>\n<p><a href=\"{link}\">json</a></p>",
        id = escape_html(status.identifier.as_str()),
        finished = status.finished,
        output = escape_html(&status.output_lossy()),
        link = escape_html(link),
    );
    layout(status.identifier.as_str(), &refresh, &body)
}

pub fn error_page(status: StatusCode, desc: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    let title = format!("{} - {}", status.as_u16(), reason);
    let body = format!(
        "<h1>{code}</h1>\n<h2>{reason}</h2>\n<p>{desc}</p>",
        code = status.as_u16(),
        reason = escape_html(reason),
        desc = escape_html(desc),
    );
    layout(&title, "", &body)
}
