//! HTTP handlers.
//!
//! - HTML: `/`, `POST /submit`, `/result/{*pkg}`, fallback
//! - JSON: `/api/status/{*pkg}`, `/api/queue`

use axum::Json;
use axum::extract::{Form, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use runq_core::QueueStats;

use crate::error::{AppError, AppResult, PageError};
use crate::pages;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub pkg: String,
}

/// Body of `GET /api/status/{*pkg}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusBody {
    pub finished: bool,
    pub result: String,
    /// Encoded path of the HTML result page.
    pub link: String,
}

/// Percent-encode every segment of an unencoded absolute path.
///
/// `.` and `..` segments are dropped by `url`; `JobKey` never contains them.
pub fn encode_path(raw: &str) -> AppResult<String> {
    let mut url = Url::parse("http://localhost/").map_err(|e| AppError::Internal(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| AppError::Internal("base URL cannot carry a path".to_string()))?
        .extend(raw.trim_start_matches('/').split('/'));
    Ok(url.path().to_string())
}

pub async fn home() -> Html<String> {
    Html(pages::home_page())
}

pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> Result<Response, PageError> {
    let receipt = state.service.submit(&form.pkg).await?;
    let location = encode_path(&receipt.result_path())?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

pub async fn result_page(
    State(state): State<AppState>,
    Path(pkg): Path<String>,
) -> Result<Html<String>, PageError> {
    let status = state.service.status(&pkg).await?;
    let link = encode_path(&format!("/api/status/{}", status.identifier))?;
    Ok(Html(pages::result_page(&status, &link)))
}

pub async fn status(
    State(state): State<AppState>,
    Path(pkg): Path<String>,
) -> AppResult<Json<StatusBody>> {
    let status = state.service.status(&pkg).await?;
    let link = encode_path(&format!("/result/{}", status.identifier))?;
    Ok(Json(StatusBody {
        finished: status.finished,
        result: status.output_lossy().into_owned(),
        link,
    }))
}

pub async fn queue_stats(State(state): State<AppState>) -> Json<QueueStats> {
    Json(state.service.queue_stats().await)
}

pub async fn not_found() -> PageError {
    PageError(AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_path_keeps_separators_and_escapes_the_rest() {
        assert_eq!(encode_path("/result/alpha").unwrap(), "/result/alpha");
        assert_eq!(
            encode_path("/result/github.com/acme/my widget").unwrap(),
            "/result/github.com/acme/my%20widget"
        );
        assert_eq!(encode_path("/result/a?b#c").unwrap(), "/result/a%3Fb%23c");
    }

    #[test]
    fn status_body_uses_capitalised_keys() {
        let body = StatusBody {
            finished: true,
            result: "ok".to_string(),
            link: "/result/alpha".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["Finished"], true);
        assert_eq!(json["Result"], "ok");
        assert_eq!(json["Link"], "/result/alpha");
    }
}
