//! HTTP handler functions for the map API.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use munifor_issue_models::Tag;
use munifor_map_models::MapDataset;
use munifor_map_models::api::{ApiHealth, ApiMessage, ReportDecision};
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use crate::validate::ValidatedJson;

/// Body of the review endpoints.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewBody {
    #[validate(length(min = 1, message = "report id is required"))]
    id: String,
}

fn message(status: actix_web::http::StatusCode, text: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ApiMessage {
        message: text.into(),
    })
}

/// Checks the bearer token when one is configured.
fn authorize(req: &HttpRequest, state: &AppState) -> Result<(), HttpResponse> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(());
    };
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    if presented == Some(expected) {
        Ok(())
    } else {
        log::warn!("Rejected unauthenticated request to {}", req.path());
        Err(message(
            actix_web::http::StatusCode::UNAUTHORIZED,
            "Missing or invalid token",
        ))
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/map/data`
///
/// Full dataset for administrators, workers and citizens.
pub async fn map_data(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(response) = authorize(&req, &state) {
        return response;
    }
    let data = state.data.read().await;
    HttpResponse::Ok().json(&data.dataset)
}

/// `GET /api/map/operator-data`
///
/// Operator subset, or the full dataset when the fixture has none.
pub async fn operator_data(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(response) = authorize(&req, &state) {
        return response;
    }
    let data = state.data.read().await;
    HttpResponse::Ok().json(data.operator_view())
}

/// `PUT /api/report/accept`
pub async fn accept_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: ValidatedJson<ReviewBody>,
) -> HttpResponse {
    review(&req, &state, &body.into_inner().id, ReportDecision::Accept).await
}

/// `PUT /api/report/reject`
pub async fn reject_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: ValidatedJson<ReviewBody>,
) -> HttpResponse {
    review(&req, &state, &body.into_inner().id, ReportDecision::Reject).await
}

/// Sets the status of report `id` in `dataset`; `false` if it is absent.
fn set_report_status(dataset: &mut MapDataset, id: &str, decision: ReportDecision) -> bool {
    let mut found = false;
    for report in dataset.reports.iter_mut().filter(|r| r.id == id) {
        report.status = Tag::Known(decision.resulting_status());
        found = true;
    }
    found
}

async fn review(
    req: &HttpRequest,
    state: &AppState,
    id: &str,
    decision: ReportDecision,
) -> HttpResponse {
    if let Err(response) = authorize(req, state) {
        return response;
    }

    let mut data = state.data.write().await;
    let mut found = set_report_status(&mut data.dataset, id, decision);
    if let Some(operator) = data.operator.as_mut() {
        found |= set_report_status(operator, id, decision);
    }

    if found {
        log::info!("Report {id} marked {}", decision.resulting_status());
        message(
            actix_web::http::StatusCode::OK,
            format!("Report {id} marked {}", decision.resulting_status()),
        )
    } else {
        message(
            actix_web::http::StatusCode::NOT_FOUND,
            format!("Report {id} not found"),
        )
    }
}
