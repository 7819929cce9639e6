//! HTTP request handlers

use super::twiml;
use super::types::{ErrorResponse, LeadListResponse, LeadsQuery, StatusResponse, WebhookForm};
use super::AppState;
use crate::dashboard::{leads_to_csv, DashboardFilter, DashboardReport};
use crate::db::LeadStatus;
use crate::state_machine::replies::APOLOGY;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Inbound messages
        .route("/whatsapp_webhook", post(whatsapp_webhook))
        // Reporting
        .route("/api/leads", get(list_leads))
        .route("/api/leads/export.csv", get(export_leads_csv))
        .route("/api/dashboard", get(dashboard))
        // Health
        .route("/api/status", get(db_status))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Webhook
// ============================================================

/// Always answers 200 with `TwiML` so the provider does not retry
async fn whatsapp_webhook(
    State(state): State<AppState>,
    Form(form): Form<WebhookForm>,
) -> Response {
    let reply = match state.runtime.handle_message(&form.from, &form.body).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(contact_id = %form.from, error = %e, "Failed to handle message");
            APOLOGY.to_string()
        }
    };

    (
        [(header::CONTENT_TYPE, "application/xml")],
        twiml::message(&reply),
    )
        .into_response()
}

// ============================================================
// Reporting
// ============================================================

async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<LeadsQuery>,
) -> Result<Json<LeadListResponse>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<LeadStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let leads = state
        .db
        .list_leads(status)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(LeadListResponse { leads }))
}

async fn export_leads_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    let leads = state
        .db
        .list_leads(None)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"leads.csv\""),
        ],
        leads_to_csv(&leads),
    )
        .into_response())
}

async fn dashboard(
    State(state): State<AppState>,
    Query(filter): Query<DashboardFilter>,
) -> Result<Json<DashboardReport>, AppError> {
    let leads = state
        .db
        .list_leads(None)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(DashboardReport::build(&leads, &filter, Utc::now())))
}

// ============================================================
// Health
// ============================================================

async fn db_status(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let lead_count = state
        .db
        .lead_count()
        .map_err(|e| AppError::Internal(format!("Database unavailable: {e}")))?;
    let last_lead_at = state
        .db
        .last_created_at()
        .map_err(|e| AppError::Internal(format!("Database unavailable: {e}")))?;

    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        lead_count,
        last_lead_at,
    }))
}

async fn get_version() -> &'static str {
    concat!("repair-intake ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
