//! API request and response types

use crate::db::Lead;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound message as posted by the messaging provider (form-encoded)
#[derive(Debug, Deserialize)]
pub struct WebhookForm {
    /// Message text; empty for media-only messages
    #[serde(rename = "Body", default)]
    pub body: String,
    /// Sender address, e.g. `whatsapp:+5511999999999`
    #[serde(rename = "From")]
    pub from: String,
}

/// Query for listing leads
#[derive(Debug, Default, Deserialize)]
pub struct LeadsQuery {
    pub status: Option<String>,
}

/// Response with a list of leads
#[derive(Debug, Serialize, Deserialize)]
pub struct LeadListResponse {
    pub leads: Vec<Lead>,
}

/// Database health
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub lead_count: i64,
    pub last_lead_at: Option<DateTime<Utc>>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
