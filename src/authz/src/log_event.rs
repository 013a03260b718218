//! Per-request diagnostic record
//!
//! One [`LogEvent`] is created for every authorization request and passed by
//! `&mut` through decoding, role resolution and policy assembly. It is
//! emitted once when the request finishes and is the only audit trail of the
//! decision.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::engine::Stage;
use crate::error::AuthzError;
use crate::types::Claim;

/// Error details attached to a denied request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogError {
    pub name: String,
    pub message: String,
}

/// Diagnostic record for one authorization request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub request_id: Uuid,

    /// Method ARN of the request being authorized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,

    pub time_of_request: DateTime<Utc>,

    /// 200 for an allow policy, 401 for deny-all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Display name from the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expiry: Option<DateTime<Utc>>,

    /// Role strings as they appeared on the token
    pub roles: Vec<String>,

    /// Last stage the request reached
    pub stage: Stage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<LogError>,
}

impl Default for LogEvent {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            request_url: None,
            time_of_request: Utc::now(),
            status_code: None,
            email: None,
            token_expiry: None,
            roles: Vec::new(),
            stage: Stage::Start,
            message: None,
            error: None,
        }
    }
}

impl LogEvent {
    /// Start a record for a request against a method ARN
    pub fn new(request_url: impl Into<String>) -> Self {
        Self {
            request_url: Some(request_url.into()),
            ..Default::default()
        }
    }

    /// Record the display name and expiry of a decoded claim
    pub fn record_claim(&mut self, claim: &Claim) {
        self.email = Some(claim.display_name().to_string());
        self.token_expiry = claim
            .exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single());
    }

    /// Mark the request as allowed
    pub fn succeed(&mut self) {
        self.status_code = Some(200);
        self.error = None;
    }

    /// Mark the request as denied by `err`
    pub fn fail(&mut self, err: &AuthzError) {
        self.status_code = Some(401);
        self.stage = Stage::Denied;
        self.error = Some(LogError {
            name: err.kind().to_string(),
            message: err.to_string(),
        });
    }

    /// Emit the record as a single structured event
    pub fn emit(&self) {
        let record = serde_json::to_string(self).unwrap_or_else(|e| {
            format!("{{\"requestId\":\"{}\",\"serializeError\":\"{}\"}}", self.request_id, e)
        });

        match &self.error {
            None => info!(request_id = %self.request_id, event = %record, "authorization allowed"),
            Some(err) => error!(
                request_id = %self.request_id,
                error_kind = %err.name,
                event = %record,
                "authorization denied"
            ),
        }
    }
}
