//! Authorizer invocation event and request stages

use serde::{Deserialize, Serialize};

fn token_event_type() -> String {
    "TOKEN".to_string()
}

/// Token authorizer invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerEvent {
    /// Always `TOKEN` for token authorizers
    #[serde(rename = "type", default = "token_event_type")]
    pub event_type: String,

    /// Raw `Authorization` header value
    #[serde(default)]
    pub authorization_token: Option<String>,

    /// ARN of the method being invoked
    #[serde(default)]
    pub method_arn: String,
}

impl AuthorizerEvent {
    pub fn new(authorization_token: impl Into<String>, method_arn: impl Into<String>) -> Self {
        Self {
            event_type: token_event_type(),
            authorization_token: Some(authorization_token.into()),
            method_arn: method_arn.into(),
        }
    }

    /// Event with no authorization header
    pub fn without_token(method_arn: impl Into<String>) -> Self {
        Self {
            event_type: token_event_type(),
            authorization_token: None,
            method_arn: method_arn.into(),
        }
    }
}

/// Progress of one authorization request
///
/// `Start → TokenFramingChecked → ClaimObtained → RolesResolved →
/// PolicyAssembled → Done`; any failure moves to `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Start,
    TokenFramingChecked,
    ClaimObtained,
    RolesResolved,
    PolicyAssembled,
    Done,
    Denied,
}
