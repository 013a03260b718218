//! Policy statement construction
//!
//! A [`StatementSpec`] is a plain value describing the statement; every
//! field is optional and falls back to a documented default in
//! [`StatementSpec::build`]. Field order never affects the built statement.
//!
//! ```
//! use gateway_authz::statement::{Effect, StatementSpec};
//! use gateway_authz::types::HttpVerb;
//!
//! let statement = StatementSpec {
//!     effect: Some(Effect::Allow),
//!     http_verb: Some(HttpVerb::Get),
//!     resource: Some("vehicles".to_string()),
//!     ..Default::default()
//! }
//! .build();
//!
//! assert_eq!(
//!     statement.resource.to_string(),
//!     "arn:aws:execute-api:eu-west-1:*:*/*/GET/vehicles"
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::arn::ResourceArn;
use crate::types::HttpVerb;

/// The only action an execute-api policy grants
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Region used when a statement does not name one
pub const DEFAULT_REGION: &str = "eu-west-1";

const WILDCARD: &str = "*";

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    #[default]
    Deny,
}

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Effect")]
    pub effect: Effect,

    #[serde(rename = "Action")]
    pub action: String,

    #[serde(rename = "Resource")]
    pub resource: ResourceArn,
}

impl Statement {
    /// Statement denying every method of every API
    pub fn deny_all() -> Self {
        StatementSpec::default().build()
    }

    /// Allow statement for one verb against a resource path
    pub fn allow(
        http_verb: HttpVerb,
        resource: Option<String>,
        child_resource: Option<String>,
    ) -> Self {
        StatementSpec {
            effect: Some(Effect::Allow),
            http_verb: Some(http_verb),
            resource,
            child_resource,
            ..Default::default()
        }
        .build()
    }
}

/// Description of a statement, unset fields take their defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementSpec {
    /// Defaults to [`Effect::Deny`]
    pub effect: Option<Effect>,
    /// Defaults to [`INVOKE_ACTION`]
    pub action: Option<String>,
    /// Defaults to [`DEFAULT_REGION`]
    pub region: Option<String>,
    pub account_id: Option<String>,
    pub api_id: Option<String>,
    pub stage: Option<String>,
    pub http_verb: Option<HttpVerb>,
    pub resource: Option<String>,
    /// Ignored unless `resource` is set
    pub child_resource: Option<String>,
}

impl StatementSpec {
    /// Builds the statement
    pub fn build(&self) -> Statement {
        let wildcard = || WILDCARD.to_string();

        let resource = self.resource.clone();
        let child_resource = resource.as_ref().and(self.child_resource.clone());

        Statement {
            effect: self.effect.unwrap_or_default(),
            action: self
                .action
                .clone()
                .unwrap_or_else(|| INVOKE_ACTION.to_string()),
            resource: ResourceArn {
                region: self
                    .region
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
                account_id: self.account_id.clone().unwrap_or_else(wildcard),
                api_id: self.api_id.clone().unwrap_or_else(wildcard),
                stage: self.stage.clone().unwrap_or_else(wildcard),
                http_verb: self.http_verb.unwrap_or(HttpVerb::Any),
                resource,
                child_resource,
            },
        }
    }
}
