//! Policy document assembly

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::log_event::LogEvent;
use crate::roles::{functional, legacy, RoleTables};
use crate::statement::Statement;
use crate::types::Claim;

/// IAM policy language version
pub const POLICY_VERSION: &str = "2012-10-17";

/// Principal reported on every denial
pub const UNAUTHORISED_PRINCIPAL: &str = "Unauthorised";

/// IAM policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,

    #[serde(rename = "Statement")]
    pub statements: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statements,
        }
    }
}

/// Authorizer response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResult {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

impl AuthorizerResult {
    /// Deny-all response returned on every failure
    pub fn unauthorised() -> Self {
        Self {
            principal_id: UNAUTHORISED_PRINCIPAL.to_string(),
            policy_document: PolicyDocument::new(vec![Statement::deny_all()]),
        }
    }

    /// Allow response for a principal
    pub fn allow(principal_id: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument::new(statements),
        }
    }

    /// Whether this response grants anything
    pub fn is_allowed(&self) -> bool {
        self.principal_id != UNAUTHORISED_PRINCIPAL
    }
}

/// Statements granted by a claim's roles
///
/// Legacy roles take priority; functional roles are only consulted when the
/// legacy resolver produced nothing.
pub fn resolve_statements(claim: &Claim, tables: &RoleTables, log: &mut LogEvent) -> Vec<Statement> {
    let statements = legacy::resolve(claim.roles.as_deref(), tables, log);
    if !statements.is_empty() {
        debug!("using legacy role statements");
        return statements;
    }

    functional::resolve(claim.roles(), tables)
}

/// Build the policy for a verified claim, `None` when no role grants anything
pub fn assemble(claim: &Claim, tables: &RoleTables, log: &mut LogEvent) -> Option<AuthorizerResult> {
    let statements = resolve_statements(claim, tables, log);
    if statements.is_empty() {
        return None;
    }

    Some(AuthorizerResult::allow(claim.sub.clone(), statements))
}
