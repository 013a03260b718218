//! Legacy role resolver
//!
//! Legacy roles are either one of a fixed set of bare compatibility names, or
//! a `Name.access` pair. Each resolved role is expanded against the legacy
//! resource table: read access yields one statement per safe verb, write
//! access a single wildcard-verb statement.

use serde::Serialize;
use tracing::debug;

use super::tables::RoleTables;
use crate::arn::split_resource_path;
use crate::log_event::LogEvent;
use crate::statement::Statement;
use crate::types::{Access, HttpVerb};

/// Bare role names accepted for compatibility
///
/// These always resolve to write access. Per-name access levels are not
/// supported yet.
pub const BACKWARDS_COMPATIBLE_ROLE_NAMES: [&str; 9] = [
    "CVSFullAccess",
    "CVSPsvTester",
    "CVSHgvTester",
    "CVSAdrTester",
    "CVSTirTester",
    "VTMAdmin",
    "Certs",
    "VehicleData",
    "DVLATrailers",
];

/// A parsed legacy role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub name: String,
    pub access: Access,
}

impl Role {
    pub fn new(name: impl Into<String>, access: Access) -> Self {
        Self {
            name: name.into(),
            access,
        }
    }

    /// Parse one role string, `None` when it is not a legacy role
    pub fn parse(role: &str) -> Option<Self> {
        if BACKWARDS_COMPATIBLE_ROLE_NAMES.iter().any(|name| *name == role) {
            return Some(Self::new(role, Access::Write));
        }

        let mut parts = role.split('.');
        let (name, access) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(access), None) => (name, access),
            _ => return None,
        };

        if name.is_empty() || access.is_empty() {
            return None;
        }

        let access = access.parse().ok()?;
        Some(Self::new(name, access))
    }
}

/// Parse the legacy roles on a claim, silently skipping malformed strings
pub fn parse_roles(roles: Option<&[String]>, log: &mut LogEvent) -> Vec<Role> {
    let Some(roles) = roles else {
        log.roles = Vec::new();
        return Vec::new();
    };

    log.roles = roles.to_vec();

    roles.iter().filter_map(|role| Role::parse(role)).collect()
}

/// Expand parsed roles into statements, in role order
pub fn role_statements(roles: &[Role], tables: &RoleTables) -> Vec<Statement> {
    let mut statements = Vec::new();

    for role in roles {
        for path in tables.legacy_paths(&role.name) {
            let (resource, child_resource) = split_resource_path(path);

            match role.access {
                Access::Read => {
                    statements.extend(HttpVerb::SAFE.into_iter().map(|verb| {
                        Statement::allow(verb, resource.clone(), child_resource.clone())
                    }));
                }
                Access::Write => {
                    statements.push(Statement::allow(
                        HttpVerb::Any,
                        resource.clone(),
                        child_resource.clone(),
                    ));
                }
                Access::View => {}
            }
        }
    }

    statements
}

/// Resolve a claim's role strings to legacy statements
pub fn resolve(roles: Option<&[String]>, tables: &RoleTables, log: &mut LogEvent) -> Vec<Statement> {
    let parsed = parse_roles(roles, log);
    let statements = role_statements(&parsed, tables);

    debug!(
        roles = parsed.len(),
        statements = statements.len(),
        "legacy roles resolved"
    );

    statements
}
