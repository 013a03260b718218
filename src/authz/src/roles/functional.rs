//! Functional role resolver
//!
//! Functional role strings are looked up verbatim; each matching table entry
//! yields one allow statement per verb. Statements are deduplicated by their
//! rendered resource ARN, keeping the first occurrence.

use std::collections::HashSet;
use tracing::debug;

use super::tables::{ApiAccess, RoleTables};
use crate::arn::split_resource_path;
use crate::statement::Statement;

fn access_statements(access: &ApiAccess) -> impl Iterator<Item = Statement> + '_ {
    let (resource, child_resource) = split_resource_path(&access.path);
    access
        .verbs
        .iter()
        .map(move |verb| Statement::allow(*verb, resource.clone(), child_resource.clone()))
}

/// Drop statements whose resource ARN was already seen
pub fn dedup_by_resource(statements: Vec<Statement>) -> Vec<Statement> {
    let mut seen = HashSet::new();
    statements
        .into_iter()
        .filter(|statement| seen.insert(statement.resource.to_string()))
        .collect()
}

/// Resolve a claim's role strings to functional statements
pub fn resolve(roles: &[String], tables: &RoleTables) -> Vec<Statement> {
    let statements: Vec<Statement> = roles
        .iter()
        .filter_map(|role| tables.functional_access(role))
        .flatten()
        .flat_map(access_statements)
        .collect();

    let generated = statements.len();
    let statements = dedup_by_resource(statements);

    debug!(
        generated,
        statements = statements.len(),
        "functional roles resolved"
    );

    statements
}
