//! Static role tables
//!
//! Both resolvers read process-wide, read-only tables. The built-in tables are
//! compiled in; a JSON file with the same shape can replace them at startup.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{AuthzError, Result};
use crate::types::HttpVerb;

/// Verbs granted on one API path by a functional role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAccess {
    pub verbs: Vec<HttpVerb>,
    pub path: String,
}

impl ApiAccess {
    pub fn new(verbs: impl IntoIterator<Item = HttpVerb>, path: impl Into<String>) -> Self {
        Self {
            verbs: verbs.into_iter().collect(),
            path: path.into(),
        }
    }
}

/// Legacy name → resource paths, and functional role → API access entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTables {
    #[serde(default)]
    pub legacy: HashMap<String, Vec<String>>,

    #[serde(default)]
    pub functional: HashMap<String, Vec<ApiAccess>>,
}

static BUILTIN: Lazy<RoleTables> = Lazy::new(|| {
    use HttpVerb::{Get, Options, Post, Put};

    let all = ["/*"];

    RoleTables::default()
        .with_legacy("CVSFullAccess", all)
        .with_legacy("CVSPsvTester", all)
        .with_legacy("CVSHgvTester", all)
        .with_legacy("CVSAdrTester", all)
        .with_legacy("CVSTirTester", all)
        .with_legacy("VTMAdmin", all)
        .with_legacy("Certs", ["/v1/document-retrieval", "/v1/document-retrieval/*"])
        .with_legacy("VehicleData", ["/v1/enquiry", "/v1/enquiry/*"])
        .with_legacy("DVLATrailers", ["/v1/trailers", "/v1/trailers/*"])
        .with_functional(
            "TechRecord.Amend",
            [
                ApiAccess::new([Post, Put, Options], "vehicles/*"),
                ApiAccess::new([Get, Options], "reference/*"),
            ],
        )
        .with_functional(
            "TechRecord.View",
            [ApiAccess::new([Get, Options], "vehicles/*")],
        )
        .with_functional(
            "TechRecord.Archive",
            [ApiAccess::new([Put, Options], "/vehicles/archive/*")],
        )
        .with_functional(
            "TestResult.CreateContingency",
            [
                ApiAccess::new([Post, Options], "test-result/*"),
                ApiAccess::new([Get, Options], "test-types/*"),
                ApiAccess::new([Get, Options], "test-stations/*"),
                ApiAccess::new([Get, Options], "defects/*"),
                ApiAccess::new([Get, Options], "reference/*"),
            ],
        )
        .with_functional(
            "TestResult.Amend",
            [
                ApiAccess::new([Put, Options], "test-result/*"),
                ApiAccess::new([Get, Options], "test-types/*"),
                ApiAccess::new([Get, Options], "test-stations/*"),
                ApiAccess::new([Get, Options], "defects/*"),
                ApiAccess::new([Get, Options], "reference/*"),
            ],
        )
        .with_functional(
            "TestResult.View",
            [
                ApiAccess::new([Get, Options], "test-result/*"),
                ApiAccess::new([Get, Options], "test-types/*"),
                ApiAccess::new([Get, Options], "v1/document-retrieval/*"),
            ],
        )
});

impl RoleTables {
    /// The compiled-in tables
    pub fn builtin() -> &'static RoleTables {
        &BUILTIN
    }

    /// Parse tables from JSON
    ///
    /// Functional roles must map to at least one entry, and every entry must
    /// carry at least one verb.
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: RoleTables =
            serde_json::from_str(json).map_err(|e| AuthzError::RoleConfig(e.to_string()))?;
        tables.validate()?;
        Ok(tables)
    }

    /// Load tables from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add a legacy name with its resource paths
    pub fn with_legacy<I, S>(mut self, name: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legacy
            .insert(name.into(), paths.into_iter().map(Into::into).collect());
        self
    }

    /// Add a functional role with its API access entries
    pub fn with_functional(
        mut self,
        role: impl Into<String>,
        access: impl IntoIterator<Item = ApiAccess>,
    ) -> Self {
        self.functional
            .insert(role.into(), access.into_iter().collect());
        self
    }

    /// Resource paths for a legacy name, empty when unknown
    pub fn legacy_paths(&self, name: &str) -> &[String] {
        self.legacy.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// API access entries for a functional role
    pub fn functional_access(&self, role: &str) -> Option<&[ApiAccess]> {
        self.functional.get(role).map(Vec::as_slice)
    }

    fn validate(&self) -> Result<()> {
        for (role, entries) in &self.functional {
            if entries.is_empty() {
                return Err(AuthzError::RoleConfig(format!(
                    "functional role '{}' has no access entries",
                    role
                )));
            }
            if entries.iter().any(|entry| entry.verbs.is_empty()) {
                return Err(AuthzError::RoleConfig(format!(
                    "functional role '{}' has an entry without verbs",
                    role
                )));
            }
        }
        Ok(())
    }
}
