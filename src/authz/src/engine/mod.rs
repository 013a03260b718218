//! Authorization orchestrator
//!
//! Drives one request from the raw `Authorization` header to a policy:
//!
//! ```text
//! header → framing → decode → key lookup → verify → roles → policy
//!                                                      ↓
//!                      any error ──────────────→ deny-all policy
//! ```
//!
//! [`Authorizer::authorize`] never returns an error. Failures are recorded in
//! the request's [`LogEvent`] and answered with
//! [`AuthorizerResult::unauthorised`].

pub mod event;

pub use event::{AuthorizerEvent, Stage};

use std::sync::Arc;
use tracing::{debug, warn};

use crate::arn::ResourceArn;
use crate::config::AuthorizerConfig;
use crate::error::{AuthzError, Result, SignatureError};
use crate::keys::{DiscoveryKeyProvider, KeyProvider};
use crate::log_event::LogEvent;
use crate::policy::{self, AuthorizerResult};
use crate::roles::RoleTables;
use crate::{signature, token};

/// API Gateway token authorizer
///
/// Holds only read-only state and is shared across requests behind an `Arc`.
pub struct Authorizer {
    config: AuthorizerConfig,
    tables: Arc<RoleTables>,
    keys: Arc<dyn KeyProvider>,
}

impl Authorizer {
    /// Create an authorizer using the built-in role tables
    pub fn new(config: AuthorizerConfig, keys: Arc<dyn KeyProvider>) -> Self {
        Self {
            config,
            tables: Arc::new(RoleTables::builtin().clone()),
            keys,
        }
    }

    /// Replace the role tables
    pub fn with_tables(mut self, tables: RoleTables) -> Self {
        self.tables = Arc::new(tables);
        self
    }

    /// Build from the process environment
    ///
    /// Fails only when a role table override is configured and cannot be
    /// loaded. Missing tenant or client ids are reported per request.
    pub fn from_env() -> Result<Self> {
        let config = AuthorizerConfig::from_env();
        let keys = Arc::new(DiscoveryKeyProvider::new(
            crate::keys::DEFAULT_AUTHORITY,
            config.key_cache_ttl,
        ));

        let tables = match &config.role_config {
            Some(path) => RoleTables::from_file(path)?,
            None => RoleTables::builtin().clone(),
        };

        Ok(Self::new(config, keys).with_tables(tables))
    }

    pub fn config(&self) -> &AuthorizerConfig {
        &self.config
    }

    /// Authorize one request; always yields a policy
    pub async fn authorize(&self, event: &AuthorizerEvent) -> AuthorizerResult {
        self.authorize_with_log(event).await.0
    }

    /// Authorize one request and return its diagnostic record as well
    pub async fn authorize_with_log(&self, event: &AuthorizerEvent) -> (AuthorizerResult, LogEvent) {
        let mut log = LogEvent::new(event.method_arn.clone());

        let result = match self.evaluate(event, &mut log).await {
            Ok(result) => {
                log.stage = Stage::Done;
                log.succeed();
                result
            }
            Err(err) => {
                log.fail(&err);
                AuthorizerResult::unauthorised()
            }
        };

        log.emit();
        (result, log)
    }

    async fn evaluate(&self, event: &AuthorizerEvent, log: &mut LogEvent) -> Result<AuthorizerResult> {
        let identity = self.config.require()?;

        match event.method_arn.parse::<ResourceArn>() {
            Ok(arn) => debug!(
                api_id = %arn.api_id,
                stage = %arn.stage,
                verb = %arn.http_verb,
                "authorizing method"
            ),
            Err(err) => warn!(method_arn = %event.method_arn, error = %err, "unparseable method ARN"),
        }

        let encoded = token::check_format(event.authorization_token.as_deref())?;
        log.stage = Stage::TokenFramingChecked;

        let decoded = token::decode_unverified(encoded)?;
        log.record_claim(&decoded.claim);

        let key_id = decoded.key_id().ok_or(SignatureError::MissingKeyId)?;
        let key = self.keys.signing_key(identity.tenant_id, key_id).await?;
        let claim = signature::verify(encoded, &key, identity)?;
        log.stage = Stage::ClaimObtained;

        let statements = policy::resolve_statements(&claim, &self.tables, log);
        if statements.is_empty() {
            let err = if claim.roles().is_empty() {
                AuthzError::NoRoles
            } else {
                AuthzError::InvalidRoles
            };
            log.message = Some(err.to_string());
            return Err(err);
        }
        log.stage = Stage::RolesResolved;

        let result = AuthorizerResult::allow(claim.sub, statements);
        log.stage = Stage::PolicyAssembled;

        debug!(
            principal = %result.principal_id,
            statements = result.policy_document.statements.len(),
            "policy assembled"
        );

        Ok(result)
    }
}
