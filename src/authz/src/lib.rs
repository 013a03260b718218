//! # Gateway Token Authorizer
//!
//! Custom token authorizer for an API Gateway. Verifies an Azure AD bearer
//! token and turns the roles it carries into an IAM policy document that
//! allows or denies `execute-api:Invoke` on the gateway's methods.
//!
//! ## Features
//!
//! - **Fail closed**: every failure yields the deny-all policy
//! - **Legacy roles** (`Name.read`, `Name.write`) and **functional roles**
//!   (`TechRecord.View`) resolved from role tables
//! - **RS256 verification** against the tenant's discovery keys, cached per
//!   tenant with a TTL
//! - **Structured audit record** per request via `tracing`
//!
//! ## Example
//!
//! ```no_run
//! use gateway_authz::{Authorizer, AuthorizerEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let authorizer = Authorizer::from_env()?;
//!
//!     let event = AuthorizerEvent::new(
//!         "Bearer eyJ...",
//!         "arn:aws:execute-api:eu-west-1:123456789012:abc123/prod/GET/vehicles",
//!     );
//!
//!     let result = authorizer.authorize(&event).await;
//!     if result.is_allowed() {
//!         println!("{} may invoke", result.principal_id);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod arn;
pub mod config;
pub mod engine;
pub mod error;
pub mod keys;
pub mod log_event;
pub mod policy;
pub mod roles;
pub mod server;
pub mod signature;
pub mod statement;
pub mod token;
pub mod types;

// Re-export commonly used types
pub use arn::{split_resource_path, ArnError, ResourceArn};
pub use config::{AuthorizerConfig, ServerConfig};
pub use engine::{Authorizer, AuthorizerEvent, Stage};
pub use error::{AuthzError, Result, SignatureError, TokenFormatError};
pub use keys::{DiscoveryKeyProvider, KeyProvider, SigningKey, StaticKeyProvider};
pub use log_event::LogEvent;
pub use policy::{AuthorizerResult, PolicyDocument};
pub use roles::{ApiAccess, Role, RoleTables};
pub use statement::{Effect, Statement, StatementSpec};
pub use types::{Access, Claim, HttpVerb};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
