//! Role resolution
//!
//! Turns the role strings on a claim into execute-api policy statements.
//! Two vocabularies are supported:
//!
//! - **Legacy roles**: bare compatibility names (`CVSFullAccess`) or
//!   `Name.access` pairs (`DVLATrailers.read`), expanded against the legacy
//!   resource table with a read/write split
//! - **Functional roles**: role strings (`TechRecord.View`) mapped directly to
//!   verb + path entries
//!
//! # Example
//!
//! ```rust
//! use gateway_authz::log_event::LogEvent;
//! use gateway_authz::roles::{legacy, RoleTables};
//!
//! let mut log = LogEvent::default();
//! let roles = vec!["DVLATrailers.read".to_string()];
//!
//! let statements = legacy::resolve(Some(roles.as_slice()), RoleTables::builtin(), &mut log);
//!
//! // GET and HEAD on /v1/trailers and /v1/trailers/*
//! assert_eq!(statements.len(), 4);
//! ```

pub mod functional;
pub mod legacy;
pub mod tables;


pub use legacy::Role;
pub use tables::{ApiAccess, RoleTables};
