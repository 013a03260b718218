//! execute-api resource ARN codec
//!
//! An API Gateway method ARN has a fixed six-part colon-delimited prefix
//! followed by a slash-delimited path:
//!
//! `arn:aws:execute-api:{region}:{accountId}:{apiId}/{stage}/{verb}[/{resource}[/{child}]]`
//!
//! # Examples
//!
//! ```
//! use gateway_authz::arn::ResourceArn;
//!
//! let arn: ResourceArn = "arn:aws:execute-api:eu-west-1:1234:cafe-babe/develop/GET/vehicles/v1/*"
//!     .parse()
//!     .unwrap();
//! assert_eq!(arn.resource.as_deref(), Some("vehicles"));
//! assert_eq!(arn.child_resource.as_deref(), Some("v1/*"));
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::types::HttpVerb;

/// Literal values of the first three ARN parts
const LITERAL_SEGMENTS: [&str; 3] = ["arn", "aws", "execute-api"];

/// Errors raised while decoding an ARN
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArnError {
    /// Empty input
    #[error("ARN is null or blank")]
    Empty,

    /// Not six colon-delimited parts
    #[error("ARN does not consist of six colon-delimited parts (found {0})")]
    WrongPartCount(usize),

    /// One of the literal parts does not match
    #[error("ARN part {index} should be exact string '{expected}'")]
    BadLiteralSegment { index: usize, expected: &'static str },

    /// Fewer than three path segments
    #[error("ARN path should consist of at least three parts: /{{apiId}}/{{stage}}/{{httpVerb}}/")]
    PathTooShort,

    /// Verb segment is not an HTTP method
    #[error("ARN {0}")]
    UnknownHttpVerb(#[from] crate::types::UnknownHttpVerb),
}

/// Result type for ARN operations
pub type ArnResult<T> = Result<T, ArnError>;

/// Structured execute-api resource locator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceArn {
    pub region: String,
    pub account_id: String,
    pub api_id: String,
    pub stage: String,
    pub http_verb: HttpVerb,
    /// First path segment after the verb
    pub resource: Option<String>,
    /// Remaining path after `resource`, only meaningful when `resource` is set
    pub child_resource: Option<String>,
}

impl ResourceArn {
    /// Decodes an ARN string
    pub fn parse(s: &str) -> ArnResult<Self> {
        if s.is_empty() {
            return Err(ArnError::Empty);
        }

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(ArnError::WrongPartCount(parts.len()));
        }

        for (index, expected) in LITERAL_SEGMENTS.into_iter().enumerate() {
            if parts[index] != expected {
                return Err(ArnError::BadLiteralSegment { index, expected });
            }
        }

        let path: Vec<&str> = parts[5].split('/').collect();
        if path.len() < 3 {
            return Err(ArnError::PathTooShort);
        }

        let (resource, child_resource) = split_segments(&path[3..]);

        Ok(Self {
            region: parts[3].to_string(),
            account_id: parts[4].to_string(),
            api_id: path[0].to_string(),
            stage: path[1].to_string(),
            http_verb: path[2].parse()?,
            resource,
            child_resource,
        })
    }
}

/// Splits a resource path into `(resource, child_resource)`
///
/// One leading `/` is dropped, then the first segment becomes the resource
/// and the rest (rejoined with `/`) the child resource.
pub fn split_resource_path(path: &str) -> (Option<String>, Option<String>) {
    let path = path.strip_prefix('/').unwrap_or(path);
    let segments: Vec<&str> = path.split('/').collect();
    split_segments(&segments)
}

fn split_segments(segments: &[&str]) -> (Option<String>, Option<String>) {
    match segments {
        [] => (None, None),
        [resource] => (Some(resource.to_string()), None),
        [resource, rest @ ..] => (Some(resource.to_string()), Some(rest.join("/"))),
    }
}

impl FromStr for ResourceArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}/{}/{}",
            LITERAL_SEGMENTS[0],
            LITERAL_SEGMENTS[1],
            LITERAL_SEGMENTS[2],
            self.region,
            self.account_id,
            self.api_id,
            self.stage,
            self.http_verb
        )?;

        if let Some(resource) = &self.resource {
            write!(f, "/{}", resource)?;
            if let Some(child) = &self.child_resource {
                write!(f, "/{}", child)?;
            }
        }

        Ok(())
    }
}

impl Serialize for ResourceArn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceArn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
