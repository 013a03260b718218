//! Core authorization types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder recorded when a token carries no display name
pub const NO_DISPLAY_NAME: &str = "No data available in token";

/// Verified token payload
///
/// Only the fields the authorizer reads are modelled; any other claims on the
/// token are ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Subject identifier, becomes the policy principal
    #[serde(default)]
    pub sub: String,

    /// Role strings in token order (absent and empty are distinct)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    /// Expiry (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Not-before (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
}

impl Claim {
    /// Create a claim for a subject with the given roles
    pub fn new(sub: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            sub: sub.into(),
            roles: Some(roles),
            ..Default::default()
        }
    }

    /// Role strings on the claim, empty when absent
    pub fn roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or(&[])
    }

    /// Name used in diagnostics: preferred username, then unique name
    pub fn display_name(&self) -> &str {
        self.preferred_username
            .as_deref()
            .or(self.unique_name.as_deref())
            .unwrap_or(NO_DISPLAY_NAME)
    }
}

/// Access level carried by a legacy role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
    View,
}

impl FromStr for Access {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "view" => Ok(Self::View),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::View => "view",
        };
        f.write_str(s)
    }
}

/// HTTP method as it appears in an execute-api ARN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    /// `*`, every method
    Any,
    Head,
    Options,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Trace,
}

impl HttpVerb {
    /// All verbs, wildcard first
    pub const ALL: [HttpVerb; 9] = [
        Self::Any,
        Self::Head,
        Self::Options,
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Trace,
    ];

    /// Verbs granted by read access, in emission order
    pub const SAFE: [HttpVerb; 2] = [Self::Get, Self::Head];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "*",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Trace => "TRACE",
        }
    }
}

/// Error for a string that is not a recognised HTTP verb
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a recognized HTTP verb: '{0}'")]
pub struct UnknownHttpVerb(pub String);

impl FromStr for HttpVerb {
    type Err = UnknownHttpVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str() == upper)
            .ok_or_else(|| UnknownHttpVerb(s.to_string()))
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpVerb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpVerb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
