//! Error types for the authorizer

use thiserror::Error;

/// Bearer header framing errors, raised before any decode attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenFormatError {
    #[error("[JWT-ERROR-01] no caller-supplied-token (no authorization header on original request)")]
    MissingToken,

    #[error("[JWT-ERROR-02] caller-supplied-token must start with Bearer (case-sensitive)")]
    MissingBearerPrefix,

    #[error("[JWT-ERROR-03] Bearer prefix present, but token is blank or missing")]
    BlankToken,
}

/// Token verification failures
///
/// Every variant denies the request; they only differ in the audit record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("[JWT-ERROR-07] jwt expired")]
    Expired,

    #[error("[JWT-ERROR-08] jwt not active")]
    NotYetValid,

    #[error("[JWT-ERROR-09] invalid signature")]
    InvalidSignature,

    #[error("[JWT-ERROR-09] jwt audience invalid")]
    InvalidAudience,

    #[error("[JWT-ERROR-09] jwt issuer invalid")]
    InvalidIssuer,

    #[error("[JWT-ERROR-09] token header carries no key id")]
    MissingKeyId,

    #[error("[JWT-ERROR-09] {0}")]
    Malformed(String),
}

impl SignatureError {
    /// Stable name for the audit record
    pub fn name(&self) -> &'static str {
        match self {
            Self::Expired => "TokenExpiredError",
            Self::NotYetValid => "NotBeforeError",
            _ => "JsonWebTokenError",
        }
    }
}

/// Authorizer errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Missing or malformed bearer framing
    #[error(transparent)]
    Format(#[from] TokenFormatError),

    /// Token could not be decoded
    #[error("[JWT-ERROR-04] JWT decode failed, input is likely not a JWT: {0}")]
    Decode(String),

    /// Token failed verification
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Tenant or client id not configured
    #[error("[JWT-ERROR-10] No tenant or client ID set: {0} is missing")]
    ConfigurationMissing(&'static str),

    /// Discovery returned no key for the token's key id
    #[error("no public key with ID '{kid}' under tenant {tenant}")]
    KeyLookup { tenant: String, kid: String },

    /// Discovery endpoint could not be reached or parsed
    #[error("key discovery failed: {0}")]
    KeyFetch(String),

    /// Token carried no roles at all
    #[error("[JWT-ERROR-05] no valid roles on token (token has no roles at all)")]
    NoRoles,

    /// Token carried roles but none resolved to a grant
    #[error("[JWT-ERROR-06] no valid roles on token")]
    InvalidRoles,

    /// Invocation body is not an authorizer event
    #[error("malformed authorizer event: {0}")]
    MalformedEvent(String),

    /// Role table override could not be loaded
    #[error("Invalid role configuration: {0}")]
    RoleConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    /// Stable name for the audit record
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Format(_) => "FormatError",
            Self::Decode(_) => "DecodeError",
            Self::Signature(e) => e.name(),
            Self::ConfigurationMissing(_) => "ConfigurationError",
            Self::KeyLookup { .. } | Self::KeyFetch(_) => "KeyLookupError",
            Self::NoRoles | Self::InvalidRoles => "RoleResolutionEmpty",
            Self::MalformedEvent(_) => "EventError",
            Self::RoleConfig(_) => "RoleConfigError",
            Self::Io(_) => "IoError",
        }
    }
}

/// Result type for authorizer operations
pub type Result<T> = std::result::Result<T, AuthzError>;
