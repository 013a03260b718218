//! Bearer token framing and unverified decoding

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Header, Validation};

use crate::error::{AuthzError, Result, TokenFormatError};
use crate::types::Claim;

const BEARER: &str = "Bearer";

/// Header and claims of a token whose signature has not been checked yet
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub header: Header,
    pub claim: Claim,
}

impl DecodedToken {
    pub fn key_id(&self) -> Option<&str> {
        self.header.kid.as_deref()
    }
}

/// Check the `Bearer <token>` framing and return the token part
///
/// The first space-separated word must be exactly `Bearer`; the remainder,
/// trimmed, must not be empty.
pub fn check_format(authorization: Option<&str>) -> std::result::Result<&str, TokenFormatError> {
    let authorization = match authorization {
        Some(value) if !value.is_empty() => value,
        _ => return Err(TokenFormatError::MissingToken),
    };

    let (prefix, token) = authorization
        .split_once(' ')
        .unwrap_or((authorization, ""));

    if prefix != BEARER {
        return Err(TokenFormatError::MissingBearerPrefix);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(TokenFormatError::BlankToken);
    }

    Ok(token)
}

/// Decode header and claims without verifying the signature
///
/// The result is only used to pick the verification key and for
/// diagnostics; authorization always uses the claims returned by
/// [`crate::signature::verify`].
pub fn decode_unverified(token: &str) -> Result<DecodedToken> {
    let header = decode_header(token).map_err(|e| AuthzError::Decode(e.to_string()))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claim>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| AuthzError::Decode(e.to_string()))?;

    Ok(DecodedToken {
        header,
        claim: data.claims,
    })
}
