//! RS256 token verification

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, Algorithm, Validation};

use crate::config::Identity;
use crate::error::SignatureError;
use crate::keys::SigningKey;
use crate::types::Claim;

/// Issuers accepted for a tenant (v1 and v2 endpoints)
pub fn issuers(tenant_id: &str) -> [String; 2] {
    [
        format!("https://sts.windows.net/{}/", tenant_id),
        format!("https://login.microsoftonline.com/{}/v2.0", tenant_id),
    ]
}

/// Accepted audiences, from a comma-separated client id
pub fn audiences(client_id: &str) -> Vec<&str> {
    client_id.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn validation(identity: Identity<'_>) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.set_audience(&audiences(identity.client_id));
    validation.set_issuer(&issuers(identity.tenant_id));
    validation
}

fn classify(err: JwtError) -> SignatureError {
    match err.kind() {
        ErrorKind::ExpiredSignature => SignatureError::Expired,
        ErrorKind::ImmatureSignature => SignatureError::NotYetValid,
        ErrorKind::InvalidSignature => SignatureError::InvalidSignature,
        ErrorKind::InvalidAudience => SignatureError::InvalidAudience,
        ErrorKind::InvalidIssuer => SignatureError::InvalidIssuer,
        _ => SignatureError::Malformed(err.to_string()),
    }
}

/// Verify `token` against `key` and return its claims
pub fn verify(token: &str, key: &SigningKey, identity: Identity<'_>) -> Result<Claim, SignatureError> {
    let decoding_key = key.decoding_key()?;

    decode::<Claim>(token, &decoding_key, &validation(identity))
        .map(|data| data.claims)
        .map_err(classify)
}
