//! End-to-end authorization tests
//!
//! Tokens are signed with the RSA fixture key and verified against a static
//! key provider holding its public half.

use chrono::Utc;
use gateway_authz::{
    Authorizer, AuthorizerConfig, AuthorizerEvent, AuthorizerResult, Effect, HttpVerb,
    RoleTables, SigningKey, Stage, StaticKeyProvider,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;

const TENANT: &str = "tenant-1";
const CLIENT: &str = "client-1";
const KID: &str = "test-key";
const METHOD_ARN: &str = "arn:aws:execute-api:eu-west-1:123456789012:abc123/prod/GET/vehicles";

const MODULUS: &str = "pKD_29NTghKRGseveHu6_5jCzSXgL2b3ljWGwoZuGGYKZsWX8C4PqTxHA575dMKFvsMil7_PZufaujRrCYOli-nmHA8nnsqT_EbrUR_wKJYeuUwO8R2RyPMInMcqAup0drNwpVTXLV-FATBJXf4rVIgaFC0XAasfPrZAaBUOiGRHWMnoUFLHeLMAucIQIIXBp5BN0pDcnnN6xshfCXfizsyERKi45LlanzrqJPmiDoU-LVFrbIqUOSg96Wy03p-TmRGQXO72A-ykh5-K5nIrZSCfv3INmcbf_bBGbQEmfHBpeZb0zJKOSp4VgQy_WZ_EHqhY3-doIDMMmVTJwz_MNw";
const EXPONENT: &str = "AQAB";

// ============================================================================
// HELPERS
// ============================================================================

fn claims(roles: Value) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "sub": "subject-1",
        "aud": CLIENT,
        "iss": format!("https://sts.windows.net/{}/", TENANT),
        "iat": now,
        "nbf": now - 10,
        "exp": now + 600,
        "preferred_username": "tester@example.com",
        "roles": roles,
    })
}

fn sign_with_kid(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());

    let key = EncodingKey::from_rsa_pem(include_bytes!("fixtures/test_rsa.pem")).unwrap();
    encode(&header, claims, &key).unwrap()
}

fn sign(claims: &Value) -> String {
    sign_with_kid(claims, KID)
}

fn authorizer() -> Authorizer {
    let keys = StaticKeyProvider::new([SigningKey::rsa(KID, MODULUS, EXPONENT)]);
    Authorizer::new(AuthorizerConfig::new(TENANT, CLIENT), Arc::new(keys))
}

fn bearer(token: &str) -> AuthorizerEvent {
    AuthorizerEvent::new(format!("Bearer {}", token), METHOD_ARN)
}

fn resources(result: &AuthorizerResult) -> Vec<String> {
    result
        .policy_document
        .statements
        .iter()
        .map(|s| s.resource.to_string())
        .collect()
}

fn assert_denied(result: &AuthorizerResult) {
    assert_eq!(result, &AuthorizerResult::unauthorised());
    assert_eq!(result.policy_document.statements.len(), 1);
    assert_eq!(result.policy_document.statements[0].effect, Effect::Deny);
}

// ============================================================================
// ALLOW PATHS
// ============================================================================

#[tokio::test]
async fn test_functional_role_allows_vehicles() {
    let token = sign(&claims(json!(["TechRecord.View"])));
    let (result, log) = authorizer().authorize_with_log(&bearer(&token)).await;

    assert_eq!(result.principal_id, "subject-1");
    assert!(result.is_allowed());
    assert_eq!(
        resources(&result),
        vec![
            "arn:aws:execute-api:eu-west-1:*:*/*/GET/vehicles/*",
            "arn:aws:execute-api:eu-west-1:*:*/*/OPTIONS/vehicles/*",
        ]
    );
    assert!(result
        .policy_document
        .statements
        .iter()
        .all(|s| s.effect == Effect::Allow && s.action == "execute-api:Invoke"));

    assert_eq!(log.status_code, Some(200));
    assert_eq!(log.stage, Stage::Done);
    assert_eq!(log.email.as_deref(), Some("tester@example.com"));
    assert!(log.token_expiry.is_some());
    assert!(log.error.is_none());
}

#[tokio::test]
async fn test_legacy_read_allows_safe_verbs_everywhere() {
    let token = sign(&claims(json!(["CVSFullAccess.read"])));
    let (result, log) = authorizer().authorize_with_log(&bearer(&token)).await;

    let verbs: Vec<HttpVerb> = result
        .policy_document
        .statements
        .iter()
        .map(|s| s.resource.http_verb)
        .collect();

    assert_eq!(verbs.len(), 2);
    assert!(verbs.contains(&HttpVerb::Get));
    assert!(verbs.contains(&HttpVerb::Head));
    assert!(resources(&result)
        .iter()
        .all(|r| r.starts_with("arn:aws:execute-api:eu-west-1:*:*/*/") && r.ends_with("/*")));
    assert_eq!(log.roles, vec!["CVSFullAccess.read".to_string()]);
}

#[tokio::test]
async fn test_legacy_trailers_read() {
    let token = sign(&claims(json!(["DVLATrailers.read"])));
    let result = authorizer().authorize(&bearer(&token)).await;

    assert_eq!(result.policy_document.statements.len(), 4);
    let resources = resources(&result);
    assert!(resources.contains(&"arn:aws:execute-api:eu-west-1:*:*/*/GET/v1/trailers".to_string()));
    assert!(resources.contains(&"arn:aws:execute-api:eu-west-1:*:*/*/HEAD/v1/trailers/*".to_string()));
}

#[tokio::test]
async fn test_legacy_roles_win_over_functional() {
    let token = sign(&claims(json!(["TechRecord.View", "CVSFullAccess.write"])));
    let result = authorizer().authorize(&bearer(&token)).await;

    assert_eq!(
        resources(&result),
        vec!["arn:aws:execute-api:eu-west-1:*:*/*/*/*"]
    );
}

#[tokio::test]
async fn test_custom_role_tables() {
    let tables = RoleTables::default().with_legacy("Reports", ["/v1/reports"]);
    let authorizer = authorizer().with_tables(tables);

    let token = sign(&claims(json!(["Reports.write"])));
    let result = authorizer.authorize(&bearer(&token)).await;
    assert_eq!(
        resources(&result),
        vec!["arn:aws:execute-api:eu-west-1:*:*/*/*/v1/reports"]
    );

    // Built-in names are gone once the tables are replaced
    let token = sign(&claims(json!(["CVSFullAccess.write"])));
    assert_denied(&authorizer.authorize(&bearer(&token)).await);
}

#[tokio::test]
async fn test_multiple_audiences() {
    let keys = StaticKeyProvider::new([SigningKey::rsa(KID, MODULUS, EXPONENT)]);
    let authorizer = Authorizer::new(
        AuthorizerConfig::new(TENANT, format!("other-client,{}", CLIENT)),
        Arc::new(keys),
    );

    let token = sign(&claims(json!(["TechRecord.View"])));
    assert!(authorizer.authorize(&bearer(&token)).await.is_allowed());
}

#[tokio::test]
async fn test_v2_issuer_accepted() {
    let mut claims = claims(json!(["TechRecord.View"]));
    claims["iss"] = json!(format!("https://login.microsoftonline.com/{}/v2.0", TENANT));

    let result = authorizer().authorize(&bearer(&sign(&claims))).await;
    assert!(result.is_allowed());
}

// ============================================================================
// ROLE FAILURES
// ============================================================================

#[tokio::test]
async fn test_empty_roles_denied() {
    let token = sign(&claims(json!([])));
    let (result, log) = authorizer().authorize_with_log(&bearer(&token)).await;

    assert_denied(&result);
    let error = log.error.unwrap();
    assert_eq!(error.name, "RoleResolutionEmpty");
    assert!(error.message.starts_with("[JWT-ERROR-05]"));
}

#[tokio::test]
async fn test_absent_roles_denied() {
    let mut claims = claims(json!([]));
    claims.as_object_mut().unwrap().remove("roles");

    let (result, log) = authorizer().authorize_with_log(&bearer(&sign(&claims))).await;

    assert_denied(&result);
    assert!(log.error.unwrap().message.starts_with("[JWT-ERROR-05]"));
}

#[tokio::test]
async fn test_unrecognised_roles_denied() {
    let token = sign(&claims(json!(["Nobody.read", "TechRecord.Delete", "junk"])));
    let (result, log) = authorizer().authorize_with_log(&bearer(&token)).await;

    assert_denied(&result);
    let error = log.error.unwrap();
    assert_eq!(error.name, "RoleResolutionEmpty");
    assert!(error.message.starts_with("[JWT-ERROR-06]"));
    assert_eq!(log.status_code, Some(401));
    assert_eq!(log.stage, Stage::Denied);
}

// ============================================================================
// VERIFICATION FAILURES
// ============================================================================

#[tokio::test]
async fn test_expired_token_denied() {
    let mut claims = claims(json!(["TechRecord.View"]));
    claims["exp"] = json!(Utc::now().timestamp() - 60);

    let (result, log) = authorizer().authorize_with_log(&bearer(&sign(&claims))).await;

    assert_denied(&result);
    assert_eq!(log.error.unwrap().name, "TokenExpiredError");
    // Claims are decoded before verification, so the record still names the caller
    assert_eq!(log.email.as_deref(), Some("tester@example.com"));
}

#[tokio::test]
async fn test_not_yet_valid_token_denied() {
    let mut claims = claims(json!(["TechRecord.View"]));
    claims["nbf"] = json!(Utc::now().timestamp() + 300);

    let (result, log) = authorizer().authorize_with_log(&bearer(&sign(&claims))).await;

    assert_denied(&result);
    assert_eq!(log.error.unwrap().name, "NotBeforeError");
}

#[tokio::test]
async fn test_wrong_audience_denied() {
    let mut claims = claims(json!(["TechRecord.View"]));
    claims["aud"] = json!("someone-else");

    let (result, log) = authorizer().authorize_with_log(&bearer(&sign(&claims))).await;

    assert_denied(&result);
    let error = log.error.unwrap();
    assert_eq!(error.name, "JsonWebTokenError");
    assert_eq!(error.message, "[JWT-ERROR-09] jwt audience invalid");
}

#[tokio::test]
async fn test_wrong_issuer_denied() {
    let mut claims = claims(json!(["TechRecord.View"]));
    claims["iss"] = json!("https://sts.windows.net/another-tenant/");

    let (result, log) = authorizer().authorize_with_log(&bearer(&sign(&claims))).await;

    assert_denied(&result);
    assert_eq!(log.error.unwrap().message, "[JWT-ERROR-09] jwt issuer invalid");
}

#[tokio::test]
async fn test_tampered_payload_denied() {
    let token = sign(&claims(json!(["TechRecord.View"])));
    let other = sign(&claims(json!(["CVSFullAccess.write"])));

    // Payload of one token with the signature of another
    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    let (result, log) = authorizer().authorize_with_log(&bearer(&forged)).await;

    assert_denied(&result);
    assert_eq!(log.error.unwrap().message, "[JWT-ERROR-09] invalid signature");
}

#[tokio::test]
async fn test_unknown_key_id_denied() {
    let token = sign_with_kid(&claims(json!(["TechRecord.View"])), "rotated-away");
    let (result, log) = authorizer().authorize_with_log(&bearer(&token)).await;

    assert_denied(&result);
    let error = log.error.unwrap();
    assert_eq!(error.name, "KeyLookupError");
    assert_eq!(
        error.message,
        "no public key with ID 'rotated-away' under tenant tenant-1"
    );
}

#[tokio::test]
async fn test_missing_key_id_denied() {
    let key = EncodingKey::from_rsa_pem(include_bytes!("fixtures/test_rsa.pem")).unwrap();
    let token = encode(
        &Header::new(Algorithm::RS256),
        &claims(json!(["TechRecord.View"])),
        &key,
    )
    .unwrap();

    let (result, log) = authorizer().authorize_with_log(&bearer(&token)).await;

    assert_denied(&result);
    assert_eq!(
        log.error.unwrap().message,
        "[JWT-ERROR-09] token header carries no key id"
    );
}

// ============================================================================
// REQUEST FAILURES
// ============================================================================

#[tokio::test]
async fn test_missing_configuration_denied() {
    let keys = StaticKeyProvider::new([SigningKey::rsa(KID, MODULUS, EXPONENT)]);
    let config = AuthorizerConfig::from_lookup(|key: &str| {
        (key == "AZURE_TENANT_ID").then(|| TENANT.to_string())
    });
    let authorizer = Authorizer::new(config, Arc::new(keys));

    let token = sign(&claims(json!(["TechRecord.View"])));
    let (result, log) = authorizer.authorize_with_log(&bearer(&token)).await;

    assert_denied(&result);
    let error = log.error.unwrap();
    assert_eq!(error.name, "ConfigurationError");
    assert!(error.message.starts_with("[JWT-ERROR-10]"));
    assert!(error.message.contains("AZURE_CLIENT_ID"));
}

#[tokio::test]
async fn test_malformed_bearer_denied() {
    let token = sign(&claims(json!(["TechRecord.View"])));
    let authorizer = authorizer();

    for header in [format!("bearer {}", token), format!("Token {}", token), token.clone()] {
        let event = AuthorizerEvent::new(header, METHOD_ARN);
        let (result, log) = authorizer.authorize_with_log(&event).await;

        assert_denied(&result);
        assert!(log.error.unwrap().message.starts_with("[JWT-ERROR-02]"));
    }
}

#[tokio::test]
async fn test_undecodable_token_denied() {
    let (result, log) = authorizer()
        .authorize_with_log(&bearer("myBearerToken"))
        .await;

    assert_denied(&result);
    let error = log.error.unwrap();
    assert_eq!(error.name, "DecodeError");
    assert!(error.message.starts_with("[JWT-ERROR-04]"));
}

#[tokio::test]
async fn test_malformed_method_arn_does_not_deny() {
    let token = sign(&claims(json!(["TechRecord.View"])));
    let event = AuthorizerEvent::new(format!("Bearer {}", token), "not-an-arn");

    let (result, log) = authorizer().authorize_with_log(&event).await;

    assert!(result.is_allowed());
    assert_eq!(log.request_url.as_deref(), Some("not-an-arn"));
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let authorizer = Arc::new(authorizer());
    let allowed = sign(&claims(json!(["TechRecord.View"])));
    let denied = sign(&claims(json!(["Nobody.read"])));

    let handles = (0..20).map(|i| {
        let authorizer = Arc::clone(&authorizer);
        let token = if i % 2 == 0 { allowed.clone() } else { denied.clone() };
        tokio::spawn(async move {
            let (result, log) = authorizer.authorize_with_log(&bearer(&token)).await;
            (i, result, log)
        })
    });

    let mut request_ids = std::collections::HashSet::new();
    for outcome in futures::future::join_all(handles).await {
        let (i, result, log) = outcome.unwrap();
        assert_eq!(result.is_allowed(), i % 2 == 0);
        assert_eq!(log.error.is_some(), i % 2 == 1);
        assert!(request_ids.insert(log.request_id));
    }
}
