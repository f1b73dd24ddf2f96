use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
    roles_claim: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,

    // Access tokens from some providers carry a token kind
    #[serde(default)]
    kind: Option<String>,

    // Everything else, including the configured roles claim
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
        roles_claim: String,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
            roles_claim,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        claims_to_user(token_data.claims, &self.roles_claim)
    }
}

fn claims_to_user(claims: Claims, roles_claim: &str) -> Result<AuthenticatedUser, AppError> {
    if let Some(kind) = &claims.kind {
        if kind != "AccessToken" {
            return Err(AppError::Auth("Token is not an access token".to_string()));
        }
    }

    let roles = extract_roles(claims.extra.get(roles_claim));

    Ok(AuthenticatedUser {
        sub: claims.sub,
        roles,
    })
}

/// Roles may be published as an array of strings or a single
/// space-separated string, depending on the provider.
fn extract_roles(claim: Option<&Value>) -> Vec<String> {
    match claim {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_roles_from_array_claim() {
        let user = claims_to_user(
            claims(json!({ "sub": "u1", "roles": ["admin", 7, "member"] })),
            "roles",
        )
        .unwrap();
        assert_eq!(user.roles, vec!["admin", "member"]);
        assert!(user.is_admin());
    }

    #[test]
    fn test_roles_from_namespaced_string_claim() {
        let user = claims_to_user(
            claims(json!({ "sub": "u1", "https://acara.app/roles": "member super_admin" })),
            "https://acara.app/roles",
        )
        .unwrap();
        assert_eq!(user.roles, vec!["member", "super_admin"]);
    }

    #[test]
    fn test_missing_roles_claim_means_no_roles() {
        let user = claims_to_user(claims(json!({ "sub": "u1" })), "roles").unwrap();
        assert!(user.roles.is_empty());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_non_access_token_rejected() {
        let result = claims_to_user(claims(json!({ "sub": "u1", "kind": "IdToken" })), "roles");
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}
