use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::error::AppError;

/// Opaque caller identifier issued by the hosted auth provider. Scope of
/// the quota ledger's per-caller accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Boundary to the auth collaborator: turn a bearer token into a caller
/// identity. `None` means "unauthenticated caller", which is not an error
/// at this layer — endpoints decide whether to reject it.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, AppError>;
}

/// Extract the bearer token and resolve it, rejecting unauthenticated
/// callers. Runs before any quota or generation logic.
pub async fn require_identity(
    headers: &HeaderMap,
    resolver: &dyn IdentityResolver,
) -> Result<Identity, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    resolver
        .resolve(token)
        .await?
        .ok_or(AppError::Unauthorized)
}

// ============================================================================
// HTTP resolver
// ============================================================================

#[derive(Deserialize)]
struct VerifyResponse {
    user_id: String,
}

/// HTTP client that verifies session tokens against the hosted auth
/// provider's `/v1/me` endpoint.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        Self { http, base_url }
    }
}

#[async_trait]
impl IdentityResolver for AuthClient {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, AppError> {
        let response = self
            .http
            .get(format!("{}/v1/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let status = response.status();

        // Provider rejecting the token means "no identity", not a failure.
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Auth(format!("verify endpoint returned {status}")));
        }

        let verified: VerifyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("invalid verify body: {e}")))?;

        Ok(Some(Identity(verified.user_id)))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StaticResolver;
    use super::*;

    fn headers_with(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(AUTHORIZATION, v.parse().unwrap());
        }
        headers
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let resolver = StaticResolver::new(&[("tok", "user-1")]);
        let err = require_identity(&headers_with(None), &resolver)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_malformed_header_is_unauthorized() {
        let resolver = StaticResolver::new(&[("tok", "user-1")]);
        for bad in ["tok", "Basic tok", "Bearer "] {
            let err = require_identity(&headers_with(Some(bad)), &resolver)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Unauthorized), "value: {bad}");
        }
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let resolver = StaticResolver::new(&[("tok", "user-1")]);
        let err = require_identity(&headers_with(Some("Bearer nope")), &resolver)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_valid_token_resolves() {
        let resolver = StaticResolver::new(&[("tok", "user-1")]);
        let identity = require_identity(&headers_with(Some("Bearer tok")), &resolver)
            .await
            .unwrap();
        assert_eq!(identity.as_str(), "user-1");
    }
}
