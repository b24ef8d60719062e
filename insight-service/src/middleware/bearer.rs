//! Bearer credential extraction.

use crate::error::AnalysisError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// The raw token from `Authorization: Bearer <token>`.
///
/// Missing headers, other schemes and empty tokens are rejected as
/// Unauthorized before the handler runs.
#[derive(Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// never print the credential
impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AnalysisError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                value
                    .strip_prefix("Bearer ")
                    .or_else(|| value.strip_prefix("bearer "))
            })
            .map(str::trim)
            .filter(|token| !token.is_empty());

        match token {
            Some(token) => Ok(BearerToken(token.to_string())),
            None => {
                tracing::warn!("Missing or malformed Authorization header");
                crate::services::metrics::record_denial("missing_credential");
                Err(AnalysisError::Unauthorized)
            }
        }
    }
}
