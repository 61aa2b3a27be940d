// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require a valid token issued by
//! this server:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(subject): Auth) -> impl IntoResponse {
//!     // subject is AuthenticatedSubject
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedSubject};
use crate::state::AppState;

/// Extractor for authenticated callers.
///
/// Validates the `Authorization: Bearer <token>` header against the
/// configured public key, expected issuer and audiences.
pub struct Auth(pub AuthenticatedSubject);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = state.tokens.decode_access_token(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            AuthError::from(e)
        })?;

        Ok(Auth(AuthenticatedSubject::from_claims(claims)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::siwe::ExtractedIdentity;
    use crate::state::test_support::test_state;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = test_state();
        let mut parts = parts_with(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_requires_bearer_scheme() {
        let state = test_state();
        let mut parts = parts_with(Some("Basic dXNlcjpwYXNz"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let state = test_state();
        let token = state
            .tokens
            .create_siwe_token(&ExtractedIdentity {
                chain_id: 5,
                signer_address: "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23".to_string(),
            })
            .unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let Auth(subject) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(
            subject.subject,
            "eip155:5:0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
        );
        assert_eq!(subject.chain_id, Some(5));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_garbage_token() {
        let state = test_state();
        let mut parts = parts_with(Some("Bearer not-a-token"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }
}
