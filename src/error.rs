// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::TokenError;
use crate::cache::CacheError;
use crate::siwe::ChallengeError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<&'static str>,
}

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message).with_code("validation_error")
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message).with_code("internal_error")
    }
}

impl From<ChallengeError> for ApiError {
    fn from(e: ChallengeError) -> Self {
        let status = match &e {
            ChallengeError::InvalidMessageFormat | ChallengeError::InvalidNonce => {
                StatusCode::BAD_REQUEST
            }
            ChallengeError::InvalidSignature => StatusCode::UNAUTHORIZED,
            ChallengeError::ExpiryOutOfRange => {
                tracing::error!("challenge expiry out of range, check NONCE_TTL_SECONDS");
                return ApiError::internal("Failed to build the challenge.");
            }
            ChallengeError::Cache(cause) => {
                tracing::error!(error = %cause, "nonce cache failure");
                return ApiError::service_unavailable("Nonce storage is temporarily unavailable.")
                    .with_code(e.code());
            }
        };
        ApiError::new(status, e.to_string()).with_code(e.code())
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        ChallengeError::Cache(e).into()
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        tracing::error!(error = %e, "token issuance failed");
        ApiError::internal("Failed to issue token.")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code.map(str::to_string),
        });
        (self.status, body).into_response()
    }
}
