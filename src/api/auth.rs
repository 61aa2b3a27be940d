// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SIWE sign-in endpoints.
//!
//! 1. `GET /auth/nonce` issues a nonce
//! 2. `POST /auth/messages` renders a challenge embedding a fresh nonce
//! 3. `POST /auth/messages/verify` checks the signed challenge and returns a JWT
//! 4. `GET /auth/me` introspects the bearer token

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::auth::{Auth, AuthenticatedSubject};
use crate::error::{ApiError, ErrorBody};
use crate::models::{
    CreateMessageRequest, CreateMessageResponse, NonceResponse, TokenResponse,
    VerifyMessageRequest,
};
use crate::state::AppState;

/// Turn body rejections into the JSON error shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))
}

/// Issue a single-use nonce.
#[utoipa::path(
    get,
    path = "/api/v1/auth/nonce",
    tag = "Auth",
    responses(
        (status = 200, description = "Nonce issued", body = NonceResponse),
        (status = 503, description = "Nonce storage unavailable", body = ErrorBody)
    )
)]
pub async fn get_nonce(State(state): State<AppState>) -> Result<Json<NonceResponse>, ApiError> {
    let nonce = state.challenges.nonces().generate_nonce().await?;
    Ok(Json(NonceResponse { nonce }))
}

/// Build an EIP-4361 challenge for the given account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/messages",
    tag = "Auth",
    request_body = CreateMessageRequest,
    responses(
        (status = 200, description = "Challenge to sign", body = CreateMessageResponse),
        (status = 400, description = "Domain, address or URI rejected", body = ErrorBody),
        (status = 422, description = "Malformed request body", body = ErrorBody),
        (status = 503, description = "Nonce storage unavailable", body = ErrorBody)
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<Json<CreateMessageResponse>, ApiError> {
    let request = json_body(payload)?;
    request.validate()?;

    let message = state
        .challenges
        .create_challenge_message(
            &request.domain,
            &request.address.0,
            request.chain_id,
            &request.uri,
            request.statement.as_deref(),
        )
        .await?;

    Ok(Json(CreateMessageResponse { message }))
}

/// Verify a signed challenge and issue a session token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/messages/verify",
    tag = "Auth",
    request_body = VerifyMessageRequest,
    responses(
        (status = 200, description = "Challenge verified", body = TokenResponse),
        (status = 400, description = "Invalid message format or nonce", body = ErrorBody),
        (status = 401, description = "Invalid signature", body = ErrorBody),
        (status = 422, description = "Malformed request body", body = ErrorBody),
        (status = 503, description = "Nonce storage unavailable", body = ErrorBody)
    )
)]
pub async fn verify_message(
    State(state): State<AppState>,
    payload: Result<Json<VerifyMessageRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let request = json_body(payload)?;
    request.validate()?;

    let identity = state
        .challenges
        .verify_challenge(&request.message, &request.signature)
        .await?;
    let token = state.tokens.create_siwe_token(&identity)?;

    tracing::info!(
        chain_id = identity.chain_id,
        address = %identity.signer_address,
        "session token issued"
    );

    Ok(Json(TokenResponse { token }))
}

/// Describe the caller's bearer token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token subject", body = AuthenticatedSubject),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 503, description = "Token verification not configured")
    )
)]
pub async fn get_current_subject(Auth(subject): Auth) -> Json<AuthenticatedSubject> {
    tracing::debug!(
        jti = %subject.token_id,
        siwe = subject.is_siwe_session(),
        "token introspected"
    );
    Json(subject)
}
