// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::AuthenticatedSubject,
    error::ErrorBody,
    models::{
        AboutResponse, CreateMessageRequest, CreateMessageResponse, NonceResponse,
        TokenResponse, VerifyMessageRequest, WalletAddress,
    },
    state::AppState,
};

pub mod about;
pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/nonce", get(auth::get_nonce))
        .route("/auth/messages", post(auth::create_message))
        .route("/auth/messages/verify", post(auth::verify_message))
        .route("/auth/me", get(auth::get_current_subject))
        .route("/about", get(about::about));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/health/live", get(health::liveness));

    let observability = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id());

    Router::new()
        .nest("/api/v1", v1_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(observability)
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::get_nonce,
        auth::create_message,
        auth::verify_message,
        auth::get_current_subject,
        about::about,
        health::health,
        health::readiness,
        health::liveness
    ),
    components(
        schemas(
            NonceResponse,
            CreateMessageRequest,
            CreateMessageResponse,
            VerifyMessageRequest,
            TokenResponse,
            AboutResponse,
            AuthenticatedSubject,
            WalletAddress,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-In with Ethereum (EIP-4361)"),
        (name = "About", description = "Service information"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;
