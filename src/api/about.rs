// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::models::AboutResponse;

/// Service name and version.
#[utoipa::path(
    get,
    path = "/api/v1/about",
    tag = "About",
    responses(
        (status = 200, description = "Service information", body = AboutResponse)
    )
)]
pub async fn about() -> Json<AboutResponse> {
    Json(AboutResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_package_metadata() {
        let Json(about) = about().await;
        assert_eq!(about.name, "siwe-auth-server");
        assert_eq!(about.version, env!("CARGO_PKG_VERSION"));
    }
}
