// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive `ToSchema`
//! for OpenAPI documentation.
//!
//! Request bodies validate their shape at the boundary (`validate`), before
//! any nonce is touched. Semantic checks of the SIWE message itself happen
//! in [`crate::siwe`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::siwe::message::{is_valid_statement, parse_domain};
use crate::siwe::signature::decode_signature;

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes), any casing.
/// Challenges always render it EIP-55 checksummed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix("0x")
            .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

// =============================================================================
// Nonce
// =============================================================================

/// A freshly issued nonce.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NonceResponse {
    /// Alphanumeric, single use, valid for `NONCE_TTL_SECONDS`.
    #[schema(example = "Yp3rQ0xN7aLwE2b9K")]
    pub nonce: String,
}

// =============================================================================
// Challenge Messages
// =============================================================================

/// Request to build a SIWE challenge message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMessageRequest {
    /// RFC 3986 authority requesting the sign-in (no scheme, path, query or fragment).
    #[schema(example = "example.com")]
    pub domain: String,
    /// Account that will sign the challenge.
    pub address: WalletAddress,
    /// EIP-155 chain id (positive).
    #[schema(example = 1, minimum = 1)]
    pub chain_id: u64,
    /// Absolute URI of the resource being signed into.
    #[schema(example = "https://example.com/login")]
    pub uri: String,
    /// Overrides the default statement.
    #[serde(default)]
    pub statement: Option<String>,
}

impl CreateMessageRequest {
    /// Shape checks: RFC 3986 authority, address `0x` + 40 hex, positive chain id,
    /// single-line statement.
    pub fn validate(&self) -> Result<(), ApiError> {
        if parse_domain(&self.domain).is_err() {
            return Err(ApiError::unprocessable(
                "domain must be an RFC 3986 authority ([userinfo@]host[:port])",
            ));
        }
        if !self.address.is_well_formed() {
            return Err(ApiError::unprocessable(
                "address must be 0x followed by 40 hex characters",
            ));
        }
        if self.chain_id == 0 {
            return Err(ApiError::unprocessable("chain_id must be positive"));
        }
        if self.uri.trim().is_empty() {
            return Err(ApiError::unprocessable("uri is required"));
        }
        if self
            .statement
            .as_deref()
            .is_some_and(|s| !is_valid_statement(s))
        {
            return Err(ApiError::unprocessable(
                "statement must be a single line without control characters",
            ));
        }
        Ok(())
    }
}

/// The rendered challenge, to be signed verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMessageResponse {
    pub message: String,
}

/// A signed challenge.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyMessageRequest {
    /// Challenge text exactly as returned by `POST /auth/messages`.
    pub message: String,
    /// `0x` + 130 hex characters (`r || s || v`).
    #[schema(example = "0x56f94be3ceb9688ca8d5e061727b0eb943c6a6f0560b751fc105d85f0be27afc39993e9d9ad5477ebed33d5587072ac767cf9592a601d17f0826590e8a7fa35a1c")]
    pub signature: String,
}

impl VerifyMessageRequest {
    /// Shape checks: signature `^0x[a-fA-F0-9]{130}$`, non-empty message.
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Err(e) = decode_signature(&self.signature) {
            return Err(ApiError::unprocessable(format!(
                "signature must be 0x followed by 130 hex characters: {e}"
            )));
        }
        if self.message.is_empty() {
            return Err(ApiError::unprocessable("message is required"));
        }
        Ok(())
    }
}

/// Session token issued for a verified challenge.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Compact JWT.
    pub token: String,
}

// =============================================================================
// Service Info
// =============================================================================

/// Service name and version.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AboutResponse {
    pub name: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_request() -> CreateMessageRequest {
        CreateMessageRequest {
            domain: "example.com".to_string(),
            address: WalletAddress::from("0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"),
            chain_id: 1,
            uri: "https://example.com/".to_string(),
            statement: None,
        }
    }

    #[test]
    fn wallet_address_shape() {
        assert!(WalletAddress::from("0x2c7536E3605D9C16a7a3D7b1898e529396a65c23").is_well_formed());
        assert!(!WalletAddress::from("2c7536E3605D9C16a7a3D7b1898e529396a65c23").is_well_formed());
        assert!(!WalletAddress::from("0x2c75").is_well_formed());
        assert!(!WalletAddress::from("0xzz7536E3605D9C16a7a3D7b1898e529396a65c23").is_well_formed());
    }

    #[test]
    fn message_request_validation() {
        assert!(message_request().validate().is_ok());

        let mut req = message_request();
        req.domain = "example.com/login".to_string();
        assert!(req.validate().is_err());

        let mut req = message_request();
        req.domain = "localhost:3000".to_string();
        assert!(req.validate().is_ok());

        for domain in ["exa[mple", "@@@", "a:b:c"] {
            let mut req = message_request();
            req.domain = domain.to_string();
            assert!(req.validate().is_err(), "{domain}");
        }

        let mut req = message_request();
        req.statement = Some("one\rtwo".to_string());
        assert!(req.validate().is_err());

        let mut req = message_request();
        req.statement = Some("URI: https://evil.example/".to_string());
        assert!(req.validate().is_ok());

        let mut req = message_request();
        req.chain_id = 0;
        assert!(req.validate().is_err());

        let mut req = message_request();
        req.address = WalletAddress::from("0x1234");
        assert!(req.validate().is_err());
    }

    #[test]
    fn verify_request_validation() {
        let ok = VerifyMessageRequest {
            message: "msg".to_string(),
            signature: format!("0x{}", "ab".repeat(65)),
        };
        assert!(ok.validate().is_ok());

        let short = VerifyMessageRequest {
            message: "msg".to_string(),
            signature: "0xdeadbeef".to_string(),
        };
        assert!(short.validate().is_err());

        let unprefixed = VerifyMessageRequest {
            message: "msg".to_string(),
            signature: "ab".repeat(66),
        };
        assert!(unprefixed.validate().is_err());

        let padded = VerifyMessageRequest {
            message: "msg".to_string(),
            signature: format!(" 0x{}", "ab".repeat(65)),
        };
        assert!(padded.validate().is_err());
    }

    #[test]
    fn statement_is_optional_in_json() {
        let req: CreateMessageRequest = serde_json::from_str(
            r#"{"domain":"example.com","address":"0x2c7536E3605D9C16a7a3D7b1898e529396a65c23","chain_id":1,"uri":"https://example.com/"}"#,
        )
        .unwrap();
        assert!(req.statement.is_none());
    }
}
