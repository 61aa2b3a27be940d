// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated subject representation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims of tokens minted by [`TokenIssuer`](super::TokenIssuer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Issuer
    pub iss: String,

    /// Subject (CAIP-10 account id for SIWE sessions)
    pub sub: String,

    /// Audience
    pub aud: Vec<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Unique token id
    pub jti: String,

    /// Free-form payload of generic access tokens
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, serde_json::Value>,

    /// Chain the SIWE session was signed for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,

    /// Checksummed address that signed the SIWE challenge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_address: Option<String>,
}

/// Authenticated caller extracted from a verified bearer token.
///
/// This is the type handlers receive through the [`Auth`](super::Auth)
/// extractor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedSubject {
    /// Token subject
    pub subject: String,

    /// Audiences the token was issued for
    pub audience: Vec<String>,

    /// Token expiry
    pub expires_at: DateTime<Utc>,

    /// Present on SIWE session tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,

    /// Present on SIWE session tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_address: Option<String>,

    /// Token id, used for logging only
    #[serde(skip)]
    pub token_id: String,
}

impl AuthenticatedSubject {
    /// Create from verified claims.
    pub fn from_claims(claims: Claims) -> Self {
        let expires_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_default();

        Self {
            subject: claims.sub,
            audience: claims.aud,
            expires_at,
            chain_id: claims.chain_id,
            signer_address: claims.signer_address,
            token_id: claims.jti,
        }
    }

    /// Whether the subject signed in with Ethereum.
    pub fn is_siwe_session(&self) -> bool {
        self.signer_address.is_some()
    }
}
