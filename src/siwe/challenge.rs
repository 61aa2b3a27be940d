// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Challenge issuance and verification.
//!
//! A challenge is an EIP-4361 message embedding a freshly issued nonce. The
//! nonce is consumed only after the signature checks out, so a failed attempt
//! leaves the challenge usable until its TTL runs out.

use std::str::FromStr;

use ::siwe::{Message, VerificationError, VerificationOpts};
use alloy::primitives::Address;
use chrono::Utc;
use serde::Serialize;

use crate::cache::CacheError;

use super::message::{
    checksummed_address, compose, is_valid_statement, parse_canonical, parse_domain,
    ChallengeFields,
};
use super::nonce::NonceStore;
use super::signature::decode_signature;

/// Failure kinds of the challenge flow.
#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    #[error("The SIWE message format is invalid.")]
    InvalidMessageFormat,

    #[error("The nonce provided in the SIWE message is invalid.")]
    InvalidNonce,

    #[error("The SIWE signature is invalid.")]
    InvalidSignature,

    /// `issued_at + ttl` does not fit a timestamp.
    #[error("challenge expiry is out of range")]
    ExpiryOutOfRange,

    #[error("nonce cache unavailable: {0}")]
    Cache(#[from] CacheError),
}

impl ChallengeError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ChallengeError::InvalidMessageFormat => "invalid_message_format",
            ChallengeError::InvalidNonce => "invalid_nonce",
            ChallengeError::InvalidSignature => "invalid_signature",
            ChallengeError::ExpiryOutOfRange => "internal_error",
            ChallengeError::Cache(_) => "cache_unavailable",
        }
    }
}

/// Identity carried by a (verified or merely parsed) challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedIdentity {
    pub chain_id: u64,
    /// EIP-55 checksummed.
    pub signer_address: String,
}

impl From<&Message> for ExtractedIdentity {
    fn from(message: &Message) -> Self {
        Self {
            chain_id: message.chain_id,
            signer_address: checksummed_address(message),
        }
    }
}

/// Builds and verifies SIWE challenges.
#[derive(Clone)]
pub struct ChallengeService {
    nonces: NonceStore,
    default_statement: String,
}

impl ChallengeService {
    pub fn new(nonces: NonceStore, default_statement: impl Into<String>) -> Self {
        Self {
            nonces,
            default_statement: default_statement.into(),
        }
    }

    pub fn nonces(&self) -> &NonceStore {
        &self.nonces
    }

    /// Issue a nonce and render a challenge for `address` to sign.
    ///
    /// A missing or empty `statement` falls back to the configured default.
    /// The challenge expires together with its nonce.
    pub async fn create_challenge_message(
        &self,
        domain: &str,
        address: &str,
        chain_id: u64,
        uri: &str,
        statement: Option<&str>,
    ) -> Result<String, ChallengeError> {
        let domain = parse_domain(domain).map_err(|e| {
            tracing::debug!(error = %e, "rejected challenge domain");
            ChallengeError::InvalidMessageFormat
        })?;
        let address = parse_address(address)?;

        let statement = match statement {
            Some(statement) if !statement.is_empty() => statement,
            _ => self.default_statement.as_str(),
        };
        if !is_valid_statement(statement) {
            return Err(ChallengeError::InvalidMessageFormat);
        }

        let issued_at = Utc::now();
        let expiration_time = chrono::Duration::from_std(self.nonces.ttl())
            .ok()
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or(ChallengeError::ExpiryOutOfRange)?;

        let nonce = self.nonces.generate_nonce().await?;
        let composed = compose(ChallengeFields {
            domain: &domain,
            address,
            statement: Some(statement).filter(|s| !s.is_empty()),
            uri,
            chain_id,
            nonce: nonce.clone(),
            issued_at,
            expiration_time,
        });
        let message = match composed {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "rejected challenge fields");
                self.nonces.clear_nonce(&nonce).await?;
                return Err(ChallengeError::InvalidMessageFormat);
            }
        };

        tracing::info!(
            nonce = %message.nonce,
            chain_id,
            address = %checksummed_address(&message),
            "challenge issued"
        );

        Ok(message.to_string())
    }

    /// Verify a signed challenge and consume its nonce.
    pub async fn verify_challenge(
        &self,
        message: &str,
        signature: &str,
    ) -> Result<ExtractedIdentity, ChallengeError> {
        let parsed = parse_message(message)?;

        if !self.nonces.is_nonce_valid(&parsed.nonce).await? {
            tracing::info!(nonce = %parsed.nonce, "challenge nonce unknown or expired");
            return Err(ChallengeError::InvalidNonce);
        }

        let signature = decode_signature(signature).map_err(|e| {
            tracing::info!(
                nonce = %parsed.nonce,
                error = %e,
                "undecodable challenge signature"
            );
            ChallengeError::InvalidSignature
        })?;

        // Checks the validity window, then recovers the EIP-191 signer.
        if let Err(e) = parsed
            .verify(&signature, &VerificationOpts::default())
            .await
        {
            if matches!(e, VerificationError::Time) {
                tracing::info!(nonce = %parsed.nonce, "challenge outside its validity window");
            } else {
                tracing::info!(
                    nonce = %parsed.nonce,
                    error = %e,
                    "challenge signature mismatch"
                );
            }
            return Err(ChallengeError::InvalidSignature);
        }

        // Losing the delete race means someone else already redeemed it.
        if !self.nonces.clear_nonce(&parsed.nonce).await? {
            tracing::info!(nonce = %parsed.nonce, "challenge nonce already consumed");
            return Err(ChallengeError::InvalidNonce);
        }

        let identity = ExtractedIdentity::from(&parsed);
        tracing::info!(
            nonce = %parsed.nonce,
            chain_id = identity.chain_id,
            address = %identity.signer_address,
            "challenge verified"
        );
        Ok(identity)
    }

    /// Read the identity out of a challenge without verifying anything.
    pub fn get_challenge_info(&self, message: &str) -> Result<ExtractedIdentity, ChallengeError> {
        parse_message(message).map(|parsed| ExtractedIdentity::from(&parsed))
    }
}

fn parse_message(message: &str) -> Result<Message, ChallengeError> {
    parse_canonical(message).map_err(|e| {
        tracing::debug!(error = %e, "unparseable challenge");
        ChallengeError::InvalidMessageFormat
    })
}

/// `0x` + 40 hex digits, any casing.
fn parse_address(address: &str) -> Result<Address, ChallengeError> {
    let hex = address
        .strip_prefix("0x")
        .ok_or(ChallengeError::InvalidMessageFormat)?;
    if hex.len() != 40 {
        return Err(ChallengeError::InvalidMessageFormat);
    }
    Address::from_str(address).map_err(|_| ChallengeError::InvalidMessageFormat)
}
