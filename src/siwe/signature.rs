// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-191 personal-sign signatures.
//!
//! Wallets return `0x`-prefixed hex of the 65-byte `r || s || v` signature,
//! where `v` is 27/28 or 0/1. Recovery itself happens in
//! [`siwe::Message::verify`].

/// `r || s || v`
pub const SIGNATURE_LENGTH: usize = 65;

/// Errors raised while decoding a signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature must start with 0x")]
    MissingPrefix,

    #[error("signature must be {expected} hex-encoded bytes, got {actual} characters")]
    Length { expected: usize, actual: usize },

    #[error("signature is not valid hex: {0}")]
    Hex(#[from] alloy::hex::FromHexError),
}

/// Decode `0x` + 130 hex characters into raw signature bytes.
pub fn decode_signature(signature: &str) -> Result<[u8; SIGNATURE_LENGTH], SignatureError> {
    let hex = signature
        .strip_prefix("0x")
        .ok_or(SignatureError::MissingPrefix)?;
    if hex.len() != SIGNATURE_LENGTH * 2 {
        return Err(SignatureError::Length {
            expected: SIGNATURE_LENGTH,
            actual: hex.len(),
        });
    }

    let mut bytes = [0u8; SIGNATURE_LENGTH];
    alloy::hex::decode_to_slice(hex, &mut bytes)?;
    Ok(bytes)
}
