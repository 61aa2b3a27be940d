// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Sign-In with Ethereum
//!
//! EIP-4361 challenge flow:
//!
//! 1. A nonce is issued and cached with a TTL ([`nonce`])
//! 2. The nonce is embedded in a canonical challenge text ([`message`])
//! 3. The wallet signs the text off-system (EIP-191 personal sign)
//! 4. The signed text is parsed, the nonce checked, the signature
//!    ([`signature`]) verified and the nonce consumed ([`challenge`])

pub mod challenge;
pub mod message;
pub mod nonce;
pub mod signature;

pub use challenge::{ChallengeError, ChallengeService, ExtractedIdentity};
pub use nonce::NonceStore;
