// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Issues the session tokens handed out after a successful SIWE sign-in and
//! verifies them on protected endpoints.
//!
//! ## Token Flow
//!
//! 1. The client completes the SIWE challenge
//! 2. The server mints a JWT whose subject is the CAIP-10 account id
//!    (`eip155:<chain_id>:<address>`)
//! 3. Downstream calls send `Authorization: Bearer <JWT>`
//! 4. The `Auth` extractor verifies signature, expiry, issuer and audience
//!
//! ## Security
//!
//! - Tokens are signed with an asymmetric key (RSA, ECDSA or EdDSA)
//! - Verification requires the configured public key
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod issuer;

pub use claims::{AuthenticatedSubject, Claims};
pub use error::AuthError;
pub use extractor::Auth;
pub use issuer::{TokenError, TokenIssuer};
