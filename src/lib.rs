// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SIWE Auth Server - Sign-In with Ethereum authentication service
//!
//! Issues EIP-4361 challenges bound to single-use nonces, verifies signed
//! challenges by recovering the EIP-191 signer, and mints JWTs for the
//! verified account.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - JWT issuance and bearer-token verification
//! - `cache` - Nonce cache backends (in-process LRU, Redis)
//! - `siwe` - EIP-4361 messages, nonces and signature recovery

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod siwe;
pub mod state;
