// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{TokenError, TokenIssuer};
use crate::cache::KeyValueCache;
use crate::config::Settings;
use crate::siwe::{ChallengeService, NonceStore};

/// Shared handles for request handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn KeyValueCache>,
    pub challenges: ChallengeService,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(cache: Arc<dyn KeyValueCache>, challenges: ChallengeService, tokens: TokenIssuer) -> Self {
        Self {
            cache,
            challenges,
            tokens: Arc::new(tokens),
        }
    }

    /// Wire the services over an already connected `cache`.
    pub fn from_settings(
        settings: &Settings,
        cache: Arc<dyn KeyValueCache>,
    ) -> Result<Self, TokenError> {
        let tokens = TokenIssuer::new(&settings.jwt)?;
        let nonces = NonceStore::new(cache.clone(), settings.nonce_ttl);
        let challenges = ChallengeService::new(nonces, settings.default_statement.clone());
        Ok(Self::new(cache, challenges, tokens))
    }
}
