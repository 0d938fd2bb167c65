use figment::providers::Env;
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::config::{TOKENS_ENV, TOKENS_FILE_ENV};

/// Set of shared tokens accepted by the auth gate.
///
/// Built once at startup and never mutated afterwards; clones share the same
/// set. An empty store disables authentication entirely.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Arc<HashSet<String>>,
}

impl TokenStore {
    /// Load tokens from `KEYJOURNAL_TOKENS_FILE`, falling back to
    /// `KEYJOURNAL_TOKENS` when the file variable is unset or unreadable.
    pub fn load() -> Self {
        let raw = read_source(
            Env::var(TOKENS_FILE_ENV).as_deref(),
            Env::var(TOKENS_ENV).as_deref(),
        );
        let store = Self::parse(&raw);
        info!(count = store.len(), "auth tokens loaded");
        store
    }

    /// Split on commas and whitespace, dropping empties and duplicates.
    pub fn parse(raw: &str) -> Self {
        let tokens = raw
            .split([',', '\n', '\r', '\t', ' '])
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            tokens: Arc::new(tokens),
        }
    }

    pub fn allowed(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        self.tokens
            .iter()
            .any(|t| bool::from(t.as_bytes().ct_eq(token.as_bytes())))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

/// Resolve the raw token source. A readable file wins over the inline value.
pub fn read_source(file_path: Option<&str>, inline: Option<&str>) -> String {
    if let Some(path) = file_path.map(str::trim).filter(|p| !p.is_empty()) {
        match fs::read_to_string(path) {
            Ok(contents) => return contents.trim().to_string(),
            Err(e) => {
                warn!(path = %path, error = %e, "failed to read tokens file; using inline tokens");
            }
        }
    }
    inline.unwrap_or_default().to_string()
}
