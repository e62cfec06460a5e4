//! Pluggable human-verification provider.
//!
//! The gate does not care HOW a visitor proves they are human, only THAT
//! a challenge completed with a token. Implementations might include:
//! - A captcha widget whose callback hands back a response token
//! - A console prompt (the CLI)
//! - A fixed token supplied out of band

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token handed back by a successful challenge.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationToken(String);

impl VerificationToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// An empty token does not count as a success. Any other value does.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are bearer secrets for the challenge provider; keep them out of logs.
impl fmt::Debug for VerificationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerificationToken(<{} bytes>)", self.0.len())
    }
}

/// A human-verification challenge.
#[async_trait]
pub trait HumanVerifier: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Present the challenge. `Some(token)` on success; `None` when the
    /// visitor failed, dismissed it, or it expired.
    async fn challenge(&self) -> Option<VerificationToken>;
}
