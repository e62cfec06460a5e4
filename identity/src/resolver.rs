//! Identity resolver — owns the persisted identity token.

use crate::token::generate_token;
use crate::{AddressLookup, IdentityError, TokenStorage};
use ballot_types::{NetworkAddress, VisitorIdentity};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Whether the resolved identity will survive a reload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityPersistence {
    /// The token is stored locally and will be returned on the next run.
    Durable,
    /// Local persistence failed; the token only lives for this process, so
    /// duplicate detection degrades to the current session.
    SessionOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub token: VisitorIdentity,
    pub persistence: IdentityPersistence,
}

/// Derives the visitor's identity from the persisted token and looks up the
/// network address.
///
/// The first resolution creates and persists a token if none exists; later
/// calls return the cached result without touching storage.
pub struct IdentityResolver {
    storage: Arc<dyn TokenStorage>,
    lookup: Arc<dyn AddressLookup>,
    resolved: OnceCell<ResolvedIdentity>,
}

impl IdentityResolver {
    pub fn new(storage: Arc<dyn TokenStorage>, lookup: Arc<dyn AddressLookup>) -> Self {
        Self {
            storage,
            lookup,
            resolved: OnceCell::new(),
        }
    }

    /// Return the visitor's identity, creating and persisting it on first use.
    ///
    /// Never fails: if persistence is unavailable the token is kept in memory
    /// and flagged [`IdentityPersistence::SessionOnly`]. Concurrent first
    /// calls share one resolution.
    pub async fn resolve_identity(&self) -> ResolvedIdentity {
        self.resolved
            .get_or_init(|| self.load_or_create())
            .await
            .clone()
    }

    async fn load_or_create(&self) -> ResolvedIdentity {
        let storage_ok = match self.storage.load().await {
            Ok(Some(raw)) => match VisitorIdentity::new(raw) {
                Ok(token) => {
                    tracing::debug!(identity = %token, "loaded persisted identity token");
                    return ResolvedIdentity {
                        token,
                        persistence: IdentityPersistence::Durable,
                    };
                }
                Err(_) => true,
            },
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(error = %e, "identity storage unreadable, identity is session-only");
                false
            }
        };

        let token = fresh_identity();
        let persistence = if storage_ok {
            match self.storage.store(token.as_str()).await {
                Ok(()) => {
                    tracing::info!(identity = %token, "issued new identity token");
                    IdentityPersistence::Durable
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to persist identity, identity is session-only");
                    IdentityPersistence::SessionOnly
                }
            }
        } else {
            IdentityPersistence::SessionOnly
        };
        ResolvedIdentity { token, persistence }
    }

    /// Look up the visitor's network address.
    ///
    /// Any failure yields [`NetworkAddress::unknown`]; address-based duplicate
    /// detection then silently does nothing for this session.
    pub async fn resolve_network_address(&self) -> NetworkAddress {
        match self.lookup.lookup().await {
            Ok(address) => {
                tracing::debug!(address = %address, "resolved network address");
                address
            }
            Err(e) => {
                tracing::warn!(error = %e, "address lookup failed, continuing with unknown address");
                NetworkAddress::unknown()
            }
        }
    }
}

/// A new random identity. Falls back to a time-derived token if the OS random
/// source is unavailable, which keeps the resolver infallible.
fn fresh_identity() -> VisitorIdentity {
    let raw = generate_token().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "OS random source failed, using time-derived token");
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        format!("{nanos:032x}")
    });
    // Both branches produce non-empty strings.
    VisitorIdentity::new(raw).unwrap_or_else(|_| unreachable!("generated token is never empty"))
}
