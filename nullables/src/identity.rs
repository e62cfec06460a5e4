//! Nullable identity collaborators — in-memory token storage and a scripted
//! address lookup.

use async_trait::async_trait;
use ballot_identity::{AddressLookup, IdentityError, TokenStorage};
use ballot_types::NetworkAddress;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory stand-in for the visitor's local storage.
///
/// Share one instance between resolvers to simulate a page reload on the
/// same device.
#[derive(Default)]
pub struct NullTokenStorage {
    token: Mutex<Option<String>>,
    unavailable: AtomicBool,
    writes: AtomicUsize,
}

impl NullTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        let storage = Self::default();
        *storage.token.lock().unwrap() = Some(token.into());
        storage
    }

    /// Storage where every read and write fails.
    pub fn unavailable() -> Self {
        let storage = Self::default();
        storage.unavailable.store(true, Ordering::SeqCst);
        storage
    }

    /// The currently stored token.
    pub fn stored(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    /// Simulate the visitor clearing site data.
    pub fn clear(&self) {
        self.token.lock().unwrap().take();
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStorage for NullTokenStorage {
    async fn load(&self) -> Result<Option<String>, IdentityError> {
        tokio::task::yield_now().await;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Persistence("null storage unavailable".into()));
        }
        Ok(self.stored())
    }

    async fn store(&self, token: &str) -> Result<(), IdentityError> {
        tokio::task::yield_now().await;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Persistence("null storage unavailable".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }
}

/// An address lookup that returns a configured address, or fails.
pub struct NullAddressLookup {
    address: Mutex<Option<NetworkAddress>>,
    calls: AtomicUsize,
}

impl NullAddressLookup {
    pub fn returning(address: &str) -> Self {
        Self {
            address: Mutex::new(Some(NetworkAddress::new(address))),
            calls: AtomicUsize::new(0),
        }
    }

    /// A lookup that always fails, as if the service timed out.
    pub fn failing() -> Self {
        Self {
            address: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_address(&self, address: Option<&str>) {
        *self.address.lock().unwrap() = address.map(NetworkAddress::new);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressLookup for NullAddressLookup {
    async fn lookup(&self) -> Result<NetworkAddress, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.address
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| IdentityError::UnknownAddress("null lookup failure".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn storage_round_trip_counts_writes() {
        let storage = NullTokenStorage::new();
        assert_eq!(storage.load().await.unwrap(), None);
        storage.store("t").await.unwrap();
        assert_eq!(storage.load().await.unwrap().as_deref(), Some("t"));
        assert_eq!(storage.write_count(), 1);
        storage.clear();
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unavailable_storage_errors() {
        let storage = NullTokenStorage::unavailable();
        assert!(storage.load().await.is_err());
        assert!(storage.store("t").await.is_err());
    }

    #[tokio::test]
    async fn lookup_is_scriptable() {
        let lookup = NullAddressLookup::failing();
        assert!(lookup.lookup().await.is_err());
        lookup.set_address(Some("192.0.2.1"));
        assert_eq!(lookup.lookup().await.unwrap().as_str(), "192.0.2.1");
        assert_eq!(lookup.call_count(), 2);
    }
}
