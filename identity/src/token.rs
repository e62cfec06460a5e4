//! Identity token generation and local persistence.

use crate::IdentityError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Bytes of OS randomness per token (hex encoded to 32 characters).
const TOKEN_BYTES: usize = 16;

/// Generate a new globally unique identity token from the OS CSPRNG.
pub fn generate_token() -> Result<String, IdentityError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| IdentityError::Random(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Local persistence holding a single key: the visitor's identity token.
///
/// Only [`crate::IdentityResolver`] writes through this trait.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// The persisted token, or `None` if none has been stored.
    async fn load(&self) -> Result<Option<String>, IdentityError>;

    /// Persist the token, replacing any previous value.
    async fn store(&self, token: &str) -> Result<(), IdentityError>;
}

/// Token persisted as the sole content of a file.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> Result<Option<String>, IdentityError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(IdentityError::Persistence(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn store(&self, token: &str) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                IdentityError::Persistence(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(&self.path, token).await.map_err(|e| {
            IdentityError::Persistence(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}
