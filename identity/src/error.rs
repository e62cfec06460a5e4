use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Local persistence could not be read or written.
    #[error("identity persistence unavailable: {0}")]
    Persistence(String),

    /// The address lookup failed or timed out. Never shown to the visitor.
    #[error("network address unknown: {0}")]
    UnknownAddress(String),

    #[error("random source unavailable: {0}")]
    Random(String),
}
