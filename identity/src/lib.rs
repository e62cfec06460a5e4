//! Visitor identity resolution.
//!
//! A visitor is identified by two signals:
//! 1. **Identity token**: a random token persisted on the visitor's device,
//!    created on first resolution and never regenerated while it exists.
//! 2. **Network address**: the external IP address, looked up once per
//!    session. Best-effort only; a failed lookup yields an unknown address.
//!
//! The token is authoritative once established; the address is a secondary
//! duplicate-vote signal.

pub mod error;
pub mod lookup;
pub mod resolver;
pub mod token;

pub use error::IdentityError;
pub use lookup::{AddressLookup, HttpAddressLookup};
pub use resolver::{IdentityPersistence, IdentityResolver, ResolvedIdentity};
pub use token::{generate_token, FileTokenStorage, TokenStorage};
