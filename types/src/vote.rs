//! A cast vote.

use crate::{NetworkAddress, Timestamp, VisitorIdentity, VoteOption};
use serde::{Deserialize, Serialize};

/// An immutable vote, created once by a successful submission and never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub option: VoteOption,
    pub identity_token: VisitorIdentity,
    /// Address at the time of casting; may be unknown.
    pub network_address: NetworkAddress,
    pub cast_at: Timestamp,
}
