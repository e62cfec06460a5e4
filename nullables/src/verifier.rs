//! Nullable human verifier — scripted challenge outcomes.

use async_trait::async_trait;
use ballot_gate::{HumanVerifier, VerificationToken};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A verifier that returns pre-configured outcomes in order, then repeats a
/// fallback outcome. Counts how often the challenge was shown.
pub struct NullVerifier {
    scripted: Mutex<VecDeque<Option<VerificationToken>>>,
    fallback: Option<VerificationToken>,
    challenges: AtomicUsize,
}

impl NullVerifier {
    /// Every challenge succeeds with the same token.
    pub fn passing() -> Self {
        Self::with_outcomes(Vec::new(), Some(VerificationToken::new("null-verification-token")))
    }

    /// Every challenge fails or expires.
    pub fn failing() -> Self {
        Self::with_outcomes(Vec::new(), None)
    }

    /// Return `outcomes` in order, then `fallback` forever.
    pub fn with_outcomes(
        outcomes: Vec<Option<VerificationToken>>,
        fallback: Option<VerificationToken>,
    ) -> Self {
        Self {
            scripted: Mutex::new(outcomes.into()),
            fallback,
            challenges: AtomicUsize::new(0),
        }
    }

    /// Number of times the challenge was presented.
    pub fn challenge_count(&self) -> usize {
        self.challenges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HumanVerifier for NullVerifier {
    fn name(&self) -> &str {
        "null-verifier"
    }

    async fn challenge(&self) -> Option<VerificationToken> {
        self.challenges.fetch_add(1, Ordering::SeqCst);
        let scripted = self.scripted.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}
