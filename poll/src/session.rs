//! One visitor's session against the poll.

use std::sync::{Arc, Mutex, MutexGuard};

use ballot_events::{EventSink, PollEvent};
use ballot_gate::{GateError, GateState, HumanVerifier, IntentOutcome, SubmissionTicket, VoteGate};
use ballot_identity::{IdentityResolver, ResolvedIdentity};
use ballot_store::{DuplicatePolicy, VoteLedger};
use ballot_tally::{TallyAggregator, VoteTally};
use ballot_types::{Clock, NetworkAddress, Vote, VoteOption};

/// External collaborators a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub ledger: Arc<dyn VoteLedger>,
    pub verifier: Arc<dyn HumanVerifier>,
    pub events: Arc<dyn EventSink>,
    pub clock: Arc<dyn Clock>,
}

/// Result of a vote attempt that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum CastOutcome {
    /// The vote was appended. The tally is `None` if the refresh read failed;
    /// the vote itself is safely recorded either way.
    Recorded { vote: Vote, tally: Option<VoteTally> },
    /// Another submission from this session is still in flight.
    InFlight,
}

pub struct PollSession {
    identity: ResolvedIdentity,
    address: NetworkAddress,
    policy: DuplicatePolicy,
    collaborators: Collaborators,
    gate: Mutex<VoteGate>,
    aggregator: TallyAggregator,
}

impl PollSession {
    /// Resolve identity and address, check for a prior vote and seed the
    /// gate.
    ///
    /// Fails with [`GateError::InitialCheckUnavailable`] if the ledger cannot
    /// be queried. No gate exists until the check resolves; the caller may
    /// open again later.
    pub async fn open(
        resolver: &IdentityResolver,
        policy: DuplicatePolicy,
        collaborators: Collaborators,
    ) -> Result<Self, GateError> {
        let (identity, address) = tokio::join!(
            resolver.resolve_identity(),
            resolver.resolve_network_address()
        );
        collaborators.events.record(PollEvent::PageView);

        let prior = collaborators
            .ledger
            .has_vote_for(&identity.token, &address)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "prior-vote check failed, poll unavailable");
                GateError::InitialCheckUnavailable(e.to_string())
            })?;
        let gate = VoteGate::new(prior.matches(&policy));
        tracing::info!(
            identity = %identity.token,
            persistence = ?identity.persistence,
            address = %address,
            state = %gate.state(),
            "poll session opened"
        );

        Ok(Self {
            identity,
            address,
            policy,
            collaborators,
            gate: Mutex::new(gate),
            aggregator: TallyAggregator::new(),
        })
    }

    pub fn identity(&self) -> &ResolvedIdentity {
        &self.identity
    }

    pub fn address(&self) -> &NetworkAddress {
        &self.address
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Snapshot of the gate state.
    pub fn state(&self) -> GateState {
        self.lock_gate().state().clone()
    }

    /// Cast a vote for `option`.
    ///
    /// Presents the verification challenge when the gate needs it, then
    /// re-checks for duplicates and appends. A failed challenge returns
    /// [`GateError::VerificationIncomplete`] and the next call re-prompts. A
    /// storage failure returns [`GateError::TransientStorage`] and leaves the
    /// gate verified, so the next call goes straight to submission.
    pub async fn cast(&self, option: VoteOption) -> Result<CastOutcome, GateError> {
        loop {
            let outcome = self.lock_gate().intent(option);
            match outcome {
                Ok(IntentOutcome::AwaitVerification) | Err(GateError::VerificationIncomplete) => {
                    self.verify().await?;
                }
                Ok(IntentOutcome::Submit(ticket)) => return self.submit(ticket).await,
                Ok(IntentOutcome::InFlight) => return Ok(CastOutcome::InFlight),
                Err(e) => {
                    tracing::info!(option = %option, error = %e, "vote rejected");
                    return Err(e);
                }
            }
        }
    }

    /// Recompute the tally from the ledger.
    pub async fn tally(&self) -> Result<VoteTally, GateError> {
        Ok(self.aggregator.refresh(self.collaborators.ledger.as_ref()).await?)
    }

    async fn verify(&self) -> Result<(), GateError> {
        let verifier = &self.collaborators.verifier;
        tracing::debug!(verifier = verifier.name(), "presenting verification challenge");
        let token = verifier.challenge().await;
        let result = self.lock_gate().verification_completed(token);
        if result.is_err() {
            tracing::info!(verifier = verifier.name(), "verification challenge not passed");
        }
        result
    }

    async fn submit(&self, ticket: SubmissionTicket) -> Result<CastOutcome, GateError> {
        let ledger = &self.collaborators.ledger;

        match ledger.has_vote_for(&self.identity.token, &self.address).await {
            Ok(prior) if prior.matches(&self.policy) => {
                tracing::info!(identity = %self.identity.token, "prior vote found on re-check");
                self.lock_gate().duplicate_detected();
                return Err(GateError::DuplicateVote);
            }
            Ok(_) => {}
            Err(e) => return Err(self.fail_submission(&ticket, e.into())),
        }

        let vote = Vote {
            option: ticket.option,
            identity_token: self.identity.token.clone(),
            network_address: self.address.clone(),
            cast_at: self.collaborators.clock.now(),
        };
        if let Err(e) = ledger.append(&vote).await {
            return Err(self.fail_submission(&ticket, e.into()));
        }

        if !self.lock_gate().submission_succeeded(&ticket, vote.clone()) {
            tracing::warn!(identity = %vote.identity_token, "vote appended after the gate moved on");
        }
        tracing::info!(option = %vote.option, identity = %vote.identity_token, "vote recorded");
        self.collaborators
            .events
            .record(PollEvent::VoteSubmitted { option: vote.option });

        let tally = match self.aggregator.refresh(ledger.as_ref()).await {
            Ok(tally) => Some(tally),
            Err(e) => {
                tracing::warn!(error = %e, "tally refresh failed after vote");
                None
            }
        };
        Ok(CastOutcome::Recorded { vote, tally })
    }

    fn fail_submission(&self, ticket: &SubmissionTicket, error: GateError) -> GateError {
        tracing::warn!(option = %ticket.option, error = %error, "vote submission failed");
        self.lock_gate().submission_failed(ticket);
        self.collaborators.events.record(PollEvent::VoteError {
            message: error.to_string(),
        });
        error
    }

    fn lock_gate(&self) -> MutexGuard<'_, VoteGate> {
        self.gate.lock().unwrap_or_else(|e| e.into_inner())
    }
}
