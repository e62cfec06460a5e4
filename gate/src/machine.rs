//! The vote gate state machine.
//!
//! ```text
//!   Idle ──intent──▶ AwaitingVerification ──token──▶ Verified ──intent──▶ Submitting
//!                                                      ▲                    │   │   │
//!                                                      └──append/check fail─┘   │   │
//!                                              Completed ◀──append ok───────────┘   │
//!                                              Blocked   ◀──duplicate found─────────┘
//! ```
//!
//! Any non-terminal state moves to `Blocked` when a duplicate is detected.

use crate::{GateError, GateState, SubmissionTicket, VerificationToken};
use ballot_types::{Vote, VoteOption};

/// What the caller must do after a vote intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntentOutcome {
    /// Present the verification challenge.
    AwaitVerification,
    /// Re-check duplicates, then append. Report the result with the ticket.
    Submit(SubmissionTicket),
    /// A submission is already in flight; the intent was ignored.
    InFlight,
}

#[derive(Debug)]
pub struct VoteGate {
    state: GateState,
    next_ticket: u64,
}

impl VoteGate {
    /// Initial state: `Blocked` if a prior vote was detected, else `Idle`.
    pub fn new(prior_vote: bool) -> Self {
        let state = if prior_vote {
            GateState::Blocked
        } else {
            GateState::Idle
        };
        tracing::debug!(state = %state, "vote gate initialized");
        Self {
            state,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// The visitor picked `option` and asked to vote.
    pub fn intent(&mut self, option: VoteOption) -> Result<IntentOutcome, GateError> {
        match &self.state {
            GateState::Idle => {
                self.transition(GateState::AwaitingVerification { option });
                Ok(IntentOutcome::AwaitVerification)
            }
            GateState::AwaitingVerification { .. } => {
                self.state = GateState::AwaitingVerification { option };
                Err(GateError::VerificationIncomplete)
            }
            GateState::Verified { token, .. } => {
                let ticket = SubmissionTicket {
                    id: self.next_ticket,
                    option,
                    token: token.clone(),
                };
                self.next_ticket += 1;
                self.transition(GateState::Submitting {
                    ticket: ticket.clone(),
                });
                Ok(IntentOutcome::Submit(ticket))
            }
            GateState::Submitting { ticket } => {
                tracing::debug!(ticket = ticket.id, "vote intent ignored, submission in flight");
                Ok(IntentOutcome::InFlight)
            }
            GateState::Completed { .. } | GateState::Blocked => Err(GateError::DuplicateVote),
        }
    }

    /// The verification challenge finished. `None` means it failed or expired.
    ///
    /// Outside `AwaitingVerification` the result is stale and ignored.
    pub fn verification_completed(
        &mut self,
        token: Option<VerificationToken>,
    ) -> Result<(), GateError> {
        let GateState::AwaitingVerification { option } = &self.state else {
            tracing::debug!(state = %self.state, "late verification result ignored");
            return Ok(());
        };
        match token {
            Some(token) if !token.is_empty() => {
                let option = *option;
                self.transition(GateState::Verified { option, token });
                Ok(())
            }
            _ => Err(GateError::VerificationIncomplete),
        }
    }

    /// The append for `ticket` landed. Returns `false` if the completion was
    /// stale (another ticket, or the gate already left `Submitting`).
    pub fn submission_succeeded(&mut self, ticket: &SubmissionTicket, vote: Vote) -> bool {
        if !self.holds(ticket) {
            tracing::debug!(ticket = ticket.id, "stale submission success ignored");
            return false;
        }
        self.transition(GateState::Completed { vote });
        true
    }

    /// The duplicate re-check or the append for `ticket` failed transiently.
    /// Returns to `Verified` with the same token so the visitor can retry
    /// without a new challenge.
    pub fn submission_failed(&mut self, ticket: &SubmissionTicket) -> bool {
        if !self.holds(ticket) {
            tracing::debug!(ticket = ticket.id, "stale submission failure ignored");
            return false;
        }
        self.transition(GateState::Verified {
            option: ticket.option,
            token: ticket.token.clone(),
        });
        true
    }

    /// A vote for this visitor is already on record.
    ///
    /// A `Completed` gate stays completed: the record found is its own.
    pub fn duplicate_detected(&mut self) {
        match self.state {
            GateState::Completed { .. } | GateState::Blocked => {}
            _ => self.transition(GateState::Blocked),
        }
    }

    fn holds(&self, ticket: &SubmissionTicket) -> bool {
        matches!(&self.state, GateState::Submitting { ticket: current } if current.id == ticket.id)
    }

    fn transition(&mut self, next: GateState) {
        tracing::debug!(from = %self.state, to = %next, "vote gate transition");
        self.state = next;
    }
}
