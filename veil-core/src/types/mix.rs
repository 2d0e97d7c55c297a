//! The mix session and its stage machine.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Holding, MixId};

/// Session-level stage of a mix.
///
/// The happy path is `Registration → Processing → Verification → Done`.
/// Any non-terminal stage may divert to `Blame`, which resolves to
/// `Cancelled` once every participant has been accounted for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Collecting participants.
    Registration,
    /// Participants relay encrypted data in index order.
    Processing,
    /// Participants confirm the final relay output.
    Verification,
    /// A participant disputed the session; cancellations are collected.
    Blame,
    /// Mix completed, holdings paid out to the shuffled recipients.
    Done,
    /// Mix cancelled, escrow refunded to original owners.
    Cancelled,
}

impl Stage {
    /// Whether the stage machine permits moving from `self` to `next`.
    ///
    /// Repeat edges (`Registration → Registration` for additional
    /// registrations, and likewise for Processing and Verification) are
    /// part of the table. Done and Cancelled are terminal.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Registration, Registration)
                | (Registration, Processing)
                | (Registration, Blame)
                | (Processing, Processing)
                | (Processing, Verification)
                | (Processing, Blame)
                | (Verification, Verification)
                | (Verification, Done)
                | (Verification, Blame)
                | (Blame, Cancelled)
        )
    }

    /// Whether no further stage change is permitted.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Cancelled)
    }
}

/// One mixing session.
///
/// Created once by a creation event, mutated only by later events carrying
/// the same id, terminal (Done or Cancelled) exactly once. Holding and
/// amount are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mix {
    /// Identifier, derived from the creation submission hash.
    pub id: MixId,
    /// Account that created the mix and escrowed the initial collateral.
    pub issuer: AccountId,
    /// Asset class being shuffled.
    pub holding: Holding,
    /// Amount each participant puts in and each recipient takes out.
    pub amount: u64,
    /// Number of participant slots; the mix starts once all are filled.
    pub participant_count: u16,
    /// Height after which an incomplete registration is swept cancelled.
    pub cancellation_height: u64,
    /// Current stage.
    pub stage: Stage,
    /// Index of the participant expected to submit the next relay.
    pub assignee_index: u16,
    /// First account to submit a cancellation; later cancellations from a
    /// different claimed canceller are rejected.
    pub canceller: Option<AccountId>,
    /// Participant accounts in registration (index) order.
    pub participants: Vec<AccountId>,
    /// Recipient accounts in the final relay's output order. Populated when
    /// the last relay is applied; deliberately decoupled from participant
    /// index order.
    pub recipients: Vec<AccountId>,
}

impl Mix {
    /// Create a fresh mix in the Registration stage.
    pub fn new(
        id: MixId,
        issuer: AccountId,
        holding: Holding,
        amount: u64,
        participant_count: u16,
        cancellation_height: u64,
    ) -> Self {
        Self {
            id,
            issuer,
            holding,
            amount,
            participant_count,
            cancellation_height,
            stage: Stage::Registration,
            assignee_index: 0,
            canceller: None,
            participants: Vec::with_capacity(participant_count as usize),
            recipients: Vec::new(),
        }
    }

    /// Whether all participant slots are taken.
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.participant_count as usize
    }

    /// Index of the given account, if registered.
    pub fn index_of(&self, account: &AccountId) -> Option<u16> {
        self.participants.iter().position(|a| a == account).map(|i| i as u16)
    }

    /// Account occupying the given index, if any.
    pub fn account_at(&self, index: u16) -> Option<AccountId> {
        self.participants.get(index as usize).copied()
    }

    /// Index of the last relay slot.
    pub fn last_index(&self) -> u16 {
        self.participant_count - 1
    }

    /// Move to `next` if the stage table allows it; returns whether the
    /// edge was taken.
    pub fn advance(&mut self, next: Stage) -> bool {
        if self.stage.can_advance_to(next) {
            self.stage = next;
            true
        } else {
            false
        }
    }
}
