//! Per-account participant state.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, MixId};

/// Progress of one participant through the protocol.
///
/// Transitions are forward-only and single-path:
/// `Registered → Processed → Verified`, or
/// `Registered/Processed → Cancelled` on the blame path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantState {
    /// Registered, escrow reserved, waiting for its relay turn.
    Registered,
    /// Relay submission accepted.
    Processed,
    /// Confirmed the final relay output. Terminal.
    Verified,
    /// Submitted (or was swept into) a cancellation. Terminal.
    Cancelled,
}

impl ParticipantState {
    /// Whether the participant machine permits moving from `self` to `next`.
    pub fn can_advance_to(self, next: ParticipantState) -> bool {
        use ParticipantState::*;
        matches!(
            (self, next),
            (Registered, Processed) | (Registered, Cancelled) | (Processed, Verified) | (Processed, Cancelled)
        )
    }

    /// Whether no further state change is permitted.
    pub fn is_terminal(self) -> bool {
        matches!(self, ParticipantState::Verified | ParticipantState::Cancelled)
    }
}

/// One account's slot in a mix.
///
/// Created at registration; the index is assigned in arrival order and
/// never changes. Neighbour participants are implied by the owning mix's
/// ordering. Terminal once Verified or Cancelled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Owning mix.
    pub mix_id: MixId,
    /// The participant's account.
    pub account: AccountId,
    /// 0-based slot, in registration arrival order.
    pub index: u16,
    /// Current state.
    pub state: ParticipantState,
    /// Hash of the last data/verification/cancellation submission this
    /// participant made; the relay-continuity and dispute checks compare
    /// against it.
    pub commitment: Option<[u8; 32]>,
}

impl Participant {
    /// Create a freshly registered participant.
    pub fn new(mix_id: MixId, account: AccountId, index: u16) -> Self {
        Self {
            mix_id,
            account,
            index,
            state: ParticipantState::Registered,
            commitment: None,
        }
    }
}
