//! Mix event types: the five protocol operations and their envelope.
//!
//! Signatures, fees, and wire parsing belong to the host's transaction
//! envelope; a [`Submission`] carries only what the state machine needs —
//! the already-authenticated sender and the event payload. Its
//! deterministic hash doubles as the participant's protocol commitment.

use serde::{Deserialize, Serialize};

use crate::crypto::sha256;
use crate::serialization::serialize;
use crate::types::{AccountId, Holding, MixId};

/// The five event kinds driving a mix through its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MixEvent {
    /// Open a new mix. The sender becomes the issuer and escrows one
    /// amount (plus deposit for non-native holdings) as collateral.
    Create {
        /// Asset class to shuffle.
        holding: Holding,
        /// Amount each participant contributes.
        amount: u64,
        /// Required number of participants.
        participant_count: u16,
        /// Height after which incomplete registration is swept cancelled.
        cancellation_height: u64,
    },

    /// Take a participant slot and escrow one amount.
    Register {
        /// Mix to join.
        mix_id: MixId,
    },

    /// Relay the growing encrypted data set; one submission per index, in
    /// index order.
    Relay {
        /// Mix being processed.
        mix_id: MixId,
        /// Commitment of the participant at index-1; None when the sender
        /// is index 0 and seeds the relay.
        previous_hash: Option<[u8; 32]>,
        /// Opaque ciphertexts, one layer added per hop; exactly index+1
        /// entries of at least 32 bytes each.
        data: Vec<Vec<u8>>,
    },

    /// Confirm agreement with the final relay output.
    Verify {
        /// Mix being verified.
        mix_id: MixId,
        /// Commitment stored by the last-index participant's relay.
        final_hash: [u8; 32],
    },

    /// Dispute the mix and reveal key seeds for the blame round.
    Cancel {
        /// Mix being cancelled.
        mix_id: MixId,
        /// The account believed to have initiated cancellation; None when
        /// the sender is initiating it. Must match the pinned canceller
        /// once one exists.
        cancelling_account: Option<AccountId>,
        /// The sender's own stored commitment, naming the submission under
        /// dispute. None for a participant that never relayed.
        commitment: Option<[u8; 32]>,
        /// Either empty (opt out of revealing) or one 32-byte seed per
        /// participant strictly after the sender in relay order.
        key_seeds: Vec<Vec<u8>>,
    },
}

impl MixEvent {
    /// Discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            MixEvent::Create { .. } => EventKind::Create,
            MixEvent::Register { .. } => EventKind::Register,
            MixEvent::Relay { .. } => EventKind::Relay,
            MixEvent::Verify { .. } => EventKind::Verify,
            MixEvent::Cancel { .. } => EventKind::Cancel,
        }
    }

    /// Human-readable name for logging and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            MixEvent::Create { .. } => "mix_create",
            MixEvent::Register { .. } => "mix_register",
            MixEvent::Relay { .. } => "mix_relay",
            MixEvent::Verify { .. } => "mix_verify",
            MixEvent::Cancel { .. } => "mix_cancel",
        }
    }

    /// The mix this event addresses; None for Create, which derives a
    /// fresh id from its submission hash.
    pub fn mix_id(&self) -> Option<MixId> {
        match self {
            MixEvent::Create { .. } => None,
            MixEvent::Register { mix_id }
            | MixEvent::Relay { mix_id, .. }
            | MixEvent::Verify { mix_id, .. }
            | MixEvent::Cancel { mix_id, .. } => Some(*mix_id),
        }
    }
}

/// Kind discriminant, used for duplicate bookkeeping and dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Mix creation.
    Create,
    /// Participant registration.
    Register,
    /// Relay submission.
    Relay,
    /// Verification.
    Verify,
    /// Cancellation.
    Cancel,
}

/// An authenticated event as handed over by the host's dispatch layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Account that signed the enclosing transaction.
    pub sender: AccountId,
    /// Event payload.
    pub event: MixEvent,
}

impl Submission {
    /// Wrap an event with its sender.
    pub fn new(sender: AccountId, event: MixEvent) -> Self {
        Self { sender, event }
    }

    /// Deterministic hash of the full submission; stored as the sender's
    /// protocol commitment.
    pub fn full_hash(&self) -> [u8; 32] {
        let bytes = serialize(self).expect("submission serialization should not fail");
        sha256(&bytes)
    }

    /// First 20 bytes of the hash; a Create submission's derived mix id.
    pub fn derived_id(&self) -> [u8; 20] {
        let hash = self.full_hash();
        let mut id = [0u8; 20];
        id.copy_from_slice(&hash[..20]);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_event() -> MixEvent {
        MixEvent::Create {
            holding: Holding::Coin,
            amount: 100,
            participant_count: 3,
            cancellation_height: 500,
        }
    }

    #[test]
    fn test_event_names() {
        assert_eq!(create_event().name(), "mix_create");
        assert_eq!(MixEvent::Register { mix_id: [1u8; 20] }.name(), "mix_register");
        assert_eq!(
            MixEvent::Verify { mix_id: [1u8; 20], final_hash: [0u8; 32] }.kind(),
            EventKind::Verify
        );
    }

    #[test]
    fn test_mix_id_accessor() {
        assert_eq!(create_event().mix_id(), None);
        let id = [7u8; 20];
        assert_eq!(MixEvent::Register { mix_id: id }.mix_id(), Some(id));
    }

    #[test]
    fn test_submission_hash_deterministic() {
        let a = Submission::new([1u8; 20], create_event());
        let b = Submission::new([1u8; 20], create_event());
        assert_eq!(a.full_hash(), b.full_hash());
    }

    #[test]
    fn test_submission_hash_binds_sender() {
        let a = Submission::new([1u8; 20], create_event());
        let b = Submission::new([2u8; 20], create_event());
        assert_ne!(a.full_hash(), b.full_hash());
        assert_ne!(a.derived_id(), b.derived_id());
    }

    #[test]
    fn test_event_serialization_roundtrip() {
        let event = MixEvent::Cancel {
            mix_id: [5u8; 20],
            cancelling_account: Some([6u8; 20]),
            commitment: Some([7u8; 32]),
            key_seeds: vec![vec![8u8; 32], vec![9u8; 32]],
        };
        let bytes = crate::serialization::serialize(&event).unwrap();
        let recovered: MixEvent = crate::serialization::deserialize(&bytes).unwrap();
        assert_eq!(event, recovered);
    }
}
