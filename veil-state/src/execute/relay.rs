//! Relay submissions: the sequential onion-data hand-off.

use tracing::debug;

use veil_core::{AccountId, MixId, ParticipantState, Stage, Submission};

use crate::error::{StateError, StateResult};
use crate::state::{StateReader, StateWriter};

use super::short_id;

/// Minimum length of one opaque ciphertext blob.
pub const MIN_BLOB_LEN: usize = 32;

/// Validate a Relay event.
///
/// # Validation
/// - Mix must be in Processing and the sender its current assignee
/// - Sender's participant state must allow Processed
/// - `previous_hash` must equal the index-1 participant's commitment, and
///   must be absent for index 0, which seeds the relay
/// - Exactly index+1 blobs, each at least 32 bytes; contents are opaque
pub fn validate_relay<S: StateReader>(
    state: &mut S,
    sender: &AccountId,
    mix_id: &MixId,
    previous_hash: &Option<[u8; 32]>,
    data: &[Vec<u8>],
) -> StateResult<()> {
    let mix = state
        .get_mix(mix_id)
        .ok_or(StateError::MixNotFound { mix_id: *mix_id })?
        .clone();

    if mix.stage != Stage::Processing {
        return Err(StateError::WrongStage {
            mix_id: *mix_id,
            stage: mix.stage,
        });
    }

    let participant = state
        .get_participant(mix_id, sender)
        .ok_or(StateError::NotRegistered {
            mix_id: *mix_id,
            account: *sender,
        })?
        .clone();

    if !participant.state.can_advance_to(ParticipantState::Processed) {
        return Err(StateError::InvalidParticipantTransition {
            account: *sender,
            from: participant.state,
            to: ParticipantState::Processed,
        });
    }
    if participant.index != mix.assignee_index {
        return Err(StateError::NotAssignee {
            mix_id: *mix_id,
            account: *sender,
        });
    }

    if participant.index == 0 {
        // Index 0 seeds the relay; there is nothing to chain from.
        if previous_hash.is_some() {
            return Err(StateError::PreviousHashMismatch { mix_id: *mix_id });
        }
    } else {
        let prev_account = mix
            .account_at(participant.index - 1)
            .ok_or(StateError::PreviousHashMismatch { mix_id: *mix_id })?;
        let prev = state
            .get_participant(mix_id, &prev_account)
            .ok_or(StateError::NotRegistered {
                mix_id: *mix_id,
                account: prev_account,
            })?;
        match (prev.commitment, previous_hash) {
            (Some(stored), Some(claimed)) if stored == *claimed => {}
            _ => return Err(StateError::PreviousHashMismatch { mix_id: *mix_id }),
        }
    }

    let expected = participant.index as usize + 1;
    if data.is_empty() || data.len() != expected {
        return Err(StateError::InvalidDataCount {
            provided: data.len(),
            expected,
        });
    }
    for blob in data {
        if blob.len() < MIN_BLOB_LEN {
            return Err(StateError::DataTooShort { length: blob.len() });
        }
    }

    Ok(())
}

/// Apply a validated Relay submission.
///
/// Stores the submission hash as the sender's commitment, marks it
/// Processed, and hands the turn to the next index. The last index
/// instead moves the mix to Verification and captures the output
/// ordering: the first 20 bytes of each final blob name the recipient
/// account (the layering math producing them is external).
pub fn execute_relay<S: StateWriter>(
    state: &mut S,
    submission: &Submission,
    mix_id: &MixId,
    data: &[Vec<u8>],
) -> StateResult<()> {
    let mix = state
        .get_mix(mix_id)
        .ok_or(StateError::MixNotFound { mix_id: *mix_id })?
        .clone();
    let participant = state
        .get_participant(mix_id, &submission.sender)
        .ok_or(StateError::NotRegistered {
            mix_id: *mix_id,
            account: submission.sender,
        })?
        .clone();

    let hash = submission.full_hash();
    state.update_participant(mix_id, &submission.sender, |p| {
        p.state = ParticipantState::Processed;
        p.commitment = Some(hash);
    });

    if participant.index == mix.last_index() {
        let recipients: Vec<AccountId> = data
            .iter()
            .map(|blob| {
                let mut account = [0u8; 20];
                account.copy_from_slice(&blob[..20]);
                account
            })
            .collect();
        state.update_mix(mix_id, |m| {
            m.advance(Stage::Verification);
            m.recipients = recipients;
        });
        debug!(mix = %short_id(mix_id), "relay complete, verification begins");
    } else {
        state.update_mix(mix_id, |m| {
            m.assignee_index = participant.index + 1;
        });
        debug!(
            mix = %short_id(mix_id),
            next_index = participant.index + 1,
            "relay accepted"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::register::execute_register;
    use crate::state::LedgerState;
    use veil_core::{Holding, Mix, MixEvent};

    const MIX: MixId = [1u8; 20];

    fn account(n: u8) -> AccountId {
        [n; 20]
    }

    fn blob(n: u8) -> Vec<u8> {
        let mut b = vec![0u8; 40];
        b[..20].copy_from_slice(&account(n));
        b
    }

    fn relay_submission(sender: AccountId, previous_hash: Option<[u8; 32]>, data: Vec<Vec<u8>>) -> Submission {
        Submission::new(
            sender,
            MixEvent::Relay { mix_id: MIX, previous_hash, data },
        )
    }

    /// Mix in Processing with participants 1..=3 registered.
    fn processing_state() -> LedgerState {
        let mut state = LedgerState::new();
        state.insert_mix(Mix::new(MIX, account(0), Holding::Coin, 100, 3, 500));
        for n in 1..=3 {
            execute_register(&mut state, &account(n), &MIX).unwrap();
        }
        state
    }

    fn relay(state: &mut LedgerState, sender: AccountId, previous_hash: Option<[u8; 32]>, data: Vec<Vec<u8>>) -> StateResult<Submission> {
        let sub = relay_submission(sender, previous_hash, data.clone());
        validate_relay(state, &sender, &MIX, &previous_hash, &data)?;
        execute_relay(state, &sub, &MIX, &data)?;
        Ok(sub)
    }

    #[test]
    fn test_relay_chain_advances_assignee() {
        let mut state = processing_state();

        let first = relay(&mut state, account(1), None, vec![blob(10)]).unwrap();
        assert_eq!(state.get_mix(&MIX).unwrap().assignee_index, 1);

        relay(&mut state, account(2), Some(first.full_hash()), vec![blob(10), blob(11)]).unwrap();
        assert_eq!(state.get_mix(&MIX).unwrap().assignee_index, 2);
    }

    #[test]
    fn test_last_relay_enters_verification_and_captures_recipients() {
        let mut state = processing_state();

        let first = relay(&mut state, account(1), None, vec![blob(10)]).unwrap();
        let second = relay(&mut state, account(2), Some(first.full_hash()), vec![blob(10), blob(11)]).unwrap();
        relay(
            &mut state,
            account(3),
            Some(second.full_hash()),
            vec![blob(10), blob(11), blob(12)],
        )
        .unwrap();

        let mix = state.get_mix(&MIX).unwrap();
        assert_eq!(mix.stage, Stage::Verification);
        assert_eq!(mix.recipients, vec![account(10), account(11), account(12)]);
    }

    #[test]
    fn test_non_assignee_rejected() {
        let mut state = processing_state();
        let err = relay(&mut state, account(2), None, vec![blob(10)]);
        assert!(matches!(err, Err(StateError::NotAssignee { .. })));
    }

    #[test]
    fn test_wrong_blob_count_rejected() {
        let mut state = processing_state();
        // Index 0 must submit exactly one blob.
        let err = relay(&mut state, account(1), None, vec![blob(10), blob(11)]);
        assert!(matches!(err, Err(StateError::InvalidDataCount { provided: 2, expected: 1 })));

        let err = relay(&mut state, account(1), None, vec![]);
        assert!(matches!(err, Err(StateError::InvalidDataCount { provided: 0, .. })));
    }

    #[test]
    fn test_short_blob_rejected() {
        let mut state = processing_state();
        let err = relay(&mut state, account(1), None, vec![vec![0u8; 31]]);
        assert!(matches!(err, Err(StateError::DataTooShort { length: 31 })));
    }

    #[test]
    fn test_index_zero_must_not_chain() {
        let mut state = processing_state();
        let err = relay(&mut state, account(1), Some([7u8; 32]), vec![blob(10)]);
        assert!(matches!(err, Err(StateError::PreviousHashMismatch { .. })));
    }

    #[test]
    fn test_previous_hash_must_match() {
        let mut state = processing_state();
        relay(&mut state, account(1), None, vec![blob(10)]).unwrap();

        // Missing hash.
        let err = relay(&mut state, account(2), None, vec![blob(10), blob(11)]);
        assert!(matches!(err, Err(StateError::PreviousHashMismatch { .. })));

        // Wrong hash.
        let err = relay(&mut state, account(2), Some([9u8; 32]), vec![blob(10), blob(11)]);
        assert!(matches!(err, Err(StateError::PreviousHashMismatch { .. })));
    }

    #[test]
    fn test_relay_outside_processing_rejected() {
        let mut state = LedgerState::new();
        state.insert_mix(Mix::new(MIX, account(0), Holding::Coin, 100, 3, 500));
        let err = relay(&mut state, account(1), None, vec![blob(10)]);
        assert!(matches!(err, Err(StateError::WrongStage { .. })));
    }
}
