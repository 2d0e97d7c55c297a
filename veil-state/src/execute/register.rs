//! Participant registration.

use tracing::debug;

use veil_core::{AccountId, MixId, Participant, Stage};

use crate::error::{StateError, StateResult};
use crate::state::{StateReader, StateWriter};

use super::short_id;

/// Validate a Register event against the current stage and existing slots.
pub fn validate_register<S: StateReader>(
    state: &mut S,
    sender: &AccountId,
    mix_id: &MixId,
) -> StateResult<()> {
    let mix = state
        .get_mix(mix_id)
        .ok_or(StateError::MixNotFound { mix_id: *mix_id })?;

    if mix.stage != Stage::Registration {
        return Err(StateError::WrongStage {
            mix_id: *mix_id,
            stage: mix.stage,
        });
    }
    if mix.index_of(sender).is_some() {
        return Err(StateError::AlreadyRegistered {
            mix_id: *mix_id,
            account: *sender,
        });
    }
    Ok(())
}

/// Add the sender as the next participant.
///
/// Stage, duplicate slot, and capacity are re-checked immediately before
/// mutation, so a rejected registration never leaves partial state. When
/// the last slot fills, the stage advances to Processing and the relay
/// assignment starts at index 0.
pub fn execute_register<S: StateWriter>(
    state: &mut S,
    sender: &AccountId,
    mix_id: &MixId,
) -> StateResult<()> {
    let mix = state
        .get_mix(mix_id)
        .ok_or(StateError::MixNotFound { mix_id: *mix_id })?
        .clone();

    if mix.stage != Stage::Registration {
        return Err(StateError::WrongStage {
            mix_id: *mix_id,
            stage: mix.stage,
        });
    }
    if mix.index_of(sender).is_some() {
        return Err(StateError::AlreadyRegistered {
            mix_id: *mix_id,
            account: *sender,
        });
    }
    if mix.is_full() {
        return Err(StateError::MixFull { mix_id: *mix_id });
    }

    let index = mix.participants.len() as u16;
    state.insert_participant(Participant::new(*mix_id, *sender, index));

    let mut now_full = false;
    state.update_mix(mix_id, |m| {
        m.participants.push(*sender);
        if m.is_full() {
            m.advance(Stage::Processing);
            m.assignee_index = 0;
            now_full = true;
        }
    });

    if now_full {
        debug!(
            mix = %short_id(mix_id),
            participants = mix.participant_count,
            "registration complete, processing begins"
        );
    }
    Ok(())
}
