//! Verification of the final relay output.

use tracing::debug;

use veil_core::{AccountId, MixId, ParticipantState, Stage, Submission};

use crate::error::{StateError, StateResult};
use crate::escrow;
use crate::state::{StateReader, StateWriter};

use super::context::ExecutionContext;
use super::short_id;

/// Validate a Verify event.
///
/// Every verifier independently confirms it agrees on the final,
/// fully-layered output: `final_hash` must equal the commitment stored by
/// the last-index participant's relay. The mixing math behind that
/// agreement is external.
pub fn validate_verify<S: StateReader>(
    state: &mut S,
    sender: &AccountId,
    mix_id: &MixId,
    final_hash: &[u8; 32],
) -> StateResult<()> {
    let mix = state
        .get_mix(mix_id)
        .ok_or(StateError::MixNotFound { mix_id: *mix_id })?
        .clone();

    if mix.stage != Stage::Verification {
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
        })?;

    if !participant.state.can_advance_to(ParticipantState::Verified) {
        return Err(StateError::InvalidParticipantTransition {
            account: *sender,
            from: participant.state,
            to: ParticipantState::Verified,
        });
    }

    let last_account = mix
        .account_at(mix.last_index())
        .ok_or(StateError::FinalHashMismatch { mix_id: *mix_id })?;
    let last = state
        .get_participant(mix_id, &last_account)
        .ok_or(StateError::NotRegistered {
            mix_id: *mix_id,
            account: last_account,
        })?;

    match last.commitment {
        Some(stored) if stored == *final_hash => Ok(()),
        _ => Err(StateError::FinalHashMismatch { mix_id: *mix_id }),
    }
}

/// Apply a validated Verify submission.
///
/// Marks the sender Verified; once every participant is Verified the mix
/// is Done and escrow is distributed: each reserved amount goes to the
/// recipient at the same position of the final relay's output ordering,
/// deposits return to the participants, and the issuer's escrow is
/// released.
pub fn execute_verify<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    submission: &Submission,
    mix_id: &MixId,
) -> StateResult<()> {
    let hash = submission.full_hash();
    state.update_participant(mix_id, &submission.sender, |p| {
        p.state = ParticipantState::Verified;
        p.commitment = Some(hash);
    });

    let mix = state
        .get_mix(mix_id)
        .ok_or(StateError::MixNotFound { mix_id: *mix_id })?
        .clone();

    let mut all_verified = true;
    for account in &mix.participants {
        match state.get_participant(mix_id, account) {
            Some(p) if p.state == ParticipantState::Verified => {}
            _ => {
                all_verified = false;
                break;
            }
        }
    }

    if all_verified {
        state.update_mix(mix_id, |m| {
            m.advance(Stage::Done);
        });
        escrow::distribute(state, &mix, ctx.config.deposit);
        debug!(mix = %short_id(mix_id), "all participants verified, mix done");
    }

    Ok(())
}
