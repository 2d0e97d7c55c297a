//! Cancellation and the blame round.

use tracing::{debug, warn};

use veil_core::{AccountId, MixId, ParticipantState, Stage, Submission};

use crate::error::{StateError, StateResult};
use crate::escrow;
use crate::state::{StateReader, StateWriter};

use super::context::ExecutionContext;
use super::short_id;

/// Exact length of one revealed key seed.
pub const KEY_SEED_LEN: usize = 32;

/// Validate a Cancel event.
///
/// # Validation
/// - Mix stage must allow Blame (or already be Blame, collecting the
///   remaining cancellations)
/// - A claimed cancelling account must match the pinned canceller
/// - Sender's participant state must allow Cancelled
/// - The disputed commitment must equal the sender's stored one
/// - `key_seeds` is empty (opt out of revealing) or holds exactly one
///   32-byte seed per participant strictly after the sender in relay order
pub fn validate_cancel<S: StateReader>(
    state: &mut S,
    sender: &AccountId,
    mix_id: &MixId,
    cancelling_account: &Option<AccountId>,
    commitment: &Option<[u8; 32]>,
    key_seeds: &[Vec<u8>],
) -> StateResult<()> {
    let mix = state
        .get_mix(mix_id)
        .ok_or(StateError::MixNotFound { mix_id: *mix_id })?
        .clone();

    if !mix.stage.can_advance_to(Stage::Blame) && mix.stage != Stage::Blame {
        return Err(StateError::WrongStage {
            mix_id: *mix_id,
            stage: mix.stage,
        });
    }

    if let Some(claimed) = cancelling_account {
        if mix.canceller != Some(*claimed) {
            return Err(StateError::WrongCanceller {
                mix_id: *mix_id,
                account: *claimed,
            });
        }
    }

    let participant = state
        .get_participant(mix_id, sender)
        .ok_or(StateError::NotRegistered {
            mix_id: *mix_id,
            account: *sender,
        })?;

    if !participant.state.can_advance_to(ParticipantState::Cancelled) {
        return Err(StateError::InvalidParticipantTransition {
            account: *sender,
            from: participant.state,
            to: ParticipantState::Cancelled,
        });
    }

    if participant.commitment != *commitment {
        return Err(StateError::CommitmentMismatch {
            mix_id: *mix_id,
            account: *sender,
        });
    }

    let expected = (mix.participant_count - participant.index - 1) as usize;
    if !key_seeds.is_empty() && key_seeds.len() != expected {
        return Err(StateError::InvalidKeySeedCount {
            provided: key_seeds.len(),
            expected,
        });
    }
    for seed in key_seeds {
        if seed.len() != KEY_SEED_LEN {
            return Err(StateError::InvalidKeySeedLength { length: seed.len() });
        }
    }

    Ok(())
}

/// Apply a validated Cancel submission.
///
/// Moves the mix into Blame on first cancellation and pins the canceller.
/// Once every participant is terminal the mix is Cancelled and all escrow
/// — every participant's and the issuer's — is refunded, since no
/// completed mix occurred.
pub fn execute_cancel<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    submission: &Submission,
    mix_id: &MixId,
) -> StateResult<()> {
    let sender = submission.sender;
    let hash = submission.full_hash();

    state.update_participant(mix_id, &sender, |p| {
        p.state = ParticipantState::Cancelled;
        p.commitment = Some(hash);
    });

    let mut entered_blame = false;
    state.update_mix(mix_id, |m| {
        if m.stage != Stage::Blame {
            m.advance(Stage::Blame);
            entered_blame = true;
        }
        if m.canceller.is_none() {
            m.canceller = Some(sender);
        }
    });
    if entered_blame {
        warn!(
            mix = %short_id(mix_id),
            canceller = %short_id(&sender),
            "mix disputed, blame round begins"
        );
    }

    let mix = state
        .get_mix(mix_id)
        .ok_or(StateError::MixNotFound { mix_id: *mix_id })?
        .clone();

    let mut all_terminal = true;
    for account in &mix.participants {
        match state.get_participant(mix_id, account) {
            Some(p) if p.state.is_terminal() => {}
            _ => {
                all_terminal = false;
                break;
            }
        }
    }

    if all_terminal {
        state.update_mix(mix_id, |m| {
            m.advance(Stage::Cancelled);
        });
        escrow::refund(state, &mix, ctx.config.deposit);
        debug!(mix = %short_id(mix_id), "all participants resolved, mix cancelled");
    }

    Ok(())
}
