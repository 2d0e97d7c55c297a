//! Per-kind event dispatch.
//!
//! The host's transaction pipeline drives each event through five steps,
//! in order: validate, duplicate check, reserve, apply — and, on a chain
//! reorganization, the exact inverse release for every rolled-back event.
//! Each step is a closed match over the event kinds; no step before apply
//! mutates protocol state, and a failed reservation aborts only its own
//! event.

use veil_core::{AccountId, Holding, MixEvent, Submission};

use crate::error::{StateError, StateResult};
use crate::escrow;
use crate::state::{StateReader, StateWriter};

use super::context::ExecutionContext;
use super::duplicates::{BlockDuplicates, DuplicateKey};
use super::{cancel, create, register, relay, verify};

/// Validate an event against the current state. Fail-closed: any error
/// rejects the event before any mutation.
pub fn validate_event<S: StateReader>(
    state: &mut S,
    ctx: &ExecutionContext,
    sender: &AccountId,
    event: &MixEvent,
) -> StateResult<()> {
    if ctx.height < ctx.config.activation_height {
        return Err(StateError::NotYetEnabled {
            activation_height: ctx.config.activation_height,
            current_height: ctx.height,
        });
    }

    match event {
        MixEvent::Create {
            holding,
            amount,
            participant_count,
            cancellation_height,
        } => create::validate_create(
            state,
            ctx,
            holding,
            *amount,
            *participant_count,
            *cancellation_height,
        ),
        MixEvent::Register { mix_id } => register::validate_register(state, sender, mix_id),
        MixEvent::Relay {
            mix_id,
            previous_hash,
            data,
        } => relay::validate_relay(state, sender, mix_id, previous_hash, data),
        MixEvent::Verify { mix_id, final_hash } => {
            verify::validate_verify(state, sender, mix_id, final_hash)
        }
        MixEvent::Cancel {
            mix_id,
            cancelling_account,
            commitment,
            key_seeds,
        } => cancel::validate_cancel(state, sender, mix_id, cancelling_account, commitment, key_seeds),
    }
}

/// Claim the event's duplicate keys in the per-block set.
///
/// Returns true when the event is a same-block duplicate and must be
/// rejected: a second registration by one account, registrations beyond
/// the remaining open slots, a second relay for the mix, or a second
/// verification-or-cancellation by one account.
pub fn check_duplicate<S: StateReader>(
    state: &mut S,
    dups: &mut BlockDuplicates,
    sender: &AccountId,
    event: &MixEvent,
) -> bool {
    match event {
        MixEvent::Create { .. } => false,
        MixEvent::Register { mix_id } => {
            let remaining = match state.get_mix(mix_id) {
                Some(mix) => {
                    (mix.participant_count as usize).saturating_sub(mix.participants.len()) as u32
                }
                // Unknown mix: leave the rejection to validation.
                None => return false,
            };
            !dups.claim(
                DuplicateKey::Registration {
                    mix_id: *mix_id,
                    account: *sender,
                },
                1,
            ) || !dups.claim(DuplicateKey::RegistrationSlots { mix_id: *mix_id }, remaining)
        }
        MixEvent::Relay { mix_id, .. } => !dups.claim(DuplicateKey::Relay { mix_id: *mix_id }, 1),
        // Verification and cancellation share one namespace.
        MixEvent::Verify { mix_id, .. } | MixEvent::Cancel { mix_id, .. } => !dups.claim(
            DuplicateKey::Outcome {
                mix_id: *mix_id,
                account: *sender,
            },
            1,
        ),
    }
}

/// Two-phase step one: reserve the escrow this event needs.
///
/// Only Create and Register reserve anything. Returns false — without
/// mutating balances — when funds are short; the event is then currently
/// inapplicable, not invalid.
pub fn reserve_event<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    submission: &Submission,
) -> bool {
    match &submission.event {
        MixEvent::Create {
            holding, amount, ..
        } => {
            let mix_id = submission.derived_id();
            escrow::reserve(
                state,
                &mix_id,
                &submission.sender,
                holding,
                *amount,
                ctx.config.deposit,
            )
        }
        MixEvent::Register { mix_id } => {
            let Some(mix) = state.get_mix(mix_id) else {
                return false;
            };
            let (holding, amount): (Holding, u64) = (mix.holding, mix.amount);
            escrow::reserve(
                state,
                mix_id,
                &submission.sender,
                &holding,
                amount,
                ctx.config.deposit,
            )
        }
        _ => true,
    }
}

/// Exact inverse of [`reserve_event`]; the host calls it for every
/// rolled-back event during a chain reorganization so escrow balances
/// never drift.
pub fn release_event<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    submission: &Submission,
) {
    match &submission.event {
        MixEvent::Create {
            holding, amount, ..
        } => {
            let mix_id = submission.derived_id();
            escrow::release(
                state,
                &mix_id,
                &submission.sender,
                holding,
                *amount,
                ctx.config.deposit,
            );
        }
        MixEvent::Register { mix_id } => {
            let Some(mix) = state.get_mix(mix_id) else {
                return;
            };
            let (holding, amount): (Holding, u64) = (mix.holding, mix.amount);
            escrow::release(
                state,
                mix_id,
                &submission.sender,
                &holding,
                amount,
                ctx.config.deposit,
            );
        }
        _ => {}
    }
}

/// Apply a validated, reserved event to the protocol state.
pub fn apply_event<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    submission: &Submission,
) -> StateResult<()> {
    match &submission.event {
        MixEvent::Create {
            holding,
            amount,
            participant_count,
            cancellation_height,
        } => create::execute_create(
            state,
            &submission.sender,
            submission.derived_id(),
            holding,
            *amount,
            *participant_count,
            *cancellation_height,
        ),
        MixEvent::Register { mix_id } => register::execute_register(state, &submission.sender, mix_id),
        MixEvent::Relay { mix_id, data, .. } => relay::execute_relay(state, submission, mix_id, data),
        MixEvent::Verify { mix_id, .. } => verify::execute_verify(state, ctx, submission, mix_id),
        MixEvent::Cancel { mix_id, .. } => cancel::execute_cancel(state, ctx, submission, mix_id),
    }
}

/// Drive one submission through the whole pipeline.
///
/// Returns `Ok(true)` when applied, `Ok(false)` when the reservation
/// could not be funded (currently inapplicable; retry later), and an
/// error when rejected. An apply failure releases the reservation it
/// took, leaving balances untouched.
pub fn process_submission<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    dups: &mut BlockDuplicates,
    submission: &Submission,
) -> StateResult<bool> {
    validate_event(state, ctx, &submission.sender, &submission.event)?;
    if check_duplicate(state, dups, &submission.sender, &submission.event) {
        return Err(StateError::DuplicateInBlock {
            kind: submission.event.kind(),
        });
    }
    if !reserve_event(state, ctx, submission) {
        return Ok(false);
    }
    match apply_event(state, ctx, submission) {
        Ok(()) => Ok(true),
        Err(e) => {
            release_event(state, ctx, submission);
            Err(e)
        }
    }
}
