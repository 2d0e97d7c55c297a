//! Cancellation-deadline sweep.
//!
//! Not a transaction: the host invokes this once per height advance. A
//! mix whose registration is still incomplete past its cancellation
//! height is resolved through Blame to Cancelled with full refunds. The
//! sweep is idempotent; terminal mixes are never revisited.

use tracing::debug;

use veil_core::{ParticipantState, Stage};

use crate::escrow;
use crate::state::StateWriter;

use super::context::ExecutionContext;
use super::short_id;

/// Expire every mix whose registration deadline has passed at the
/// context height. Returns the number of mixes cancelled.
pub fn expire_mixes<S: StateWriter>(state: &mut S, ctx: &ExecutionContext) -> usize {
    let expired = state.expired_registrations(ctx.height);
    for mix_id in &expired {
        let Some(mix) = state.get_mix(mix_id) else {
            continue;
        };
        let mix = mix.clone();

        for account in &mix.participants {
            state.update_participant(mix_id, account, |p| {
                if p.state.can_advance_to(ParticipantState::Cancelled) {
                    p.state = ParticipantState::Cancelled;
                }
            });
        }
        state.update_mix(mix_id, |m| {
            m.advance(Stage::Blame);
            m.advance(Stage::Cancelled);
        });
        escrow::refund(state, &mix, ctx.config.deposit);

        debug!(
            mix = %short_id(mix_id),
            height = ctx.height,
            "registration deadline passed, mix cancelled"
        );
    }
    expired.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::context::ProtocolConfig;
    use crate::execute::register::execute_register;
    use crate::state::{LedgerState, StateReader};
    use veil_core::{AccountId, Holding, Mix, MixId};

    const MIX: MixId = [1u8; 20];

    fn account(n: u8) -> AccountId {
        [n; 20]
    }

    fn ctx_at(height: u64) -> ExecutionContext {
        ExecutionContext::with_config(height, ProtocolConfig::devnet())
    }

    fn state_with_partial_registration() -> LedgerState {
        let mut state = LedgerState::new();
        state.insert_mix(Mix::new(MIX, account(0), Holding::Coin, 100, 3, 50));
        execute_register(&mut state, &account(1), &MIX).unwrap();
        state
    }

    #[test]
    fn test_sweep_before_deadline_is_noop() {
        let mut state = state_with_partial_registration();
        assert_eq!(expire_mixes(&mut state, &ctx_at(49)), 0);
        assert_eq!(state.get_mix(&MIX).unwrap().stage, Stage::Registration);
    }

    #[test]
    fn test_sweep_cancels_and_refunds() {
        let mut state = state_with_partial_registration();
        assert_eq!(expire_mixes(&mut state, &ctx_at(50)), 1);

        let mix = state.get_mix(&MIX).unwrap();
        assert_eq!(mix.stage, Stage::Cancelled);
        assert_eq!(
            state.get_participant(&MIX, &account(1)).unwrap().state,
            ParticipantState::Cancelled
        );
        // One amount back to the registered participant and the issuer.
        assert_eq!(state.balance(&account(1), &Holding::Coin), 100);
        assert_eq!(state.balance(&account(0), &Holding::Coin), 100);
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let mut state = state_with_partial_registration();
        assert_eq!(expire_mixes(&mut state, &ctx_at(60)), 1);
        assert_eq!(expire_mixes(&mut state, &ctx_at(61)), 0);
        // No double refund.
        assert_eq!(state.balance(&account(1), &Holding::Coin), 100);
    }

    #[test]
    fn test_sweep_ignores_completed_registration() {
        let mut state = state_with_partial_registration();
        execute_register(&mut state, &account(2), &MIX).unwrap();
        execute_register(&mut state, &account(3), &MIX).unwrap();

        // The mix moved to Processing; the deadline no longer applies.
        assert_eq!(expire_mixes(&mut state, &ctx_at(1000)), 0);
        assert_eq!(state.get_mix(&MIX).unwrap().stage, Stage::Processing);
    }
}
