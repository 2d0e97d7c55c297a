//! Mix creation.

use tracing::debug;

use veil_core::{AccountId, Holding, Mix, MixId};

use crate::error::{StateError, StateResult};
use crate::state::{StateReader, StateWriter};

use super::context::ExecutionContext;
use super::short_id;

/// Validate a Create event against global bounds and the holding
/// registries.
///
/// # Validation
/// - Coin amounts must cover the deposit and stay under the balance cap
/// - Asset must exist; amount bounded by its total supply
/// - Currency must exist and be active; amount bounded by the supply cap
/// - Participant count within configured bounds
/// - Cancellation height strictly in the future
pub fn validate_create<S: StateReader>(
    state: &mut S,
    ctx: &ExecutionContext,
    holding: &Holding,
    amount: u64,
    participant_count: u16,
    cancellation_height: u64,
) -> StateResult<()> {
    match holding {
        Holding::Coin => {
            if amount < ctx.config.deposit || amount > ctx.config.max_coin_balance {
                return Err(StateError::InvalidAmount {
                    amount,
                    min: ctx.config.deposit,
                    max: ctx.config.max_coin_balance,
                });
            }
        }
        Holding::Asset(id) => {
            let asset = state
                .get_asset(id)
                .ok_or(StateError::UnknownAsset { holding_id: *id })?;
            if amount == 0 || amount > asset.total_supply {
                return Err(StateError::InvalidAmount {
                    amount,
                    min: 1,
                    max: asset.total_supply,
                });
            }
        }
        Holding::Currency(id) => {
            let currency = state
                .get_currency(id)
                .ok_or(StateError::UnknownCurrency { holding_id: *id })?;
            if !currency.active {
                return Err(StateError::CurrencyInactive { holding_id: *id });
            }
            if amount == 0 || amount > ctx.config.max_currency_supply {
                return Err(StateError::InvalidAmount {
                    amount,
                    min: 1,
                    max: ctx.config.max_currency_supply,
                });
            }
        }
    }

    if participant_count < ctx.config.min_participants
        || participant_count > ctx.config.max_participants
    {
        return Err(StateError::InvalidParticipantCount {
            count: participant_count,
            min: ctx.config.min_participants,
            max: ctx.config.max_participants,
        });
    }

    if cancellation_height <= ctx.height {
        return Err(StateError::InvalidCancellationHeight {
            height: cancellation_height,
            current: ctx.height,
        });
    }

    Ok(())
}

/// Instantiate the mix. The issuer's escrow was reserved beforehand.
pub fn execute_create<S: StateWriter>(
    state: &mut S,
    issuer: &AccountId,
    mix_id: MixId,
    holding: &Holding,
    amount: u64,
    participant_count: u16,
    cancellation_height: u64,
) -> StateResult<()> {
    let mix = Mix::new(
        mix_id,
        *issuer,
        *holding,
        amount,
        participant_count,
        cancellation_height,
    );
    debug!(
        mix = %short_id(&mix_id),
        kind = holding.kind_name(),
        amount,
        participant_count,
        "mix created"
    );
    state.insert_mix(mix);
    Ok(())
}
