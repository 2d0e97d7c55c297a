//! Escrow operations over the three holding classes.
//!
//! Reservation is two-phase: `reserve` debits tentative balances before
//! the protocol apply step runs, `release` is its exact inverse for
//! rollbacks and refunds. Mixing a non-native holding additionally locks
//! a fixed native-coin deposit; both legs succeed atomically or neither
//! is applied. Insufficient funds is a normal `false` outcome the caller
//! handles by treating the event as currently inapplicable, never an
//! error.

use tracing::debug;

use veil_core::{AccountId, Holding, Mix, MixId};

use crate::state::{EntryDirection, LedgerEntry, StateWriter};

/// Reserve one participant's escrow: `amount` of the holding, plus
/// `deposit` native coin for non-native holdings.
///
/// Returns false without mutating anything if funds are short.
pub fn reserve<S: StateWriter>(
    state: &mut S,
    mix_id: &MixId,
    account: &AccountId,
    holding: &Holding,
    amount: u64,
    deposit: u64,
) -> bool {
    if holding.is_coin() {
        if state.balance(account, holding) < amount {
            return false;
        }
        debit(state, mix_id, account, holding, amount);
    } else {
        if state.balance(account, holding) < amount
            || state.balance(account, &Holding::Coin) < deposit
        {
            return false;
        }
        debit(state, mix_id, account, holding, amount);
        debit(state, mix_id, account, &Holding::Coin, deposit);
    }
    true
}

/// Exact inverse of [`reserve`]; used for rollback and refunds.
pub fn release<S: StateWriter>(
    state: &mut S,
    mix_id: &MixId,
    account: &AccountId,
    holding: &Holding,
    amount: u64,
    deposit: u64,
) {
    credit(state, mix_id, account, holding, amount);
    if !holding.is_coin() {
        credit(state, mix_id, account, &Holding::Coin, deposit);
    }
}

/// Pay out a completed mix.
///
/// Each participant's reserved amount is credited to the recipient at the
/// same position of the final relay's output ordering (not to the
/// participant at that index). Deposits go back to the participants, and
/// the issuer's whole escrow is returned.
pub fn distribute<S: StateWriter>(state: &mut S, mix: &Mix, deposit: u64) {
    for recipient in &mix.recipients {
        credit(state, &mix.id, recipient, &mix.holding, mix.amount);
    }
    if !mix.holding.is_coin() {
        for account in &mix.participants {
            credit(state, &mix.id, account, &Holding::Coin, deposit);
        }
    }
    release(state, &mix.id, &mix.issuer, &mix.holding, mix.amount, deposit);
    debug!(
        mix = %hex4(&mix.id),
        recipients = mix.recipients.len(),
        "mix paid out"
    );
}

/// Refund a cancelled mix: every participant's and the issuer's
/// reservation goes back to its original owner.
pub fn refund<S: StateWriter>(state: &mut S, mix: &Mix, deposit: u64) {
    for account in &mix.participants {
        release(state, &mix.id, account, &mix.holding, mix.amount, deposit);
    }
    release(state, &mix.id, &mix.issuer, &mix.holding, mix.amount, deposit);
    debug!(
        mix = %hex4(&mix.id),
        participants = mix.participants.len(),
        "mix escrow refunded"
    );
}

fn debit<S: StateWriter>(
    state: &mut S,
    mix_id: &MixId,
    account: &AccountId,
    holding: &Holding,
    amount: u64,
) {
    state.debit(account, holding, amount);
    state.record_entry(LedgerEntry {
        mix_id: *mix_id,
        account: *account,
        holding: *holding,
        direction: EntryDirection::Debit,
        amount,
    });
}

fn credit<S: StateWriter>(
    state: &mut S,
    mix_id: &MixId,
    account: &AccountId,
    holding: &Holding,
    amount: u64,
) {
    state.credit(account, holding, amount);
    state.record_entry(LedgerEntry {
        mix_id: *mix_id,
        account: *account,
        holding: *holding,
        direction: EntryDirection::Credit,
        amount,
    });
}

fn hex4(id: &[u8; 20]) -> String {
    id[..4].iter().map(|b| format!("{b:02x}")).collect()
}
