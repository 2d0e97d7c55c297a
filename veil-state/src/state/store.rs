//! Traits abstracting state access.
//!
//! The executor is generic over these traits; the in-memory
//! [`LedgerState`](super::LedgerState) implements them for testing and
//! development, and a persistent host store can implement the same
//! interface. Balances are the host ledger's *tentative* balances, the
//! ones the two-phase reservation discipline debits and credits.

use veil_core::{AccountId, Asset, Currency, Holding, HoldingId, Mix, MixId, Participant};

/// Direction of a balance-ledger side effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryDirection {
    /// Balance decreased.
    Debit,
    /// Balance increased.
    Credit,
}

/// One balance-ledger side effect, tagged with the mix that caused it.
///
/// The host's bookkeeping consumes these; tests use them to check the
/// conservation law.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Mix the entry belongs to.
    pub mix_id: MixId,
    /// Affected account.
    pub account: AccountId,
    /// Affected holding (`Holding::Coin` for deposits).
    pub holding: Holding,
    /// Debit or credit.
    pub direction: EntryDirection,
    /// Amount moved.
    pub amount: u64,
}

/// Read access to mixes, participants, registries, and balances.
pub trait StateReader {
    /// Look up a mix by id.
    fn get_mix(&mut self, id: &MixId) -> Option<&Mix>;

    /// Look up a participant by (mix, account).
    fn get_participant(&mut self, mix_id: &MixId, account: &AccountId) -> Option<&Participant>;

    /// Look up an asset registry entry.
    fn get_asset(&mut self, id: &HoldingId) -> Option<&Asset>;

    /// Look up a currency registry entry.
    fn get_currency(&mut self, id: &HoldingId) -> Option<&Currency>;

    /// Tentative balance of the given holding for an account.
    fn balance(&mut self, account: &AccountId, holding: &Holding) -> u64;

    /// Mixes still in Registration whose cancellation height has passed at
    /// the given height, in deterministic (id) order.
    fn expired_registrations(&mut self, height: u64) -> Vec<MixId>;
}

/// Write access on top of [`StateReader`].
pub trait StateWriter: StateReader {
    /// Insert a new mix.
    fn insert_mix(&mut self, mix: Mix);

    /// Mutate an existing mix in place.
    fn update_mix<F>(&mut self, id: &MixId, f: F)
    where
        F: FnOnce(&mut Mix);

    /// Insert a new participant.
    fn insert_participant(&mut self, participant: Participant);

    /// Mutate an existing participant in place.
    fn update_participant<F>(&mut self, mix_id: &MixId, account: &AccountId, f: F)
    where
        F: FnOnce(&mut Participant);

    /// Increase a tentative balance.
    fn credit(&mut self, account: &AccountId, holding: &Holding, amount: u64);

    /// Decrease a tentative balance. Callers check sufficiency first; a
    /// short balance is left untouched.
    fn debit(&mut self, account: &AccountId, holding: &Holding, amount: u64);

    /// Append a tagged balance-ledger entry.
    fn record_entry(&mut self, entry: LedgerEntry);
}
