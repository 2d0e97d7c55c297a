//! In-memory ledger state container.

use std::collections::HashMap;

use veil_core::{AccountId, Asset, Currency, Holding, HoldingId, Mix, MixId, Participant, Stage};

use super::store::{LedgerEntry, StateReader, StateWriter};

/// In-memory ledger state backed by HashMaps.
///
/// This is the testing and development implementation. A host embedding
/// the mixer in a persistent ledger implements the same traits over its
/// own storage.
#[derive(Clone, Debug, Default)]
pub struct LedgerState {
    /// All mixes by id.
    pub mixes: HashMap<MixId, Mix>,

    /// All participants by (mix, account).
    pub participants: HashMap<(MixId, AccountId), Participant>,

    /// Asset registry.
    pub assets: HashMap<HoldingId, Asset>,

    /// Currency registry.
    pub currencies: HashMap<HoldingId, Currency>,

    /// Tentative balances per (account, holding).
    pub balances: HashMap<(AccountId, Holding), u64>,

    /// Tagged balance-ledger side effects, in application order.
    pub journal: Vec<LedgerEntry>,
}

impl LedgerState {
    /// Create a new empty ledger state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mixes ever created.
    pub fn mix_count(&self) -> usize {
        self.mixes.len()
    }

    /// Number of participants registered for a mix.
    pub fn participant_count(&self, mix_id: &MixId) -> usize {
        self.mixes
            .get(mix_id)
            .map(|m| m.participants.len())
            .unwrap_or(0)
    }

    /// Seed a tentative balance (host/test setup).
    pub fn set_balance(&mut self, account: AccountId, holding: Holding, amount: u64) {
        self.balances.insert((account, holding), amount);
    }

    /// Register an asset (host/test setup).
    pub fn add_asset(&mut self, id: HoldingId, asset: Asset) {
        self.assets.insert(id, asset);
    }

    /// Register a currency (host/test setup).
    pub fn add_currency(&mut self, id: HoldingId, currency: Currency) {
        self.currencies.insert(id, currency);
    }

    /// Journal entries recorded for one mix, in application order.
    pub fn entries_for(&self, mix_id: &MixId) -> Vec<&LedgerEntry> {
        self.journal.iter().filter(|e| &e.mix_id == mix_id).collect()
    }
}

impl StateReader for LedgerState {
    fn get_mix(&mut self, id: &MixId) -> Option<&Mix> {
        self.mixes.get(id)
    }

    fn get_participant(&mut self, mix_id: &MixId, account: &AccountId) -> Option<&Participant> {
        self.participants.get(&(*mix_id, *account))
    }

    fn get_asset(&mut self, id: &HoldingId) -> Option<&Asset> {
        self.assets.get(id)
    }

    fn get_currency(&mut self, id: &HoldingId) -> Option<&Currency> {
        self.currencies.get(id)
    }

    fn balance(&mut self, account: &AccountId, holding: &Holding) -> u64 {
        self.balances.get(&(*account, *holding)).copied().unwrap_or(0)
    }

    fn expired_registrations(&mut self, height: u64) -> Vec<MixId> {
        let mut expired: Vec<MixId> = self
            .mixes
            .values()
            .filter(|m| m.stage == Stage::Registration && m.cancellation_height <= height)
            .map(|m| m.id)
            .collect();
        // HashMap iteration order is arbitrary; the sweep must be deterministic.
        expired.sort_unstable();
        expired
    }
}

impl StateWriter for LedgerState {
    fn insert_mix(&mut self, mix: Mix) {
        self.mixes.insert(mix.id, mix);
    }

    fn update_mix<F>(&mut self, id: &MixId, f: F)
    where
        F: FnOnce(&mut Mix),
    {
        if let Some(mix) = self.mixes.get_mut(id) {
            f(mix);
        }
    }

    fn insert_participant(&mut self, participant: Participant) {
        self.participants
            .insert((participant.mix_id, participant.account), participant);
    }

    fn update_participant<F>(&mut self, mix_id: &MixId, account: &AccountId, f: F)
    where
        F: FnOnce(&mut Participant),
    {
        if let Some(participant) = self.participants.get_mut(&(*mix_id, *account)) {
            f(participant);
        }
    }

    fn credit(&mut self, account: &AccountId, holding: &Holding, amount: u64) {
        let entry = self.balances.entry((*account, *holding)).or_insert(0);
        *entry += amount;
    }

    fn debit(&mut self, account: &AccountId, holding: &Holding, amount: u64) {
        if let Some(entry) = self.balances.get_mut(&(*account, *holding)) {
            if *entry >= amount {
                *entry -= amount;
            }
        }
    }

    fn record_entry(&mut self, entry: LedgerEntry) {
        self.journal.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntryDirection;

    #[test]
    fn test_new_state() {
        let state = LedgerState::new();
        assert_eq!(state.mix_count(), 0);
        assert!(state.journal.is_empty());
    }

    #[test]
    fn test_insert_and_update_mix() {
        let mut state = LedgerState::new();
        let mix = Mix::new([1u8; 20], [2u8; 20], Holding::Coin, 100, 3, 50);
        state.insert_mix(mix);

        assert_eq!(state.get_mix(&[1u8; 20]).unwrap().amount, 100);

        state.update_mix(&[1u8; 20], |m| {
            m.stage = Stage::Processing;
        });
        assert_eq!(state.get_mix(&[1u8; 20]).unwrap().stage, Stage::Processing);
    }

    #[test]
    fn test_participant_lookup() {
        let mut state = LedgerState::new();
        let p = Participant::new([1u8; 20], [2u8; 20], 0);
        state.insert_participant(p);

        assert!(state.get_participant(&[1u8; 20], &[2u8; 20]).is_some());
        assert!(state.get_participant(&[1u8; 20], &[3u8; 20]).is_none());

        state.update_participant(&[1u8; 20], &[2u8; 20], |p| {
            p.commitment = Some([9u8; 32]);
        });
        assert_eq!(
            state.get_participant(&[1u8; 20], &[2u8; 20]).unwrap().commitment,
            Some([9u8; 32])
        );
    }

    #[test]
    fn test_balances() {
        let mut state = LedgerState::new();
        let account = [1u8; 20];

        assert_eq!(state.balance(&account, &Holding::Coin), 0);

        state.credit(&account, &Holding::Coin, 500);
        assert_eq!(state.balance(&account, &Holding::Coin), 500);

        state.debit(&account, &Holding::Coin, 200);
        assert_eq!(state.balance(&account, &Holding::Coin), 300);

        // A short debit leaves the balance untouched.
        state.debit(&account, &Holding::Coin, 1000);
        assert_eq!(state.balance(&account, &Holding::Coin), 300);
    }

    #[test]
    fn test_balances_keyed_per_holding() {
        let mut state = LedgerState::new();
        let account = [1u8; 20];
        let asset = Holding::Asset([7u8; 20]);

        state.credit(&account, &asset, 50);
        assert_eq!(state.balance(&account, &asset), 50);
        assert_eq!(state.balance(&account, &Holding::Coin), 0);
    }

    #[test]
    fn test_journal() {
        let mut state = LedgerState::new();
        let entry = LedgerEntry {
            mix_id: [1u8; 20],
            account: [2u8; 20],
            holding: Holding::Coin,
            direction: EntryDirection::Debit,
            amount: 100,
        };
        state.record_entry(entry.clone());
        assert_eq!(state.entries_for(&[1u8; 20]), vec![&entry]);
        assert!(state.entries_for(&[9u8; 20]).is_empty());
    }

    #[test]
    fn test_expired_registrations_sorted_and_filtered() {
        let mut state = LedgerState::new();
        let mut a = Mix::new([3u8; 20], [0u8; 20], Holding::Coin, 100, 3, 10);
        let b = Mix::new([1u8; 20], [0u8; 20], Holding::Coin, 100, 3, 10);
        let c = Mix::new([2u8; 20], [0u8; 20], Holding::Coin, 100, 3, 99);
        a.stage = Stage::Cancelled;
        state.insert_mix(a);
        state.insert_mix(b);
        state.insert_mix(c);

        // Only the Registration-stage mix past its deadline shows up.
        assert_eq!(state.expired_registrations(10), vec![[1u8; 20]]);
        // At a later height both non-terminal mixes expire, in id order.
        assert_eq!(state.expired_registrations(100), vec![[1u8; 20], [2u8; 20]]);
    }
}
