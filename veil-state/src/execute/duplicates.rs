//! Per-block duplicate-key bookkeeping.
//!
//! The host threads one [`BlockDuplicates`] through the validation pass of
//! a single block; it is explicit mutable state, never a process-wide
//! singleton. The first occurrence in block order wins, extras are
//! rejected deterministically.

use std::collections::HashMap;

use veil_core::{AccountId, MixId};

/// Keys claimed by mix events within one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DuplicateKey {
    /// One registration per (mix, account).
    Registration {
        /// Mix being joined.
        mix_id: MixId,
        /// Registering account.
        account: AccountId,
    },
    /// Registrations per mix, bounded by remaining open slots.
    RegistrationSlots {
        /// Mix being joined.
        mix_id: MixId,
    },
    /// One relay submission per mix.
    Relay {
        /// Mix being processed.
        mix_id: MixId,
    },
    /// One verification *or* cancellation per (mix, account); the two
    /// kinds share a namespace.
    Outcome {
        /// Mix being resolved.
        mix_id: MixId,
        /// Resolving account.
        account: AccountId,
    },
}

/// Duplicate-key budgets for one block.
#[derive(Clone, Debug, Default)]
pub struct BlockDuplicates {
    budgets: HashMap<DuplicateKey, u32>,
}

impl BlockDuplicates {
    /// Create an empty set for a new block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim one occurrence of `key`, allowing at most `max` per block.
    ///
    /// The first occurrence fixes the key's budget at `max`; later
    /// occurrences only draw it down, so a bound sampled from state stays
    /// anchored to what the first claimant saw even while same-block
    /// events mutate that state. Returns true if the claim fits, false if
    /// the key is exhausted.
    pub fn claim(&mut self, key: DuplicateKey, max: u32) -> bool {
        let remaining = self.budgets.entry(key).or_insert(max);
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}
