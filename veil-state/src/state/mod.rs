//! State access traits and the in-memory implementation.

mod ledger_state;
mod store;

pub use ledger_state::LedgerState;
pub use store::{EntryDirection, LedgerEntry, StateReader, StateWriter};
