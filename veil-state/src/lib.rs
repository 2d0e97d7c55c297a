//! State machine for the Veil mixing protocol.
//!
//! This crate implements the complete state transition function for
//! multi-party mixing sessions. Given the current state and a mix event,
//! it validates, reserves escrow, and applies the transition — or rejects
//! the event before any mutation. All mutation happens inside the host's
//! sequential, height-ordered transaction-application pass, so there is
//! no interior locking.
//!
//! # Key Components
//!
//! - [`LedgerState`]: In-memory state container backed by HashMaps
//! - [`StateReader`]/[`StateWriter`]: Traits abstracting state access
//! - [`validate_event`]/[`reserve_event`]/[`apply_event`]/[`release_event`]:
//!   the per-kind pipeline steps, plus [`process_submission`] composing them
//! - [`BlockDuplicates`]: per-block duplicate-key set threaded by the caller
//! - [`expire_mixes`]: idempotent cancellation-deadline sweep
//! - [`StateError`]: validation errors, classified by [`RejectionClass`]
//!
//! # Example
//!
//! ```ignore
//! use veil_state::{BlockDuplicates, ExecutionContext, LedgerState, process_submission};
//!
//! let mut state = LedgerState::new();
//! let ctx = ExecutionContext::new(block_height);
//! let mut dups = BlockDuplicates::new();
//! let applied = process_submission(&mut state, &ctx, &mut dups, &submission)?;
//! ```

mod error;
mod escrow;
mod execute;
mod state;

pub use error::{RejectionClass, StateError, StateResult};
pub use execute::{
    apply_event, check_duplicate, expire_mixes, process_submission, release_event, reserve_event,
    validate_event, BlockDuplicates, DuplicateKey, ExecutionContext, ProtocolConfig,
    DEFAULT_DEPOSIT, DEFAULT_MAX_COIN_BALANCE, DEFAULT_MAX_CURRENCY_SUPPLY,
    DEFAULT_MAX_PARTICIPANTS, DEFAULT_MIN_PARTICIPANTS, KEY_SEED_LEN, MIN_BLOB_LEN,
};
pub use state::{EntryDirection, LedgerEntry, LedgerState, StateReader, StateWriter};
