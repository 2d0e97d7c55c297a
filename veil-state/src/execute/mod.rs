//! Event execution: per-kind validate/reserve/apply/release dispatch,
//! per-block duplicate bookkeeping, and the deadline sweep.

mod cancel;
mod context;
mod create;
mod duplicates;
mod executor;
mod register;
mod relay;
mod sweep;
mod verify;

pub use cancel::KEY_SEED_LEN;
pub use context::{
    ExecutionContext, ProtocolConfig, DEFAULT_DEPOSIT, DEFAULT_MAX_COIN_BALANCE,
    DEFAULT_MAX_CURRENCY_SUPPLY, DEFAULT_MAX_PARTICIPANTS, DEFAULT_MIN_PARTICIPANTS,
};
pub use duplicates::{BlockDuplicates, DuplicateKey};
pub use executor::{
    apply_event, check_duplicate, process_submission, release_event, reserve_event, validate_event,
};
pub use relay::MIN_BLOB_LEN;
pub use sweep::expire_mixes;

/// Short hex prefix of an id for log lines.
pub(crate) fn short_id(id: &[u8; 20]) -> String {
    id[..4].iter().map(|b| format!("{b:02x}")).collect()
}
