//! Protocol data types for the Veil mixing protocol.

mod holding;
mod mix;
mod participant;

pub use holding::{code_from_str, code_to_string, Asset, Currency, CurrencyCode, Holding};
pub use mix::{Mix, Stage};
pub use participant::{Participant, ParticipantState};

/// 20-byte account identifier.
pub type AccountId = [u8; 20];

/// 20-byte mix identifier, derived from the creation submission hash.
pub type MixId = [u8; 20];

/// 20-byte identifier of a custom asset or currency.
pub type HoldingId = [u8; 20];
