//! # Veil Core
//!
//! Core types, hashing, and deterministic serialization for the Veil
//! mixing protocol.
//!
//! This crate provides the foundation for the state machine crate:
//! - Protocol data types (Mix, Participant, Holding)
//! - Mix event types (the five protocol operations) and their envelope
//! - SHA-256 hashing for submission commitments and derived ids
//! - Deterministic binary serialization

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crypto;
pub mod error;
pub mod event;
pub mod serialization;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{CodeError, CoreError, SerializationError};
pub use event::{EventKind, MixEvent, Submission};
pub use types::{
    AccountId, Asset, Currency, CurrencyCode, Holding, HoldingId, Mix, MixId, Participant,
    ParticipantState, Stage,
};
