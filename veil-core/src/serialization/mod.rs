//! Deterministic binary serialization for the Veil protocol.
//!
//! All protocol data structures are serialized with a fixed bincode
//! configuration so that identical values always produce identical bytes.
//! Submission commitment hashes and mix identifiers depend on this.

mod bincode_config;

pub use bincode_config::{deserialize, serialize, serialized_size};
