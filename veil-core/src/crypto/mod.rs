//! Cryptographic utilities: SHA-256 hashing.
//!
//! Key management and signature verification belong to the host's
//! transaction envelope. This module only provides the hashing used to
//! derive submission commitments and mix identifiers.

mod hashing;

pub use hashing::{sha256, sha256_concat};
