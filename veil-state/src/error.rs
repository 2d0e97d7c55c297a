//! Error types for mix state transitions.

use veil_core::{AccountId, EventKind, HoldingId, MixId, ParticipantState, Stage};

/// All validation and execution errors for mix state transitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateError {
    /// Mixing is not enabled until the activation height.
    NotYetEnabled { activation_height: u64, current_height: u64 },

    // === Lookup / stage errors ===
    /// No mix with this id.
    MixNotFound { mix_id: MixId },
    /// The mix's current stage does not accept this event.
    WrongStage { mix_id: MixId, stage: Stage },
    /// Account holds no slot in this mix.
    NotRegistered { mix_id: MixId, account: AccountId },
    /// Account already holds a slot in this mix.
    AlreadyRegistered { mix_id: MixId, account: AccountId },
    /// All participant slots are taken.
    MixFull { mix_id: MixId },

    // === Relay errors ===
    /// It is not this account's turn to relay.
    NotAssignee { mix_id: MixId, account: AccountId },
    /// The claimed previous commitment does not match the stored one.
    PreviousHashMismatch { mix_id: MixId },
    /// Wrong number of data blobs for the sender's index.
    InvalidDataCount { provided: usize, expected: usize },
    /// A data blob is below the minimum ciphertext length.
    DataTooShort { length: usize },

    // === Verification / cancellation errors ===
    /// The participant machine forbids this transition.
    InvalidParticipantTransition {
        account: AccountId,
        from: ParticipantState,
        to: ParticipantState,
    },
    /// The claimed final hash does not match the last relay's commitment.
    FinalHashMismatch { mix_id: MixId },
    /// The disputed commitment does not match the sender's stored one.
    CommitmentMismatch { mix_id: MixId, account: AccountId },
    /// Cancellation already pinned to a different account.
    WrongCanceller { mix_id: MixId, account: AccountId },
    /// Wrong number of revealed key seeds for the sender's index.
    InvalidKeySeedCount { provided: usize, expected: usize },
    /// A revealed key seed is not exactly 32 bytes.
    InvalidKeySeedLength { length: usize },

    // === Creation errors ===
    /// Participant count outside the configured bounds.
    InvalidParticipantCount { count: u16, min: u16, max: u16 },
    /// Amount outside the holding-specific bounds.
    InvalidAmount { amount: u64, min: u64, max: u64 },
    /// No asset with this id.
    UnknownAsset { holding_id: HoldingId },
    /// No currency with this id.
    UnknownCurrency { holding_id: HoldingId },
    /// The currency exists but is not active.
    CurrencyInactive { holding_id: HoldingId },
    /// Cancellation height is not in the future.
    InvalidCancellationHeight { height: u64, current: u64 },

    // === Block-level errors ===
    /// A same-block submission already claimed this event's duplicate key.
    DuplicateInBlock { kind: EventKind },
}

/// How the host should treat a rejected event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionClass {
    /// Transient: becomes valid once the activation height is reached.
    NotYetEnabled,
    /// Transient: a stateful precondition failed; may become valid later.
    NotCurrentlyValid,
    /// Permanent: structurally malformed, must never be accepted.
    NotValid,
}

impl StateError {
    /// Classify this error for the host's retry/expiry policy.
    pub fn class(&self) -> RejectionClass {
        use StateError::*;
        match self {
            NotYetEnabled { .. } => RejectionClass::NotYetEnabled,

            MixNotFound { .. }
            | WrongStage { .. }
            | NotRegistered { .. }
            | AlreadyRegistered { .. }
            | MixFull { .. }
            | NotAssignee { .. }
            | PreviousHashMismatch { .. }
            | InvalidParticipantTransition { .. }
            | FinalHashMismatch { .. }
            | CommitmentMismatch { .. }
            | WrongCanceller { .. }
            | UnknownAsset { .. }
            | UnknownCurrency { .. }
            | CurrencyInactive { .. }
            | DuplicateInBlock { .. } => RejectionClass::NotCurrentlyValid,

            InvalidDataCount { .. }
            | DataTooShort { .. }
            | InvalidKeySeedCount { .. }
            | InvalidKeySeedLength { .. }
            | InvalidParticipantCount { .. }
            | InvalidAmount { .. }
            | InvalidCancellationHeight { .. } => RejectionClass::NotValid,
        }
    }
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::NotYetEnabled {
                activation_height,
                current_height,
            } => {
                write!(
                    f,
                    "mixing not enabled until height {activation_height} (now {current_height})"
                )
            }
            StateError::MixNotFound { mix_id } => {
                write!(f, "mix not found: {}", hex(&mix_id[..4]))
            }
            StateError::WrongStage { mix_id, stage } => {
                write!(f, "mix {} in stage {:?} does not accept this event", hex(&mix_id[..4]), stage)
            }
            StateError::NotRegistered { mix_id, account } => {
                write!(
                    f,
                    "account {} is not registered for mix {}",
                    hex(&account[..4]),
                    hex(&mix_id[..4])
                )
            }
            StateError::AlreadyRegistered { mix_id, account } => {
                write!(
                    f,
                    "account {} is already registered for mix {}",
                    hex(&account[..4]),
                    hex(&mix_id[..4])
                )
            }
            StateError::MixFull { mix_id } => {
                write!(f, "mix {} has no open slots", hex(&mix_id[..4]))
            }
            StateError::NotAssignee { mix_id, account } => {
                write!(
                    f,
                    "account {} is not assigned to relay mix {}",
                    hex(&account[..4]),
                    hex(&mix_id[..4])
                )
            }
            StateError::PreviousHashMismatch { mix_id } => {
                write!(f, "previous commitment mismatch for mix {}", hex(&mix_id[..4]))
            }
            StateError::InvalidDataCount { provided, expected } => {
                write!(f, "invalid data blob count {provided}, expected {expected}")
            }
            StateError::DataTooShort { length } => {
                write!(f, "data blob of {length} bytes is below the 32-byte minimum")
            }
            StateError::InvalidParticipantTransition { account, from, to } => {
                write!(
                    f,
                    "participant {} in state {:?} cannot become {:?}",
                    hex(&account[..4]),
                    from,
                    to
                )
            }
            StateError::FinalHashMismatch { mix_id } => {
                write!(f, "final commitment mismatch for mix {}", hex(&mix_id[..4]))
            }
            StateError::CommitmentMismatch { mix_id, account } => {
                write!(
                    f,
                    "disputed commitment of {} does not match stored one for mix {}",
                    hex(&account[..4]),
                    hex(&mix_id[..4])
                )
            }
            StateError::WrongCanceller { mix_id, account } => {
                write!(
                    f,
                    "mix {} is not currently being cancelled by account {}",
                    hex(&mix_id[..4]),
                    hex(&account[..4])
                )
            }
            StateError::InvalidKeySeedCount { provided, expected } => {
                write!(f, "invalid number of revealed key seeds {provided}, expected 0 or {expected}")
            }
            StateError::InvalidKeySeedLength { length } => {
                write!(f, "key seed of {length} bytes is not exactly 32 bytes")
            }
            StateError::InvalidParticipantCount { count, min, max } => {
                write!(f, "participant count {count} is not between {min} and {max}")
            }
            StateError::InvalidAmount { amount, min, max } => {
                write!(f, "amount {amount} is not between {min} and {max}")
            }
            StateError::UnknownAsset { holding_id } => {
                write!(f, "unknown asset {}", hex(&holding_id[..4]))
            }
            StateError::UnknownCurrency { holding_id } => {
                write!(f, "unknown currency {}", hex(&holding_id[..4]))
            }
            StateError::CurrencyInactive { holding_id } => {
                write!(f, "currency {} is not active", hex(&holding_id[..4]))
            }
            StateError::InvalidCancellationHeight { height, current } => {
                write!(f, "cancellation height {height} is not above current height {current}")
            }
            StateError::DuplicateInBlock { kind } => {
                write!(f, "duplicate {kind:?} event in block")
            }
        }
    }
}

impl std::error::Error for StateError {}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Helper to format bytes as hex.
fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
