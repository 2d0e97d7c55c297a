//! Execution context and protocol configuration.

/// Default minimum number of participants per mix.
pub const DEFAULT_MIN_PARTICIPANTS: u16 = 3;

/// Default maximum number of participants per mix.
pub const DEFAULT_MAX_PARTICIPANTS: u16 = 30;

/// Default native-coin deposit locked when mixing a non-native holding,
/// and the minimum amount for a native-coin mix (base units, 8 decimals).
pub const DEFAULT_DEPOSIT: u64 = 1_000 * 100_000_000;

/// Default upper bound on a native-coin mix amount.
pub const DEFAULT_MAX_COIN_BALANCE: u64 = 1_000_000_000 * 100_000_000;

/// Default upper bound on a currency mix amount.
pub const DEFAULT_MAX_CURRENCY_SUPPLY: u64 = 1_000_000_000 * 100_000_000;

/// Global protocol bounds consulted by validation.
#[derive(Clone, Debug)]
pub struct ProtocolConfig {
    /// Height at which mixing activates; events below it are not yet valid.
    pub activation_height: u64,
    /// Inclusive lower bound on participant count.
    pub min_participants: u16,
    /// Inclusive upper bound on participant count.
    pub max_participants: u16,
    /// Native-coin deposit for non-native holdings; also the minimum
    /// native mix amount.
    pub deposit: u64,
    /// Upper bound on native mix amounts.
    pub max_coin_balance: u64,
    /// Upper bound on currency mix amounts.
    pub max_currency_supply: u64,
}

impl ProtocolConfig {
    /// Mainnet defaults.
    pub fn mainnet(activation_height: u64) -> Self {
        Self {
            activation_height,
            min_participants: DEFAULT_MIN_PARTICIPANTS,
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            deposit: DEFAULT_DEPOSIT,
            max_coin_balance: DEFAULT_MAX_COIN_BALANCE,
            max_currency_supply: DEFAULT_MAX_CURRENCY_SUPPLY,
        }
    }

    /// Devnet configuration: active from genesis with a small deposit.
    pub fn devnet() -> Self {
        Self {
            activation_height: 0,
            min_participants: DEFAULT_MIN_PARTICIPANTS,
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            deposit: 10,
            max_coin_balance: DEFAULT_MAX_COIN_BALANCE,
            max_currency_supply: DEFAULT_MAX_CURRENCY_SUPPLY,
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::mainnet(0)
    }
}

/// Context carrying block-level information into validation and apply.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    /// Current ledger height.
    pub height: u64,
    /// Protocol bounds.
    pub config: ProtocolConfig,
}

impl ExecutionContext {
    /// Context at the given height with default configuration.
    pub fn new(height: u64) -> Self {
        Self {
            height,
            config: ProtocolConfig::default(),
        }
    }

    /// Context with an explicit configuration.
    pub fn with_config(height: u64, config: ProtocolConfig) -> Self {
        Self { height, config }
    }

    /// Same configuration at another height.
    pub fn at_height(&self, height: u64) -> Self {
        Self {
            height,
            config: self.config.clone(),
        }
    }
}
