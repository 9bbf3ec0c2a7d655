//! Construction parameters for `HashedIndex`.

use crate::error::ConfigError;
use crate::hash_func::HashParams;

/// Default number of buckets in a fresh index.
pub const DEFAULT_INITIAL_SLOTS: usize = 3;

/// Default upper bound of the first prime sieve.
pub const DEFAULT_SIEVE_BOUND: usize = 1000;

/// Tunables for a `HashedIndex`. Build with `IndexConfig::default()` and the
/// `with_*` setters; `HashedIndex::with_config` validates the result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Requested bucket count; rounded up to a prime. Also the floor below
    /// which the table never shrinks.
    pub initial_slots: usize,
    /// First sieve bound. Doubled on demand.
    pub sieve_bound: usize,
    pub params: HashParams,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_slots: DEFAULT_INITIAL_SLOTS,
            sieve_bound: DEFAULT_SIEVE_BOUND,
            params: HashParams::default(),
        }
    }
}

impl IndexConfig {
    pub fn with_initial_slots(mut self, slots: usize) -> Self {
        self.initial_slots = slots;
        self
    }

    pub fn with_sieve_bound(mut self, bound: usize) -> Self {
        self.sieve_bound = bound;
        self
    }

    pub fn with_params(mut self, params: HashParams) -> Self {
        self.params = params;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_slots == 0 {
            return Err(ConfigError::ZeroSlots);
        }
        if self.sieve_bound < 2 {
            return Err(ConfigError::SieveTooSmall(self.sieve_bound));
        }
        if self.params.a == 0 {
            return Err(ConfigError::ZeroMultiplier);
        }
        if self.params.a % 2 == 0 {
            return Err(ConfigError::EvenMultiplier(self.params.a));
        }
        if self.params.b == 0 {
            return Err(ConfigError::ZeroOffset);
        }
        Ok(())
    }
}
