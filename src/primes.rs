//! Lazily extended table of primes used to size the bucket array.

/// Ascending primes found so far by a sieve of Eratosthenes.
///
/// The sieve bound doubles whenever a prime larger than the last known one
/// is requested. Primes already found are kept; a re-sieve only appends the
/// primes above the current largest entry.
#[derive(Debug, Clone)]
pub struct PrimeTable {
    primes: Vec<usize>,
    bound: usize,
}

impl PrimeTable {
    /// Sieve every prime `<= bound`. `bound` is raised to 2 if smaller.
    pub fn new(bound: usize) -> Self {
        let mut table = Self {
            primes: Vec::new(),
            bound: bound.max(2),
        };
        table.sieve();
        table
    }

    /// The current sieve bound.
    pub fn bound(&self) -> usize {
        self.bound
    }

    /// The largest prime found so far.
    pub fn largest(&self) -> usize {
        // The table always holds at least the prime 2.
        self.primes.last().copied().unwrap_or(2)
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// The smallest prime `>= n`, extending the sieve as needed.
    ///
    /// Returns `None` when the sieve bound would have to exceed `usize`.
    pub fn next_prime(&mut self, n: usize) -> Option<usize> {
        while self.largest() < n {
            self.bound = self.bound.checked_mul(2)?;
            self.sieve();
        }
        let pos = self.primes.partition_point(|&p| p < n);
        self.primes.get(pos).copied()
    }

    /// The smallest known prime `>= n` without extending the sieve.
    pub fn next_known_prime(&self, n: usize) -> Option<usize> {
        let pos = self.primes.partition_point(|&p| p < n);
        self.primes.get(pos).copied()
    }

    /// Push the bound to where one more doubling overflows `usize`.
    #[cfg(test)]
    pub(crate) fn saturate_bound(&mut self) {
        self.bound = usize::MAX / 2 + 1;
    }

    fn sieve(&mut self) {
        let n = self.bound;
        let mut composite = vec![false; n + 1];
        let mut p = 2usize;
        while p.saturating_mul(p) <= n {
            if !composite[p] {
                let mut i = p * p;
                while i <= n {
                    composite[i] = true;
                    i += p;
                }
            }
            p += 1;
        }
        let start = match self.primes.last() {
            Some(&last) => last + 1,
            None => 2,
        };
        self.primes
            .extend((start..=n).filter(|&candidate| !composite[candidate]));
    }
}

impl Default for PrimeTable {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SIEVE_BOUND)
    }
}
