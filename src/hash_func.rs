//! Universal hashing over a Mersenne prime.
//!
//! A key is first folded to a `u64` by its `IndexKey` impl; the folded
//! value is then mapped to a bucket with
//! `h(k) = ((a * k + b) mod M) mod slots`, where `M = 2^61 - 1`.
//! The parameters are fixed for the lifetime of an index, so a given key
//! always lands in the same bucket for a given slot count.

/// Exponent of the Mersenne prime used as the universal-hash modulus.
pub const MERSENNE_EXPONENT: u32 = 61;

/// `2^61 - 1`. Larger than any reachable slot count, so every bucket can
/// receive entries.
pub const MERSENNE_PRIME: u64 = (1 << MERSENNE_EXPONENT) - 1;

/// `n mod (2^61 - 1)` via repeated bit splitting.
#[inline]
pub fn mersenne_mod(n: u128) -> u64 {
    let m = MERSENNE_PRIME as u128;
    let mut n = n;
    while n > m {
        n = (n >> MERSENNE_EXPONENT) + (n & m);
    }
    // `M` itself is congruent to zero; the split leaves it fixed.
    if n == m {
        0
    } else {
        n as u64
    }
}

/// Constants of the universal hash family. Chosen once per index and
/// never re-randomized on resize.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HashParams {
    /// Multiplier; must be odd.
    pub a: u64,
    /// Additive offset.
    pub b: u64,
    /// Base of the polynomial fold applied to string keys.
    pub string_base: u64,
}

impl HashParams {
    pub const DEFAULT: HashParams = HashParams {
        a: 53,
        b: 97,
        string_base: 37,
    };

    /// Map an already folded key to a bucket in `[0, slots)`.
    #[inline]
    pub fn bucket(&self, folded: u64, slots: usize) -> usize {
        debug_assert!(slots > 0, "bucket array is never empty");
        let hv = mersenne_mod(self.a as u128 * folded as u128 + self.b as u128);
        (hv % slots as u64) as usize
    }

    /// Fold `key` and map it to a bucket in `[0, slots)`.
    #[inline]
    pub fn bucket_of<Q>(&self, key: &Q, slots: usize) -> usize
    where
        Q: ?Sized + IndexKey,
    {
        self.bucket(key.fold(self), slots)
    }
}

impl Default for HashParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Keys that can be stored in a `HashedIndex`.
///
/// `fold` reduces the key to an integer the universal hash consumes. Types
/// related through `Borrow` (e.g. `String` and `str`) must fold equal values
/// to the same integer.
pub trait IndexKey: Eq {
    fn fold(&self, params: &HashParams) -> u64;
}

macro_rules! impl_index_key_for_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl IndexKey for $t {
                #[inline]
                fn fold(&self, _params: &HashParams) -> u64 {
                    *self as u64
                }
            }
        )*
    };
}

impl_index_key_for_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl IndexKey for char {
    #[inline]
    fn fold(&self, _params: &HashParams) -> u64 {
        *self as u64
    }
}

impl IndexKey for str {
    fn fold(&self, params: &HashParams) -> u64 {
        self.bytes().fold(0u64, |hv, byte| {
            hv.wrapping_mul(params.string_base)
                .wrapping_add(byte as u64)
        })
    }
}

impl IndexKey for String {
    #[inline]
    fn fold(&self, params: &HashParams) -> u64 {
        self.as_str().fold(params)
    }
}

impl<T> IndexKey for &T
where
    T: ?Sized + IndexKey,
{
    #[inline]
    fn fold(&self, params: &HashParams) -> u64 {
        (**self).fold(params)
    }
}
