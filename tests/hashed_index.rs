// HashedIndex public API suite.
//
// Invariants exercised:
// - Uniqueness: duplicate insert fails without changing the stored value.
// - Round trip: insert followed by remove restores every other key's presence.
// - Shape: slot count is prime, never zero, and bounds the load after
//   every operation; len equals the number of keys `contains` reports.
// - Configuration: custom hash parameters and initial sizes are honored.
use dense_graph::{ConfigError, HashParams, HashedIndex, IndexConfig, IndexKey, InsertError};

fn is_prime(n: usize) -> bool {
    n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

// Test: unique keys policy.
// Verifies: DuplicateKey error; first value retained.
#[test]
fn duplicate_insert_rejected() {
    let mut m = HashedIndex::new();
    m.insert("dup".to_string(), 1).unwrap();
    assert_eq!(m.insert("dup".to_string(), 2), Err(InsertError::DuplicateKey));
    assert_eq!(m.get("dup"), Some(&1));
    assert_eq!(m.len(), 1);
}

// Test: slot count stays prime and load-bounded through growth and shrink.
#[test]
fn slot_count_prime_through_resizes() {
    let mut m: HashedIndex<i64, i64> = HashedIndex::new();
    for k in -500..500 {
        m.insert(k, -k).unwrap();
        assert!(is_prime(m.slot_count()));
        assert!(m.len() * 2 <= m.slot_count());
    }
    let grown = m.slot_count();
    for k in -500..500 {
        assert_eq!(m.remove(&k), Some(-k));
        assert!(is_prime(m.slot_count()));
        assert!(m.slot_count() >= 3);
    }
    assert!(m.is_empty());
    assert!(m.slot_count() < grown);
}

// Test: round trip leaves other keys untouched.
#[test]
fn insert_then_remove_restores_presence() {
    let mut m: HashedIndex<String, ()> = HashedIndex::new();
    let words = ["alpha", "beta", "gamma", "delta", "epsilon"];
    for w in words {
        m.insert(w.to_string(), ()).unwrap();
    }
    let probe = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta"];
    let before: Vec<bool> = probe.iter().map(|w| m.contains(*w)).collect();
    m.insert("theta".to_string(), ()).unwrap();
    assert!(m.remove("theta").is_some());
    let after: Vec<bool> = probe.iter().map(|w| m.contains(*w)).collect();
    assert_eq!(before, after);
    assert_eq!(m.len(), words.len());
}

// Test: size parity with `contains` after mixed operations.
#[test]
fn len_matches_contains_count() {
    let mut m: HashedIndex<u32, u32> = HashedIndex::new();
    for k in 0..3000u32 {
        m.insert(k.wrapping_mul(2654435761), k).unwrap();
        if k % 3 == 0 {
            m.remove(&(k / 2).wrapping_mul(2654435761));
        }
    }
    let present = (0..3000u32)
        .filter(|k| m.contains(&k.wrapping_mul(2654435761)))
        .count();
    assert_eq!(m.len(), present);
    assert_eq!(m.iter().count(), present);
}

// Test: custom parameters are used and still resolve every key.
#[test]
fn custom_params_and_initial_size() {
    let cfg = IndexConfig::default()
        .with_initial_slots(100)
        .with_params(HashParams { a: 31, b: 7, string_base: 131 });
    let mut m: HashedIndex<&str, usize> = HashedIndex::with_config(cfg).unwrap();
    assert_eq!(m.slot_count(), 101);
    assert_eq!(m.params().string_base, 131);
    for (i, w) in ["x", "yy", "zzz"].iter().enumerate() {
        m.insert(*w, i).unwrap();
    }
    assert_eq!(m.get(&"yy"), Some(&1));
    assert_eq!("ab".fold(m.params()), 131 * 97 + 98);

    let err = HashedIndex::<u8, ()>::with_config(
        IndexConfig::default().with_params(HashParams { a: 10, b: 1, string_base: 37 }),
    );
    assert!(matches!(err, Err(ConfigError::EvenMultiplier(10))));
}

// Test: user-defined keys plug in through IndexKey.
#[test]
fn user_key_type() {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    struct Cell {
        row: u32,
        col: u32,
    }
    impl IndexKey for Cell {
        fn fold(&self, _params: &HashParams) -> u64 {
            ((self.row as u64) << 32) | self.col as u64
        }
    }
    let mut m = HashedIndex::new();
    for row in 0..20 {
        for col in 0..20 {
            m.insert(Cell { row, col }, row * col).unwrap();
        }
    }
    assert_eq!(m.len(), 400);
    assert_eq!(m.get(&Cell { row: 7, col: 6 }), Some(&42));
    assert!(m.max_chain_len() <= 8, "max chain {}", m.max_chain_len());
}
