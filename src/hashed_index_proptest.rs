#![cfg(test)]

// Property tests for HashedIndex kept inside the crate so they can inspect
// chain lengths and slot counts alongside the public surface.

use crate::hash_func::{HashParams, IndexKey};
use crate::hashed_index::HashedIndex;
use crate::error::InsertError;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl IndexKey for Key {
    fn fold(&self, params: &HashParams) -> u64 {
        self.0.as_str().fold(params)
    }
}

// Key whose fold is constant: every entry shares one chain.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
struct Colliding(String);
impl IndexKey for Colliding {
    fn fold(&self, _params: &HashParams) -> u64 {
        7
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Shared post-conditions on the table shape.
fn check_shape<K: IndexKey, V>(sut: &HashedIndex<K, V>) -> Result<(), TestCaseError> {
    prop_assert!(sut.slot_count() >= 3);
    prop_assert!(sut.len() * 2 <= sut.slot_count(), "load bound violated");
    prop_assert_eq!(sut.chain_lengths().sum::<usize>(), sut.len());
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Duplicate keys are rejected; the stored value is unchanged.
// - `get`/`contains` parity with the model, including borrowed `&str` lookups.
// - `remove` returns the model's value and the key disappears.
// - `iter` yields each live entry exactly once.
// - `len`, load bound and chain totals hold after every op, across resizes.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: HashedIndex<Key, i32> = HashedIndex::new();
        let mut model: HashMap<Key, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = Key(pool[i].clone());
                    let already = model.contains_key(&k);
                    match sut.insert(k.clone(), v) {
                        Ok(()) => {
                            prop_assert!(!already, "insert must fail on duplicate");
                            model.insert(k, v);
                        }
                        Err(InsertError::DuplicateKey) => {
                            prop_assert!(already, "duplicate error only when key exists");
                            prop_assert_eq!(sut.get(&k), model.get(&k));
                        }
                        Err(e) => prop_assert!(false, "unexpected error: {:?}", e),
                    }
                }
                OpI::Remove(i) => {
                    let k = Key(pool[i].clone());
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                    prop_assert!(!sut.contains(&k));
                }
                OpI::Get(i) => {
                    let k = Key(pool[i].clone());
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                }
                OpI::Contains(s) => {
                    let has = sut.contains(s.as_str());
                    let has_model = model.keys().any(|k| k.0 == s);
                    prop_assert_eq!(has, has_model);
                }
                OpI::Mutate(i, d) => {
                    let k = Key(pool[i].clone());
                    if let Some(v) = sut.get_mut(&k) {
                        *v = v.saturating_add(d);
                        let mv = model.get_mut(&k);
                        prop_assert!(mv.is_some(), "sut has key the model lacks");
                        if let Some(mv) = mv {
                            *mv = mv.saturating_add(d);
                        }
                    } else {
                        prop_assert!(!model.contains_key(&k));
                    }
                }
                OpI::Iterate => {
                    let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
                    let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                    prop_assert_eq!(sut.iter().count(), model.len());
                    prop_assert_eq!(s_keys, m_keys);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            check_shape(&sut)?;
        }
    }
}

// Property: Same model equivalence when every key folds to the same value,
// so all entries share a chain and lookups rely on key equality alone.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: HashedIndex<Colliding, i32> = HashedIndex::new();
        let mut model: HashMap<Colliding, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = Colliding(pool[i].clone());
                    let already = model.contains_key(&k);
                    match sut.insert(k.clone(), v) {
                        Ok(()) => {
                            prop_assert!(!already);
                            model.insert(k, v);
                        }
                        Err(_) => prop_assert!(already),
                    }
                }
                OpI::Remove(i) => {
                    let k = Colliding(pool[i].clone());
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                }
                OpI::Get(i) | OpI::Mutate(i, _) => {
                    let k = Colliding(pool[i].clone());
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                }
                OpI::Contains(s) => {
                    let k = Colliding(s);
                    prop_assert_eq!(sut.contains(&k), model.contains_key(&k));
                }
                OpI::Iterate => {
                    let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
                    let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                    prop_assert_eq!(s_keys, m_keys);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.max_chain_len(), model.len());
            check_shape(&sut)?;
        }
    }
}

// Property: `len` equals the number of keys `contains` reports, and chains
// stay short for 10k random integer keys with interleaved removals.
proptest! {
    #![proptest_config(ProptestConfig { cases: 4, .. ProptestConfig::default() })]
    #[test]
    fn prop_size_matches_contains_and_chains_bounded(
        keys in proptest::collection::vec(any::<u64>(), 10_000),
        drop_every in 2usize..7,
    ) {
        let mut sut: HashedIndex<u64, ()> = HashedIndex::new();
        let mut model: BTreeSet<u64> = BTreeSet::new();
        for (i, &k) in keys.iter().enumerate() {
            let fresh = model.insert(k);
            prop_assert_eq!(sut.insert(k, ()).is_ok(), fresh);
            if i % drop_every == 0 {
                let victim = keys[i / 2];
                prop_assert_eq!(sut.remove(&victim).is_some(), model.remove(&victim));
            }
        }
        let present = keys.iter().collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|k| sut.contains(*k))
            .count();
        prop_assert_eq!(sut.len(), present);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.max_chain_len() <= 10, "max chain {}", sut.max_chain_len());
        check_shape(&sut)?;
    }
}
