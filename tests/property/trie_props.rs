//! Trie id and grouping properties.

use std::collections::BTreeSet;

use nusfont::trie::{PhoneKey, PhoneTrie, UnitGrouping};
use proptest::prelude::*;

use crate::common::unit;

fn phones_strategy() -> impl Strategy<Value = Vec<u16>> {
    // Small alphabet so keys share prefixes
    prop::collection::vec(0u16..6, 1..5)
}

proptest! {
    /// Ids are exactly `0..key_count`, assigned in lexicographic key order.
    #[test]
    fn prop_ids_dense_and_lexicographic(seqs in prop::collection::vec(phones_strategy(), 1..30)) {
        let keys: Vec<PhoneKey> = seqs.iter().map(|s| PhoneKey::new(s).unwrap()).collect();
        let trie = PhoneTrie::build(&keys);

        let distinct: BTreeSet<Vec<u16>> = seqs.iter().cloned().collect();
        prop_assert_eq!(trie.key_count(), distinct.len());
        for (expected, key) in distinct.iter().enumerate() {
            prop_assert_eq!(trie.key_id(key), Some(expected as u32));
        }
    }

    /// The serialized blob answers every query the in-memory trie does.
    #[test]
    fn prop_blob_reload_preserves_lookups(
        seqs in prop::collection::vec(phones_strategy(), 1..20),
        probes in prop::collection::vec(phones_strategy(), 0..20),
    ) {
        let keys: Vec<PhoneKey> = seqs.iter().map(|s| PhoneKey::new(s).unwrap()).collect();
        let trie = PhoneTrie::build(&keys);
        let reloaded = PhoneTrie::from_bytes(&trie.to_bytes()).unwrap();
        for probe in seqs.iter().chain(&probes) {
            prop_assert_eq!(reloaded.key_id(probe), trie.key_id(probe));
        }
    }

    /// Every unit lands in exactly one group, the one its phones look up to.
    #[test]
    fn prop_grouping_partitions_units(seqs in prop::collection::vec(phones_strategy(), 1..30)) {
        let units: Vec<_> = seqs.iter().map(|s| unit(s, 0)).collect();
        let grouping = UnitGrouping::build(&units).unwrap();

        let mut seen = vec![0usize; units.len()];
        for group in grouping.unit_groups() {
            prop_assert!(group.windows(2).all(|w| w[0] < w[1]));
            for &i in group {
                seen[i as usize] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&n| n == 1));

        for (i, s) in seqs.iter().enumerate() {
            let id = grouping.trie().key_id(s).unwrap() as usize;
            prop_assert!(grouping.unit_groups()[id].contains(&(i as i32)));
        }
    }

    /// Arbitrary bytes never panic the blob parser.
    #[test]
    fn prop_blob_parser_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
        if let Ok(trie) = PhoneTrie::from_bytes(&bytes) {
            let _ = trie.keys();
            let _ = trie.key_id(&[0, 1, 2]);
        }
    }
}
