//! Phone trie and unit grouping tests.

use nusfont::trie::{PhoneKey, PhoneTrie, UnitGrouping, MAX_KEY_PHONES};
use nusfont::FontError;

use crate::common::unit;

fn keys(seqs: &[&[u16]]) -> Vec<PhoneKey> {
    seqs.iter().map(|s| PhoneKey::new(s).unwrap()).collect()
}

// ============================================================================
// PHONE KEYS
// ============================================================================

#[test]
fn test_empty_key_is_rejected() {
    assert!(matches!(PhoneKey::new(&[]), Err(FontError::DataShape(_))));
}

#[test]
fn test_key_length_limit() {
    assert!(PhoneKey::new(&vec![1; MAX_KEY_PHONES]).is_ok());
    assert!(matches!(
        PhoneKey::new(&vec![1; MAX_KEY_PHONES + 1]),
        Err(FontError::DataShape(_))
    ));
}

// ============================================================================
// TRIE
// ============================================================================

#[test]
fn test_ids_follow_lexicographic_order() {
    let keys = keys(&[&[3], &[1, 2], &[1], &[2, 9, 9]]);
    let trie = PhoneTrie::build(&keys);

    assert_eq!(trie.key_count(), 4);
    assert_eq!(trie.key_id(&[1]), Some(0));
    assert_eq!(trie.key_id(&[1, 2]), Some(1));
    assert_eq!(trie.key_id(&[2, 9, 9]), Some(2));
    assert_eq!(trie.key_id(&[3]), Some(3));
}

#[test]
fn test_prefixes_and_strangers_are_not_keys() {
    let keys = keys(&[&[2, 9, 9]]);
    let trie = PhoneTrie::build(&keys);

    assert_eq!(trie.key_id(&[2, 9]), None);
    assert_eq!(trie.key_id(&[2, 9, 9, 9]), None);
    assert_eq!(trie.key_id(&[7]), None);
}

#[test]
fn test_duplicate_keys_share_an_id() {
    let keys = keys(&[&[4, 4], &[4, 4], &[5]]);
    let trie = PhoneTrie::build(&keys);
    assert_eq!(trie.key_count(), 2);
    assert_eq!(trie.keys(), vec![(vec![4, 4], 0), (vec![5], 1)]);
}

#[test]
fn test_blob_is_searchable_after_reload() {
    let keys = keys(&[&[10, 20], &[10, 21], &[11]]);
    let trie = PhoneTrie::build(&keys);
    let bytes = trie.to_bytes();
    assert_eq!(bytes.len(), 4 + trie.node_count() * 16);

    let reloaded = PhoneTrie::from_bytes(&bytes).unwrap();
    assert_eq!(reloaded, trie);
    assert_eq!(reloaded.key_id(&[10, 21]), Some(1));
}

#[test]
fn test_blob_layout_is_little_endian_nodes() {
    let keys = keys(&[&[7]]);
    let bytes = PhoneTrie::build(&keys).to_bytes();

    let words: Vec<i32> = bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    // node count, root (children 1..2, no key), leaf (phone 7, key 0)
    assert_eq!(words, vec![2, 1, 1, 0, -1, 2, 0, 7, 0]);
}

#[test]
fn test_truncated_blob_is_corrupt() {
    let keys = keys(&[&[10, 20]]);
    let bytes = PhoneTrie::build(&keys).to_bytes();
    assert!(matches!(
        PhoneTrie::from_bytes(&bytes[..bytes.len() - 1]),
        Err(FontError::Corrupt(_))
    ));
}

#[test]
fn test_child_pointer_out_of_range_is_corrupt() {
    let keys = keys(&[&[10]]);
    let mut bytes = PhoneTrie::build(&keys).to_bytes();
    // Root's firstChild
    bytes[4..8].copy_from_slice(&99u32.to_le_bytes());
    assert!(PhoneTrie::from_bytes(&bytes).is_err());
}

// ============================================================================
// GROUPING
// ============================================================================

/// Units with phones [1,2], [1,2], [3] give two groups, ordered by trie id.
#[test]
fn test_units_group_by_phone_sequence() {
    let units = vec![unit(&[1, 2], 0), unit(&[1, 2], 0), unit(&[3], 0)];
    let grouping = UnitGrouping::build(&units).unwrap();

    assert_eq!(grouping.trie().key_count(), 2);
    let id_12 = grouping.trie().key_id(&[1, 2]).unwrap() as usize;
    let id_3 = grouping.trie().key_id(&[3]).unwrap() as usize;
    assert_eq!(grouping.unit_groups()[id_12], vec![0, 1]);
    assert_eq!(grouping.unit_groups()[id_3], vec![2]);
}

#[test]
fn test_group_order_ignores_input_order() {
    let units = vec![unit(&[9], 0), unit(&[1], 0), unit(&[9], 0), unit(&[5], 0)];
    let grouping = UnitGrouping::build(&units).unwrap();
    assert_eq!(grouping.unit_groups(), &[vec![1], vec![3], vec![0, 2]]);
}

#[test]
fn test_unit_without_phones_is_a_shape_error() {
    let units = vec![unit(&[1], 0), unit(&[], 0)];
    assert!(matches!(UnitGrouping::build(&units), Err(FontError::DataShape(_))));
}

#[test]
fn test_template_segments_list_every_instance() {
    let mut t0 = unit(&[5, 6], 0);
    t0.template_instances = vec![vec![0, 1], vec![1]];
    let mut t1 = unit(&[2], 0);
    t1.template_instances = vec![vec![3]];
    let mut t2 = unit(&[5, 6], 0);
    t2.template_instances = vec![vec![2]];

    let grouping = UnitGrouping::build_templates(&[t0, t1, t2]).unwrap();
    let id = grouping.trie().key_id(&[5, 6]).unwrap() as usize;

    assert_eq!(grouping.template_segments()[id], vec![[0, 0], [0, 1], [2, 0]]);
    assert_eq!(grouping.template_index()[id], vec![vec![0, 1], vec![1], vec![2]]);
    assert!(grouping.unit_groups().is_empty());
}
