// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Group units by phone sequence and order the groups by trie id.
//!
//! The runtime looks a phone sequence up in the trie, gets an id, and reads
//! `group[id]`. So the group array is only correct if position `i` holds the
//! group for the key the trie numbered `i`. Building checks that the trie
//! handed out exactly `0..key_count` before producing that array.
//!
//! Template voices group template units instead. Each template contributes
//! one segment per instance, `[template index, instance index]`. Once the
//! segments are in trie-id order they are resolved to the instances'
//! reference lists, which is what the template section stores.

use std::collections::HashMap;

use super::{PhoneKey, PhoneTrie};
use crate::error::Result;
use crate::types::NonUniformUnit;

/// `[template index, instance index]` of one template instance.
pub type Segment = [i32; 2];

/// Trie plus trie-id-ordered groups.
#[derive(Debug, Clone)]
pub struct UnitGrouping {
    trie: PhoneTrie,
    /// Normal mode: unit indices per trie id
    unit_groups: Vec<Vec<i32>>,
    /// Template mode: segments per trie id
    template_segments: Vec<Vec<Segment>>,
    /// Template mode: reference lists per trie id, per segment
    template_index: Vec<Vec<Vec<i32>>>,
}

fn phone_key(unit: &NonUniformUnit) -> Result<PhoneKey> {
    PhoneKey::new(&unit.phone_ids())
}

/// Invert a key → trie id assignment into a dense id-ordered permutation.
///
/// Panics if the ids are not exactly `0..keys.len()`; the trie guarantees
/// this, so a failure here is a bug in the trie, not bad input.
fn trie_order(trie: &PhoneTrie, keys: &[PhoneKey]) -> Vec<usize> {
    assert_eq!(trie.key_count(), keys.len(), "trie key count mismatch");
    let mut slot_of_id = vec![usize::MAX; keys.len()];
    for (slot, key) in keys.iter().enumerate() {
        let id = trie
            .key_id(key.phones())
            .map(|id| id as usize)
            .filter(|&id| id < keys.len());
        let Some(id) = id else {
            panic!("trie assigned no valid id to key {:?}", key.phones());
        };
        assert_eq!(slot_of_id[id], usize::MAX, "trie id {} assigned twice", id);
        slot_of_id[id] = slot;
    }
    slot_of_id
}

impl UnitGrouping {
    /// Group normal units by phone sequence.
    pub fn build(units: &[NonUniformUnit]) -> Result<Self> {
        let mut keys: Vec<PhoneKey> = Vec::new();
        let mut groups: Vec<Vec<i32>> = Vec::new();
        let mut slot_by_key: HashMap<PhoneKey, usize> = HashMap::new();

        for (i, unit) in units.iter().enumerate() {
            let key = phone_key(unit)?;
            let slot = *slot_by_key.entry(key.clone()).or_insert_with(|| {
                keys.push(key);
                groups.push(Vec::new());
                keys.len() - 1
            });
            groups[slot].push(i as i32);
        }

        let trie = PhoneTrie::build(&keys);
        let order = trie_order(&trie, &keys);
        let unit_groups = order
            .into_iter()
            .map(|slot| std::mem::take(&mut groups[slot]))
            .collect();

        Ok(Self {
            trie,
            unit_groups,
            template_segments: Vec::new(),
            template_index: Vec::new(),
        })
    }

    /// Group template units by phone sequence.
    pub fn build_templates(templates: &[NonUniformUnit]) -> Result<Self> {
        let mut keys: Vec<PhoneKey> = Vec::new();
        let mut groups: Vec<Vec<Segment>> = Vec::new();
        let mut slot_by_key: HashMap<PhoneKey, usize> = HashMap::new();

        for (t, template) in templates.iter().enumerate() {
            let key = phone_key(template)?;
            let slot = *slot_by_key.entry(key.clone()).or_insert_with(|| {
                keys.push(key);
                groups.push(Vec::new());
                keys.len() - 1
            });
            groups[slot].extend((0..template.template_instances.len()).map(|i| [t as i32, i as i32]));
        }

        let trie = PhoneTrie::build(&keys);
        let order = trie_order(&trie, &keys);
        let template_segments: Vec<Vec<Segment>> = order
            .into_iter()
            .map(|slot| std::mem::take(&mut groups[slot]))
            .collect();
        let template_index = template_segments
            .iter()
            .map(|segments| {
                segments
                    .iter()
                    .map(|&[t, i]| templates[t as usize].template_instances[i as usize].clone())
                    .collect()
            })
            .collect();

        Ok(Self {
            trie,
            unit_groups: Vec::new(),
            template_segments,
            template_index,
        })
    }

    pub fn trie(&self) -> &PhoneTrie {
        &self.trie
    }

    /// Unit indices per trie id (normal mode).
    pub fn unit_groups(&self) -> &[Vec<i32>] {
        &self.unit_groups
    }

    /// Segments per trie id (template mode).
    pub fn template_segments(&self) -> &[Vec<Segment>] {
        &self.template_segments
    }

    /// Nested `[trie id][segment][reference]` structure (template mode).
    pub fn template_index(&self) -> &[Vec<Vec<i32>>] {
        &self.template_index
    }

    /// Split into the trie and the normal-mode groups.
    pub fn into_parts(self) -> (PhoneTrie, Vec<Vec<i32>>, Vec<Vec<Vec<i32>>>) {
        (self.trie, self.unit_groups, self.template_index)
    }
}
