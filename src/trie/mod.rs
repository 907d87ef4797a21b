// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Compact phone-sequence trie.
//!
//! Units are looked up at runtime by their phone sequence. The trie maps each
//! distinct sequence to a dense integer id, and that id indexes the group
//! arrays the trie section writes next to it.
//!
//! Ids are assigned in lexicographic key order, so `0..key_count` with no
//! gaps. Nodes are laid out breadth-first with each node's children
//! contiguous and sorted by phone, which lets lookup binary-search a child
//! range at every level and lets the serialized blob be searched in place.
//!
//! # Wire Format
//!
//! ```text
//! nodeCount: u32
//! for each node (breadth-first, root first):
//!   firstChild: u32   (index of first child node)
//!   childCount: u32
//!   phone:      u32   (phone id on the edge into this node; 0 for root)
//!   keyId:      i32   (-1 when no key ends here)
//! ```

mod grouping;

pub use grouping::{Segment, UnitGrouping};

use std::collections::BTreeMap;
use std::io::Cursor;

use crate::binary::codec::{read_i32, read_u32};
use crate::error::{FontError, Result};

/// Longest phone sequence accepted as a key.
pub const MAX_KEY_PHONES: usize = 128;

/// A validated phone-sequence key (1..=128 phones).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhoneKey(Vec<u16>);

impl PhoneKey {
    pub fn new(phones: &[u16]) -> Result<Self> {
        if phones.is_empty() {
            return Err(FontError::shape("empty phone sequence"));
        }
        if phones.len() > MAX_KEY_PHONES {
            return Err(FontError::shape(format!(
                "phone sequence of {} phones exceeds {}",
                phones.len(),
                MAX_KEY_PHONES
            )));
        }
        Ok(Self(phones.to_vec()))
    }

    pub fn phones(&self) -> &[u16] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrieNode {
    first_child: u32,
    child_count: u32,
    phone: u32,
    key_id: i32,
}

impl TrieNode {
    const SIZE: usize = 16;
}

/// Breadth-first phone trie with dense key ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneTrie {
    nodes: Vec<TrieNode>,
    key_count: usize,
}

impl PhoneTrie {
    /// Build a trie over `keys`. Duplicate keys share one id.
    pub fn build<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a PhoneKey>,
    {
        // Pointer trie first, ids assigned after sorting
        struct BuildNode {
            children: BTreeMap<u16, usize>,
            key_id: i32,
        }

        let mut sorted: Vec<&PhoneKey> = keys.into_iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut arena = vec![BuildNode {
            children: BTreeMap::new(),
            key_id: -1,
        }];
        for (id, key) in sorted.iter().enumerate() {
            let mut cur = 0;
            for &phone in key.phones() {
                cur = match arena[cur].children.get(&phone) {
                    Some(&next) => next,
                    None => {
                        let next = arena.len();
                        arena.push(BuildNode {
                            children: BTreeMap::new(),
                            key_id: -1,
                        });
                        arena[cur].children.insert(phone, next);
                        next
                    }
                };
            }
            arena[cur].key_id = id as i32;
        }

        // Flatten breadth-first so each node's children are contiguous
        let mut order = vec![0usize];
        let mut nodes = vec![TrieNode {
            first_child: 0,
            child_count: 0,
            phone: 0,
            key_id: arena[0].key_id,
        }];
        let mut head = 0;
        while head < order.len() {
            let build = &arena[order[head]];
            nodes[head].first_child = order.len() as u32;
            nodes[head].child_count = build.children.len() as u32;
            for (&phone, &child) in &build.children {
                order.push(child);
                nodes.push(TrieNode {
                    first_child: 0,
                    child_count: 0,
                    phone: u32::from(phone),
                    key_id: arena[child].key_id,
                });
            }
            head += 1;
        }

        Self {
            nodes,
            key_count: sorted.len(),
        }
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Id of the key equal to `phones`, if registered.
    pub fn key_id(&self, phones: &[u16]) -> Option<u32> {
        let mut cur = 0usize;
        for &phone in phones {
            let node = self.nodes.get(cur)?;
            let first = node.first_child as usize;
            let children = self.nodes.get(first..first + node.child_count as usize)?;
            let pos = children
                .binary_search_by_key(&u32::from(phone), |c| c.phone)
                .ok()?;
            cur = first + pos;
        }
        let key_id = self.nodes.get(cur)?.key_id;
        u32::try_from(key_id).ok()
    }

    /// All registered keys with their ids, in id order.
    pub fn keys(&self) -> Vec<(Vec<u16>, u32)> {
        let mut out = Vec::with_capacity(self.key_count);
        let mut path = Vec::new();
        self.collect_keys(0, &mut path, &mut out);
        out.sort_by_key(|(_, id)| *id);
        out
    }

    fn collect_keys(&self, idx: usize, path: &mut Vec<u16>, out: &mut Vec<(Vec<u16>, u32)>) {
        let node = self.nodes[idx];
        if node.key_id >= 0 {
            out.push((path.clone(), node.key_id as u32));
        }
        let first = node.first_child as usize;
        for child in first..first + node.child_count as usize {
            path.push(self.nodes[child].phone as u16);
            self.collect_keys(child, path, out);
            path.pop();
        }
    }

    /// Serialize to the compact blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.nodes.len() * TrieNode::SIZE);
        buf.extend_from_slice(&(self.nodes.len() as u32).to_le_bytes());
        for node in &self.nodes {
            buf.extend_from_slice(&node.first_child.to_le_bytes());
            buf.extend_from_slice(&node.child_count.to_le_bytes());
            buf.extend_from_slice(&node.phone.to_le_bytes());
            buf.extend_from_slice(&node.key_id.to_le_bytes());
        }
        buf
    }

    /// Parse and validate a blob produced by [`PhoneTrie::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = Cursor::new(bytes);
        let node_count = read_u32(&mut r)? as usize;
        let expected = node_count
            .checked_mul(TrieNode::SIZE)
            .and_then(|n| n.checked_add(4))
            .ok_or_else(|| FontError::corrupt("trie node count overflows"))?;
        if node_count == 0 || expected != bytes.len() {
            return Err(FontError::corrupt(format!(
                "trie blob is {} bytes, {} nodes need {}",
                bytes.len(),
                node_count,
                expected
            )));
        }

        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            nodes.push(TrieNode {
                first_child: read_u32(&mut r)?,
                child_count: read_u32(&mut r)?,
                phone: read_u32(&mut r)?,
                key_id: read_i32(&mut r)?,
            });
        }

        let mut key_count = 0usize;
        for (i, node) in nodes.iter().enumerate() {
            // Children always come after their parent in breadth-first order
            let end = u64::from(node.first_child) + u64::from(node.child_count);
            if node.child_count > 0 && (node.first_child as usize <= i || end > node_count as u64) {
                return Err(FontError::corrupt(format!(
                    "trie node {} has child range {}..{} outside {}..{}",
                    i, node.first_child, end, i + 1, node_count
                )));
            }
            if node.key_id >= 0 {
                key_count += 1;
            }
        }
        for node in &nodes {
            if node.key_id >= key_count as i32 {
                return Err(FontError::corrupt(format!(
                    "trie key id {} out of range for {} keys",
                    node.key_id, key_count
                )));
            }
        }

        Ok(Self { nodes, key_count })
    }
}
