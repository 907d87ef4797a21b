// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Trie section: phone-sequence trie plus the unit groups it indexes.
//!
//! ```text
//! groupOffset: u32, groupSize: u32      (section-relative)
//! trieOffset: u32,  trieSize: u32       (section-relative)
//! [group table]   indexed; per trie id: count: i32, unit: i32 × count
//! [zero padding to 4 bytes]
//! [trie blob]
//! ```
//!
//! Template fonts index template units instead of normal units. Their
//! groups live in the template section, so the group fields are zero and
//! only the blob is written.
//!
//! The header is written as placeholders and patched once the blob's
//! position is known, so the section is produced in one pass.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use super::{scratch, LoadContext};
use crate::binary::codec::{
    i32s_from_le_bytes, len_i32, pad_to_alignment, pos_u32, read_bytes, read_count, read_u32,
    write_bytes, write_i32, write_u32,
};
use crate::binary::{read_indexed_items, write_indexed_items};
use crate::error::{FontError, Result};
use crate::trie::{PhoneTrie, UnitGrouping};
use crate::types::NonUniformUnit;

const HEADER_SIZE: u64 = 16;

/// What the trie keys point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrieMode {
    /// Trie ids index unit groups stored in this section
    Units,
    /// Trie ids index the template section
    Templates,
}

#[derive(Debug, Clone)]
pub struct TrieSection {
    mode: TrieMode,
    groups: Vec<Vec<i32>>,
    trie: PhoneTrie,
}

fn encode_group(group: &Vec<i32>) -> Result<Vec<u8>> {
    scratch(|buf| {
        write_i32(buf, len_i32(group.len())?)?;
        for &unit in group {
            write_i32(buf, unit)?;
        }
        Ok(())
    })
}

fn decode_group(bytes: &[u8]) -> Result<Vec<i32>> {
    let mut r = Cursor::new(bytes);
    let count = read_count(&mut r)?;
    let raw = read_bytes(&mut r, count.saturating_mul(4))?;
    if r.position() != bytes.len() as u64 {
        return Err(FontError::corrupt("trie group has trailing bytes"));
    }
    Ok(i32s_from_le_bytes(&raw))
}

impl TrieSection {
    /// Section with an empty trie, ready to load.
    pub fn empty() -> Self {
        Self {
            mode: TrieMode::Units,
            groups: Vec::new(),
            trie: PhoneTrie::build(std::iter::empty()),
        }
    }

    /// Index normal units by phone sequence.
    pub fn from_units(units: &[NonUniformUnit]) -> Result<Self> {
        let (trie, groups, _) = UnitGrouping::build(units)?.into_parts();
        Ok(Self {
            mode: TrieMode::Units,
            groups,
            trie,
        })
    }

    /// Index template units by phone sequence.
    ///
    /// Also returns the `[trie id][segment][reference]` index the template
    /// section stores.
    pub fn from_templates(templates: &[NonUniformUnit]) -> Result<(Self, Vec<Vec<Vec<i32>>>)> {
        let (trie, _, index) = UnitGrouping::build_templates(templates)?.into_parts();
        let section = Self {
            mode: TrieMode::Templates,
            groups: Vec::new(),
            trie,
        };
        Ok((section, index))
    }

    pub fn mode(&self) -> TrieMode {
        self.mode
    }

    /// Unit indices per trie id. Empty in template mode.
    pub fn groups(&self) -> &[Vec<i32>] {
        &self.groups
    }

    pub fn trie(&self) -> &PhoneTrie {
        &self.trie
    }

    /// Units sharing the phone sequence `phones`.
    pub fn lookup(&self, phones: &[u16]) -> Option<&[i32]> {
        let id = self.trie.key_id(phones)? as usize;
        self.groups.get(id).map(Vec::as_slice)
    }

    pub(crate) fn write_data<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        let start = w.stream_position()?;
        for _ in 0..4 {
            write_u32(w, 0)?;
        }

        let (group_offset, group_size) = match self.mode {
            TrieMode::Units => {
                let table_start = w.stream_position()?;
                write_indexed_items(None, &self.groups, w, encode_group)?;
                let table_end = w.stream_position()?;
                (pos_u32(table_start - start)?, pos_u32(table_end - table_start)?)
            }
            TrieMode::Templates => (0, 0),
        };

        pad_to_alignment(w, 4)?;
        let trie_start = w.stream_position()?;
        write_bytes(w, &self.trie.to_bytes())?;
        let end = w.stream_position()?;

        w.seek(SeekFrom::Start(start))?;
        write_u32(w, group_offset)?;
        write_u32(w, group_size)?;
        write_u32(w, pos_u32(trie_start - start)?)?;
        write_u32(w, pos_u32(end - trie_start)?)?;
        w.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    pub(crate) fn load_data<R: Read + Seek>(&mut self, r: &mut R, ctx: &mut LoadContext) -> Result<()> {
        let start = r.stream_position()?;
        let group_offset = u64::from(read_u32(r)?);
        let group_size = u64::from(read_u32(r)?);
        let trie_offset = u64::from(read_u32(r)?);
        let trie_size = read_u32(r)? as usize;

        if trie_offset < HEADER_SIZE || (group_size > 0 && group_offset < HEADER_SIZE) {
            return Err(FontError::corrupt(format!(
                "trie section offsets overlap its header (groups at {}, trie at {})",
                group_offset, trie_offset
            )));
        }

        let (mode, groups) = if group_size == 0 {
            (TrieMode::Templates, Vec::new())
        } else {
            r.seek(SeekFrom::Start(start + group_offset))?;
            let groups = read_indexed_items(r, &mut (), |bytes, _| decode_group(bytes))?;
            let consumed = r.stream_position()? - start - group_offset;
            if consumed != group_size {
                return Err(FontError::corrupt(format!(
                    "trie group table is {} bytes, header says {}",
                    consumed, group_size
                )));
            }
            (TrieMode::Units, groups)
        };

        r.seek(SeekFrom::Start(start + trie_offset))?;
        let trie = PhoneTrie::from_bytes(&read_bytes(r, trie_size)?)?;

        if mode == TrieMode::Units {
            if groups.len() != trie.key_count() {
                return Err(FontError::corrupt(format!(
                    "trie has {} keys but {} unit groups",
                    trie.key_count(),
                    groups.len()
                )));
            }
            if let Some(units) = &ctx.units {
                let out_of_range = groups
                    .iter()
                    .flatten()
                    .find(|&&u| u < 0 || u as usize >= units.len());
                if let Some(&u) = out_of_range {
                    return Err(FontError::corrupt(format!(
                        "trie group references unit {} of {}",
                        u,
                        units.len()
                    )));
                }
            }
        }

        self.mode = mode;
        self.groups = groups;
        self.trie = trie;
        Ok(())
    }
}
