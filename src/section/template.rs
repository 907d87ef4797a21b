// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Template section: normal-unit references of every template segment.
//!
//! ```text
//! groupCount: i32                      (one per trie id)
//!   segmentCount: i32
//!     refCount: i32, ref: i32 × refCount
//! ```
//!
//! Unlike the per-unit sections this one has no indexed table; the nesting is
//! written straight through.

use std::io::{Read, Seek, Write};

use crate::binary::codec::{len_i32, read_count, read_i32, write_i32};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSection {
    templates: Vec<Vec<Vec<i32>>>,
}

impl TemplateSection {
    /// `index[trie id][segment]` is the reference list of that segment.
    pub fn new(index: Vec<Vec<Vec<i32>>>) -> Self {
        Self { templates: index }
    }

    pub fn templates(&self) -> &[Vec<Vec<i32>>] {
        &self.templates
    }

    /// First reference outside `0..unit_count`, as
    /// `(trie id, segment, reference)`.
    pub fn dangling_ref(&self, unit_count: usize) -> Option<(usize, usize, i32)> {
        self.templates.iter().enumerate().find_map(|(id, segments)| {
            segments.iter().enumerate().find_map(|(seg, refs)| {
                refs.iter()
                    .find(|&&u| u < 0 || u as usize >= unit_count)
                    .map(|&u| (id, seg, u))
            })
        })
    }

    pub(crate) fn write_data<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        write_i32(w, len_i32(self.templates.len())?)?;
        for segments in &self.templates {
            write_i32(w, len_i32(segments.len())?)?;
            for refs in segments {
                write_i32(w, len_i32(refs.len())?)?;
                for &unit in refs {
                    write_i32(w, unit)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn load_data<R: Read + Seek>(&mut self, r: &mut R) -> Result<()> {
        let group_count = read_count(r)?;
        let mut templates = Vec::with_capacity(group_count.min(4096));
        for _ in 0..group_count {
            let segment_count = read_count(r)?;
            let mut segments = Vec::with_capacity(segment_count.min(4096));
            for _ in 0..segment_count {
                let ref_count = read_count(r)?;
                let mut refs = Vec::with_capacity(ref_count.min(4096));
                for _ in 0..ref_count {
                    refs.push(read_i32(r)?);
                }
                segments.push(refs);
            }
            templates.push(segments);
        }
        self.templates = templates;
        Ok(())
    }
}
