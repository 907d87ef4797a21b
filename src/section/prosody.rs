// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Prosody section: the majority-vote prosody item of every unit.
//!
//! ```text
//! disabled: unitCount = 0: i32
//! enabled:  unitCount: i32, then [headBreak, tailBreak, headTobi, tailTobi] × unitCount
//! ```
//!
//! The vote is independent per unit, so it fans out with rayon when the
//! `parallel` feature is on.

use std::io::{Read, Seek, Write};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{LoadContext, SectionId, WriteContext};
use crate::binary::codec::{len_i32, read_bytes, read_count, write_bytes, write_i32};
use crate::error::Result;
use crate::types::{NonUniformUnit, ProsodyItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProsodySection {
    pub enabled: bool,
}

impl Default for ProsodySection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Most frequent item among `candidates`.
///
/// The first candidate is the starting answer, and a later one only replaces
/// it with a strictly higher count, so ties go to whichever was seen first.
/// Returns `None` when there are no candidates.
pub fn best_prosody_item(candidates: &[ProsodyItem]) -> Option<ProsodyItem> {
    let mut best = *candidates.first()?;
    let mut best_count = 0usize;
    for item in candidates {
        let count = candidates.iter().filter(|c| *c == item).count();
        if count > best_count {
            best = *item;
            best_count = count;
        }
    }
    Some(best)
}

/// Vote over the candidates, else keep the item a loaded unit already carries.
fn best_items(units: &[NonUniformUnit]) -> Vec<ProsodyItem> {
    let vote = |u: &NonUniformUnit| {
        best_prosody_item(&u.prosody_candidates)
            .or(u.best_prosody)
            .unwrap_or_default()
    };

    #[cfg(feature = "parallel")]
    {
        units.par_iter().map(vote).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        units.iter().map(vote).collect()
    }
}

impl ProsodySection {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub(crate) fn write_data<W: Write + Seek>(&self, w: &mut W, ctx: &WriteContext<'_>) -> Result<()> {
        if !self.enabled {
            write_i32(w, 0)?;
            return Ok(());
        }

        let best = best_items(ctx.units);
        write_i32(w, len_i32(best.len())?)?;
        for item in best {
            write_bytes(w, &item.to_bytes())?;
        }
        Ok(())
    }

    pub(crate) fn load_data<R: Read + Seek>(&mut self, r: &mut R, ctx: &mut LoadContext) -> Result<()> {
        let count = read_count(r)?;
        // Zero count with units present means prosody was disabled at build time
        let unit_count = ctx.units.as_ref().map_or(0, Vec::len);
        if count == 0 && unit_count > 0 {
            self.enabled = false;
            return Ok(());
        }

        self.enabled = true;
        let units = ctx.units_mut(SectionId::Prosody, count)?;
        let raw = read_bytes(r, count * 4)?;
        for (unit, chunk) in units.iter_mut().zip(raw.chunks_exact(4)) {
            unit.best_prosody = Some(ProsodyItem::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        Ok(())
    }
}
