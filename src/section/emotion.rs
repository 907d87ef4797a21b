// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Emotion section.
//!
//! ```text
//! unitCount: i32
//! emotion: i32 × unitCount
//! indexed table with no items (framing only)
//! ```

use std::io::{Read, Seek, Write};

use super::{LoadContext, SectionId, WriteContext};
use crate::binary::codec::{len_i32, read_count, read_i32, write_i32};
use crate::binary::{read_indexed_items, write_indexed_items};
use crate::error::{FontError, Result};
use crate::types::Emotion;

#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionSection;

impl EmotionSection {
    pub(crate) fn write_data<W: Write + Seek>(&self, w: &mut W, ctx: &WriteContext<'_>) -> Result<()> {
        write_i32(w, len_i32(ctx.units.len())?)?;
        for unit in ctx.units {
            write_i32(w, unit.emotion as i32)?;
        }
        write_indexed_items(None, &[] as &[()], w, |_| Ok(Vec::new()))?;
        Ok(())
    }

    pub(crate) fn load_data<R: Read + Seek>(&self, r: &mut R, ctx: &mut LoadContext) -> Result<()> {
        let count = read_count(r)?;
        let units = ctx.units_mut(SectionId::Emotion, count)?;
        for unit in units.iter_mut() {
            let raw = read_i32(r)?;
            unit.emotion = Emotion::from_i32(raw)
                .ok_or_else(|| FontError::corrupt(format!("unknown emotion value {}", raw)))?;
        }
        let trailing = read_indexed_items(r, &mut (), |_, _| Ok(()))?;
        if !trailing.is_empty() {
            return Err(FontError::corrupt("emotion section carries unexpected items"));
        }
        Ok(())
    }
}
