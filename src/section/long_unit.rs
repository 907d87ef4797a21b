// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Long-unit section: sub-range boundaries inside long recorded units.
//!
//! ```text
//! indexed table, one item per unit:
//!   width: u32 (always 2), rangeCount: i32
//!   (start: i32, length: i32) × rangeCount
//! ```
//!
//! A unit without sub-ranges is written as `0, 0`.

use std::io::{Cursor, Read, Seek, Write};

use super::{scratch, LoadContext, SectionId, WriteContext};
use crate::binary::codec::{len_i32, read_count, read_i32, read_u32, write_i32, write_u32};
use crate::binary::{read_indexed_items, write_indexed_items};
use crate::error::{FontError, Result};
use crate::types::{NonUniformUnit, SubRange};

/// Integers per stored range.
const RANGE_WIDTH: u32 = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct LongUnitSection;

fn encode_ranges(ranges: &[SubRange]) -> Result<Vec<u8>> {
    scratch(|buf| {
        let width = if ranges.is_empty() { 0 } else { RANGE_WIDTH };
        write_u32(buf, width)?;
        write_i32(buf, len_i32(ranges.len())?)?;
        for range in ranges {
            write_i32(buf, range.start)?;
            write_i32(buf, range.length)?;
        }
        Ok(())
    })
}

fn decode_ranges(bytes: &[u8]) -> Result<Vec<SubRange>> {
    let mut r = Cursor::new(bytes);
    let width = read_u32(&mut r)?;
    let count = read_count(&mut r)?;
    match (width, count) {
        (0, 0) => {}
        (RANGE_WIDTH, _) => {}
        _ => {
            return Err(FontError::shape(format!(
                "long-unit item has width {} for {} ranges, expected {}",
                width, count, RANGE_WIDTH
            )))
        }
    }

    let mut ranges = Vec::with_capacity(count.min(bytes.len() / 8));
    for _ in 0..count {
        ranges.push(SubRange {
            start: read_i32(&mut r)?,
            length: read_i32(&mut r)?,
        });
    }
    if r.position() != bytes.len() as u64 {
        return Err(FontError::corrupt("long-unit item has trailing bytes"));
    }
    Ok(ranges)
}

impl LongUnitSection {
    pub(crate) fn write_data<W: Write + Seek>(&self, w: &mut W, ctx: &WriteContext<'_>) -> Result<()> {
        write_indexed_items(None, ctx.units, w, |unit: &NonUniformUnit| {
            encode_ranges(&unit.sub_ranges)
        })?;
        Ok(())
    }

    pub(crate) fn load_data<R: Read + Seek>(&self, r: &mut R, ctx: &mut LoadContext) -> Result<()> {
        let all = read_indexed_items(r, &mut (), |bytes, _| decode_ranges(bytes))?;
        let units = ctx.units_mut(SectionId::LongUnit, all.len())?;
        for (unit, ranges) in units.iter_mut().zip(all) {
            unit.sub_ranges = ranges;
        }
        Ok(())
    }
}
