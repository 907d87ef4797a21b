// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Candidate section: a rectangular matrix of alternative unit indices per unit.
//!
//! ```text
//! indexed table, one item per unit:
//!   width: u32, rowCount: i32
//!   i32 × width × rowCount, row-major
//! ```
//!
//! `0, 0` means "no candidates" and loads back as `None`.

use std::io::{Cursor, Read, Seek, Write};

use super::{scratch, LoadContext, SectionId, WriteContext};
use crate::binary::codec::{i32s_from_le_bytes, len_i32, read_bytes, read_count, read_u32, write_i32, write_u32};
use crate::binary::{read_indexed_items, write_indexed_items};
use crate::error::{FontError, Result};
use crate::types::NonUniformUnit;

#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateSection;

/// Common row width, or an error naming the first ragged row.
fn matrix_width(unit_index: usize, rows: &[Vec<i32>]) -> Result<usize> {
    let width = rows.first().map_or(0, Vec::len);
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(FontError::shape(format!(
            "unit {} candidate row {} has width {}, expected {}",
            unit_index,
            row,
            r.len(),
            width
        )));
    }
    Ok(width)
}

fn encode_candidates(rows: Option<&Vec<Vec<i32>>>) -> Result<Vec<u8>> {
    scratch(|buf| {
        let rows = rows.map_or(&[][..], Vec::as_slice);
        let width = rows.first().map_or(0, Vec::len);
        write_u32(buf, width as u32)?;
        write_i32(buf, len_i32(rows.len())?)?;
        for row in rows {
            for &v in row {
                write_i32(buf, v)?;
            }
        }
        Ok(())
    })
}

fn decode_candidates(bytes: &[u8]) -> Result<Option<Vec<Vec<i32>>>> {
    let mut r = Cursor::new(bytes);
    let width = read_u32(&mut r)? as usize;
    let rows = read_count(&mut r)?;
    let cells = width
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| FontError::corrupt("candidate matrix size overflows"))?;
    let raw = read_bytes(&mut r, cells)?;
    if r.position() != bytes.len() as u64 {
        return Err(FontError::corrupt("candidate item has trailing bytes"));
    }
    if width == 0 || rows == 0 {
        return Ok(None);
    }
    let flat = i32s_from_le_bytes(&raw);
    Ok(Some(flat.chunks_exact(width).map(<[i32]>::to_vec).collect()))
}

impl CandidateSection {
    pub(crate) fn write_data<W: Write + Seek>(&self, w: &mut W, ctx: &WriteContext<'_>) -> Result<()> {
        // Reject ragged matrices before anything is written
        for (i, unit) in ctx.units.iter().enumerate() {
            if let Some(rows) = &unit.candidates {
                matrix_width(i, rows)?;
            }
        }
        write_indexed_items(None, ctx.units, w, |unit: &NonUniformUnit| {
            encode_candidates(unit.candidates.as_ref())
        })?;
        Ok(())
    }

    pub(crate) fn load_data<R: Read + Seek>(&self, r: &mut R, ctx: &mut LoadContext) -> Result<()> {
        let matrices = read_indexed_items(r, &mut (), |bytes, _| decode_candidates(bytes))?;
        let units = ctx.units_mut(SectionId::Candidate, matrices.len())?;
        for (unit, candidates) in units.iter_mut().zip(matrices) {
            unit.candidates = candidates;
        }
        Ok(())
    }
}
