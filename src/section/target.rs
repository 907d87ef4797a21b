// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Acoustic target section: one pitch target curve per unit.
//!
//! Each item is `len: i32` followed by `len` little-endian floats. Decoding
//! copies 4-byte chunks rather than reinterpreting the buffer, so it works on
//! any alignment and any host byte order.

use std::io::{Cursor, Read, Seek, Write};

use super::{scratch, LoadContext, SectionId, WriteContext};
use crate::binary::codec::{read_f32_array, write_f32_array};
use crate::binary::{read_indexed_items, write_indexed_items};
use crate::error::{FontError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct TargetSection;

impl TargetSection {
    pub(crate) fn write_data<W: Write + Seek>(&self, w: &mut W, ctx: &WriteContext<'_>) -> Result<()> {
        write_indexed_items(None, ctx.units, w, |unit| {
            scratch(|buf| Ok(write_f32_array(buf, &unit.pitch_target)?))
        })?;
        Ok(())
    }

    pub(crate) fn load_data<R: Read + Seek>(&self, r: &mut R, ctx: &mut LoadContext) -> Result<()> {
        let targets = read_indexed_items(r, &mut (), |bytes, _| {
            let mut c = Cursor::new(bytes);
            let values = read_f32_array(&mut c)?;
            if c.position() != bytes.len() as u64 {
                return Err(FontError::corrupt("pitch target item has trailing bytes"));
            }
            Ok(values)
        })?;

        let units = ctx.units_mut(SectionId::Target, targets.len())?;
        for (unit, target) in units.iter_mut().zip(targets) {
            unit.pitch_target = target;
        }
        Ok(())
    }
}
