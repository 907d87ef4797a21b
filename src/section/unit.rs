// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Unit section: phone sequences and per-phone linguistic features.
//!
//! ```text
//! indexed table, one item per unit:
//!   phoneCount: i32
//!   for each phone:
//!     phoneId: u16
//!     for each configured feature: tag: i32, value: i32
//! ```
//!
//! This is the section that allocates the unit arena on load.

use std::io::{Cursor, Read, Seek, Write};

use super::{scratch, LoadContext, SectionId, WriteContext};
use crate::binary::codec::{len_i32, read_count, read_i32, read_u16, write_i32, write_u16};
use crate::binary::{read_indexed_items, write_indexed_items};
use crate::error::{FontError, Result};
use crate::types::{FeaturePhone, FeatureValue, FeatureValueType, NonUniformUnit};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnitSection;

fn encode_unit(unit: &NonUniformUnit, feature_count: usize) -> Result<Vec<u8>> {
    scratch(|buf| {
        write_i32(buf, len_i32(unit.phones.len())?)?;
        for phone in &unit.phones {
            if phone.features.len() != feature_count {
                return Err(FontError::shape(format!(
                    "phone {} has {} feature values, expected {}",
                    phone.phone_id,
                    phone.features.len(),
                    feature_count
                )));
            }
            write_u16(buf, phone.phone_id)?;
            for value in &phone.features {
                match value {
                    FeatureValue::Int(v) => {
                        write_i32(buf, FeatureValueType::Integer as i32)?;
                        write_i32(buf, *v)?;
                    }
                    FeatureValue::Str(s) => {
                        return Err(FontError::unsupported(format!(
                            "string feature value {:?} on phone {}",
                            s, phone.phone_id
                        )));
                    }
                }
            }
        }
        Ok(())
    })
}

fn decode_unit(bytes: &[u8], feature_count: usize) -> Result<NonUniformUnit> {
    let mut r = Cursor::new(bytes);
    let phone_count = read_count(&mut r)?;
    let mut phones = Vec::with_capacity(phone_count.min(bytes.len()));
    for _ in 0..phone_count {
        let phone_id = read_u16(&mut r)?;
        let mut features = Vec::with_capacity(feature_count);
        for _ in 0..feature_count {
            let tag = read_i32(&mut r)?;
            let value = read_i32(&mut r)?;
            match FeatureValueType::from_i32(tag) {
                Some(FeatureValueType::Integer) => features.push(FeatureValue::Int(value)),
                Some(FeatureValueType::String) => {
                    return Err(FontError::unsupported("string feature value in unit section"))
                }
                None => return Err(FontError::corrupt(format!("unknown feature tag {}", tag))),
            }
        }
        phones.push(FeaturePhone { phone_id, features });
    }
    if r.position() != bytes.len() as u64 {
        return Err(FontError::corrupt("unit item has trailing bytes"));
    }
    Ok(NonUniformUnit {
        phones,
        ..NonUniformUnit::default()
    })
}

impl UnitSection {
    pub(crate) fn write_data<W: Write + Seek>(&self, w: &mut W, ctx: &WriteContext<'_>) -> Result<()> {
        let feature_count = ctx.features.len();
        write_indexed_items(None, ctx.units, w, |unit| encode_unit(unit, feature_count))?;
        Ok(())
    }

    pub(crate) fn load_data<R: Read + Seek>(&self, r: &mut R, ctx: &mut LoadContext) -> Result<()> {
        let feature_count = ctx.feature_count;
        let loaded = read_indexed_items(r, &mut (), |bytes, _| decode_unit(bytes, feature_count))?;

        match ctx.units.as_mut() {
            None => ctx.units = Some(loaded),
            Some(_) => {
                let units = ctx.units_mut(SectionId::Unit, loaded.len())?;
                for (unit, decoded) in units.iter_mut().zip(loaded) {
                    unit.phones = decoded.phones;
                }
            }
        }
        Ok(())
    }
}
