// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Prompt section: LSP/F0/gain trajectories for prompt playback.
//!
//! ```text
//! precision: i32 (0 = float, 1 = fixed)
//! lspOrder: i32, f0Order: i32, gainOrder: i32
//! indexed table, one item per unit (empty item = no trajectory):
//!   frames: i32, phones: i32
//!   LSP   frames × lspOrder   (f32, or u8 delta codes)
//!   F0    frames × f0Order    (f32, or i16)
//!   gain  frames × gainOrder  (f32, or i16)
//!   durations: i32 × phones
//! ```
//!
//! Every trajectory is checked before the first byte is written: each stream
//! must have exactly `sum(durations)` frames of its configured order.

use std::io::{Cursor, Read, Seek, Write};

use super::quantize::{
    dequantize_f0, dequantize_gain, dequantize_lsp_frame, quantize_f0, quantize_gain,
    quantize_lsp_frame,
};
use super::{scratch, LoadContext, SectionId, WriteContext};
use crate::binary::codec::{
    len_i32, read_bytes, read_count, read_f32, read_i16, read_i32, write_bytes, write_f32,
    write_i16, write_i32,
};
use crate::binary::{read_indexed_items, write_indexed_items};
use crate::config::{Precision, PromptConfig};
use crate::error::{FontError, Result};
use crate::types::Trajectory;

/// Frame count allowed when every stream has order 0
const MAX_EMPTY_FRAMES: usize = 1 << 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptSection {
    pub config: PromptConfig,
}

fn check_stream(unit: usize, name: &str, frames: &[Vec<f32>], expected: u64, order: u32) -> Result<()> {
    if frames.len() as u64 != expected {
        return Err(FontError::shape(format!(
            "unit {} has {} {} frames but durations sum to {}",
            unit,
            frames.len(),
            name,
            expected
        )));
    }
    if let Some(row) = frames.iter().position(|f| f.len() != order as usize) {
        return Err(FontError::shape(format!(
            "unit {} {} frame {} has order {}, expected {}",
            unit,
            name,
            row,
            frames[row].len(),
            order
        )));
    }
    Ok(())
}

fn validate(unit: usize, t: &Trajectory, cfg: &PromptConfig) -> Result<()> {
    let frames = t.duration_frames();
    check_stream(unit, "LSP", &t.lsp, frames, cfg.lsp_order)?;
    check_stream(unit, "F0", &t.f0, frames, cfg.f0_order)?;
    check_stream(unit, "gain", &t.gain, frames, cfg.gain_order)?;
    Ok(())
}

fn encode_trajectory(t: Option<&Trajectory>, precision: Precision) -> Result<Vec<u8>> {
    let Some(t) = t else {
        return Ok(Vec::new());
    };
    scratch(|buf| {
        write_i32(buf, len_i32(t.lsp.len())?)?;
        write_i32(buf, len_i32(t.phone_durations.len())?)?;
        match precision {
            Precision::Float => {
                for stream in [&t.lsp, &t.f0, &t.gain] {
                    for &v in stream.iter().flatten() {
                        write_f32(buf, v)?;
                    }
                }
            }
            Precision::Fixed => {
                for frame in &t.lsp {
                    write_bytes(buf, &quantize_lsp_frame(frame))?;
                }
                for &v in t.f0.iter().flatten() {
                    write_i16(buf, quantize_f0(v))?;
                }
                for &v in t.gain.iter().flatten() {
                    write_i16(buf, quantize_gain(v))?;
                }
            }
        }
        for &d in &t.phone_durations {
            write_i32(buf, i32::try_from(d).map_err(|_| FontError::shape("phone duration exceeds i32"))?)?;
        }
        Ok(())
    })
}

fn read_float_frames<R: Read>(r: &mut R, frames: usize, order: usize) -> Result<Vec<Vec<f32>>> {
    let mut out = Vec::with_capacity(frames.min(4096));
    for _ in 0..frames {
        let mut frame = Vec::with_capacity(order);
        for _ in 0..order {
            frame.push(read_f32(r)?);
        }
        out.push(frame);
    }
    Ok(out)
}

fn read_fixed_frames<R: Read>(
    r: &mut R,
    frames: usize,
    order: usize,
    dequantize: fn(i16) -> f32,
) -> Result<Vec<Vec<f32>>> {
    let mut out = Vec::with_capacity(frames.min(4096));
    for _ in 0..frames {
        let mut frame = Vec::with_capacity(order);
        for _ in 0..order {
            frame.push(dequantize(read_i16(r)?));
        }
        out.push(frame);
    }
    Ok(out)
}

fn decode_trajectory(bytes: &[u8], cfg: &PromptConfig) -> Result<Option<Trajectory>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let mut r = Cursor::new(bytes);
    let frames = read_count(&mut r)?;
    let phones = read_count(&mut r)?;
    let (lsp_order, f0_order, gain_order) = (
        cfg.lsp_order as usize,
        cfg.f0_order as usize,
        cfg.gain_order as usize,
    );

    // Reject frame counts the item can't possibly hold before looping over them
    let frame_bytes = match cfg.precision {
        Precision::Float => (lsp_order + f0_order + gain_order) * 4,
        Precision::Fixed => lsp_order + (f0_order + gain_order) * 2,
    };
    let remaining = bytes.len().saturating_sub(r.position() as usize);
    let fits = match frame_bytes {
        0 => frames <= MAX_EMPTY_FRAMES,
        n => frames.checked_mul(n).is_some_and(|total| total <= remaining),
    };
    if !fits {
        return Err(FontError::corrupt(format!(
            "prompt item claims {} frames in {} bytes",
            frames, remaining
        )));
    }

    let (lsp, f0, gain) = match cfg.precision {
        Precision::Float => (
            read_float_frames(&mut r, frames, lsp_order)?,
            read_float_frames(&mut r, frames, f0_order)?,
            read_float_frames(&mut r, frames, gain_order)?,
        ),
        Precision::Fixed => {
            let mut lsp = Vec::with_capacity(frames.min(4096));
            for _ in 0..frames {
                lsp.push(dequantize_lsp_frame(&read_bytes(&mut r, lsp_order)?));
            }
            (
                lsp,
                read_fixed_frames(&mut r, frames, f0_order, dequantize_f0)?,
                read_fixed_frames(&mut r, frames, gain_order, dequantize_gain)?,
            )
        }
    };

    let mut phone_durations = Vec::with_capacity(phones.min(4096));
    for _ in 0..phones {
        let d = read_i32(&mut r)?;
        phone_durations.push(
            u32::try_from(d).map_err(|_| FontError::corrupt(format!("negative phone duration {}", d)))?,
        );
    }
    if r.position() != bytes.len() as u64 {
        return Err(FontError::corrupt("prompt item has trailing bytes"));
    }

    let trajectory = Trajectory {
        lsp,
        f0,
        gain,
        phone_durations,
    };
    if trajectory.duration_frames() != frames as u64 {
        return Err(FontError::corrupt(format!(
            "prompt item has {} frames but durations sum to {}",
            frames,
            trajectory.duration_frames()
        )));
    }
    Ok(Some(trajectory))
}

impl PromptSection {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    pub(crate) fn write_data<W: Write + Seek>(&self, w: &mut W, ctx: &WriteContext<'_>) -> Result<()> {
        let cfg = self.config;
        for (i, unit) in ctx.units.iter().enumerate() {
            if let Some(t) = &unit.trajectory {
                validate(i, t, &cfg)?;
            }
        }

        write_i32(w, cfg.precision as i32)?;
        write_i32(w, order_i32(cfg.lsp_order)?)?;
        write_i32(w, order_i32(cfg.f0_order)?)?;
        write_i32(w, order_i32(cfg.gain_order)?)?;
        write_indexed_items(None, ctx.units, w, |unit| {
            encode_trajectory(unit.trajectory.as_ref(), cfg.precision)
        })?;
        Ok(())
    }

    pub(crate) fn load_data<R: Read + Seek>(&mut self, r: &mut R, ctx: &mut LoadContext) -> Result<()> {
        let precision = Precision::from_i32(read_i32(r)?)?;
        let lsp_order = read_count(r)? as u32;
        let f0_order = read_count(r)? as u32;
        let gain_order = read_count(r)? as u32;
        self.config = PromptConfig {
            precision,
            lsp_order,
            f0_order,
            gain_order,
        };

        let cfg = self.config;
        let trajectories = read_indexed_items(r, &mut (), |bytes, _| decode_trajectory(bytes, &cfg))?;
        let units = ctx.units_mut(SectionId::Prompt, trajectories.len())?;
        for (unit, t) in units.iter_mut().zip(trajectories) {
            unit.trajectory = t;
        }
        Ok(())
    }
}

fn order_i32(order: u32) -> Result<i32> {
    i32::try_from(order).map_err(|_| FontError::shape(format!("prompt order {} exceeds i32", order)))
}
