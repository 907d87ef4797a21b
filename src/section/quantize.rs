// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fixed-point codecs for prompt trajectories.
//!
//! F0 and gain are scaled linearly and clipped into `i16`. Values beyond the
//! representable range saturate at `i16::MIN`/`i16::MAX`; they never wrap.
//!
//! LSP frames are delta-coded in 8 bits. LSP coefficients are strictly
//! increasing, so each coefficient is stored as its distance from the
//! previous coefficient's *reconstructed* value, clipped to `[1, 255]`.
//! Coding against the reconstruction rather than the original keeps rounding
//! error from accumulating across the frame, and the floor of 1 keeps the
//! decoded coefficients strictly ordered.

/// F0 quantization scale (Hz × 64)
pub const F0_SCALE: f32 = 64.0;

/// Gain quantization scale (log gain × 1024)
pub const GAIN_SCALE: f32 = 1024.0;

/// LSP delta scale (radians × 400 per step)
pub const LSP_DELTA_SCALE: f32 = 400.0;

/// Scale, round, and saturate into `i16`. NaN maps to 0.
pub fn quantize_scaled(value: f32, scale: f32) -> i16 {
    let scaled = (value * scale).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

pub fn dequantize_scaled(value: i16, scale: f32) -> f32 {
    f32::from(value) / scale
}

pub fn quantize_f0(value: f32) -> i16 {
    quantize_scaled(value, F0_SCALE)
}

pub fn dequantize_f0(value: i16) -> f32 {
    dequantize_scaled(value, F0_SCALE)
}

pub fn quantize_gain(value: f32) -> i16 {
    quantize_scaled(value, GAIN_SCALE)
}

pub fn dequantize_gain(value: i16) -> f32 {
    dequantize_scaled(value, GAIN_SCALE)
}

/// Delta-code one LSP frame into bytes in `[1, 255]`.
pub fn quantize_lsp_frame(frame: &[f32]) -> Vec<u8> {
    let mut prev = 0.0f32;
    frame
        .iter()
        .map(|&coef| {
            let delta = ((coef - prev) * LSP_DELTA_SCALE).round();
            let q = if delta.is_nan() {
                1
            } else {
                delta.clamp(1.0, 255.0) as u8
            };
            prev += f32::from(q) / LSP_DELTA_SCALE;
            q
        })
        .collect()
}

/// Reconstruct an LSP frame from its delta codes.
pub fn dequantize_lsp_frame(codes: &[u8]) -> Vec<f32> {
    let mut acc = 0.0f32;
    codes
        .iter()
        .map(|&q| {
            acc += f32::from(q) / LSP_DELTA_SCALE;
            acc
        })
        .collect()
}
