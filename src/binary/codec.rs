// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width record primitives.
//!
//! Everything in a voice font is little-endian and fixed width: 16-bit phone
//! ids, 32-bit counts and offsets, 32-bit floats. No varints here. The runtime
//! that consumes these files memory-maps them and indexes by offset, so every
//! field has to sit where the layout says it does.
//!
//! The only errors are stream errors. A short read surfaces as
//! `io::ErrorKind::UnexpectedEof` straight from `read_exact`.

use std::io::{self, Read, Seek, Write};

// ============================================================================
// WRITERS
// ============================================================================

pub fn write_u16<W: Write>(w: &mut W, value: u16) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn write_i16<W: Write>(w: &mut W, value: i16) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn write_u32<W: Write>(w: &mut W, value: u32) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn write_i32<W: Write>(w: &mut W, value: i32) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn write_f32<W: Write>(w: &mut W, value: f32) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    w.write_all(bytes)
}

/// Write `len:i32` followed by the raw bytes.
pub fn write_blob<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    write_i32(w, len_i32(bytes.len())?)?;
    w.write_all(bytes)
}

/// Write `len:i32` followed by `len` little-endian floats.
pub fn write_f32_array<W: Write>(w: &mut W, values: &[f32]) -> io::Result<()> {
    write_i32(w, len_i32(values.len())?)?;
    for &v in values {
        write_f32(w, v)?;
    }
    Ok(())
}

/// Pad with zero bytes until the stream position is a multiple of `alignment`.
///
/// Returns the number of pad bytes written (0 when already aligned).
pub fn pad_to_alignment<W: Write + Seek>(w: &mut W, alignment: u64) -> io::Result<usize> {
    if alignment <= 1 {
        return Ok(0);
    }
    let pos = w.stream_position()?;
    let pad = ((alignment - pos % alignment) % alignment) as usize;
    if pad > 0 {
        w.write_all(&vec![0u8; pad])?;
    }
    Ok(pad)
}

// ============================================================================
// READERS
// ============================================================================

pub fn read_u16<R: Read>(r: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub fn read_i16<R: Read>(r: &mut R) -> io::Result<i16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

pub fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_i32<R: Read>(r: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub fn read_f32<R: Read>(r: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

/// Read exactly `len` bytes.
///
/// Reads through `take` so a corrupt length can't force a huge allocation
/// before the stream runs dry.
pub fn read_bytes<R: Read>(r: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    r.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, stream had {}", len, buf.len()),
        ));
    }
    Ok(buf)
}

/// Read a `len:i32`-prefixed byte blob.
pub fn read_blob<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let len = read_count(r)?;
    read_bytes(r, len)
}

/// Read a `len:i32`-prefixed float array.
pub fn read_f32_array<R: Read>(r: &mut R) -> io::Result<Vec<f32>> {
    let len = read_count(r)?;
    let raw = read_bytes(r, len.saturating_mul(4))?;
    Ok(f32s_from_le_bytes(&raw))
}

/// Read an `i32` count, rejecting negative values.
pub fn read_count<R: Read>(r: &mut R) -> io::Result<usize> {
    let count = read_i32(r)?;
    usize::try_from(count).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("negative count {}", count),
        )
    })
}

/// Decode little-endian floats by copying each 4-byte chunk.
///
/// Trailing bytes that don't form a whole float are ignored.
pub fn f32s_from_le_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Decode little-endian `i32`s by copying each 4-byte chunk.
pub fn i32s_from_le_bytes(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Convert a length to the on-disk `i32`, failing instead of wrapping.
pub fn len_i32(len: usize) -> io::Result<i32> {
    i32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("length {} does not fit in i32", len),
        )
    })
}

/// Convert a stream position to the on-disk `u32`.
pub fn pos_u32(pos: u64) -> io::Result<u32> {
    u32::try_from(pos).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("position {} does not fit in u32", pos),
        )
    })
}
