// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Indexed item tables: the framing every section payload sits inside.
//!
//! A list of variable-length items is stored as a count, an index of
//! `(start, length)` pairs, and the concatenated payloads:
//!
//! ```text
//! [itemCount: i32]
//! [(start: i32, length: i32)] × itemCount
//! [item payload bytes, positions matching the index]
//! ```
//!
//! `start` is relative to the table's own base (the position of `itemCount`),
//! so a table can be copied anywhere in a file without rewriting it. Readers
//! follow the index rather than assuming the payloads are contiguous; the
//! position of an item in the index is its position in the owning list, which
//! is how later sections line up with the unit arena.

use std::io::{Read, Seek, SeekFrom, Write};

use super::codec::{len_i32, read_bytes, read_count, read_i32, write_bytes, write_i32};
use crate::error::{FontError, Result};

/// Base-relative location of one item's payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexEntry {
    pub start: i32,
    pub length: i32,
}

impl IndexEntry {
    /// Size of one entry on disk.
    pub const SIZE: u64 = 8;
}

/// Serialize `items` as an indexed table at the current stream position.
///
/// Each item is serialized into its own buffer by `serialize` and written as
/// one opaque blob, so an entry's `length` is independent of how the
/// serializer builds its payload. `existing` lets a caller reuse a previously
/// returned index; it must have one entry per item.
///
/// Returns the finalized index. The stream is left at the end of the table.
pub fn write_indexed_items<W, T, F>(
    existing: Option<Vec<IndexEntry>>,
    items: &[T],
    w: &mut W,
    mut serialize: F,
) -> Result<Vec<IndexEntry>>
where
    W: Write + Seek,
    F: FnMut(&T) -> Result<Vec<u8>>,
{
    let mut indexes = match existing {
        Some(indexes) if indexes.len() != items.len() => {
            return Err(FontError::shape(format!(
                "index has {} entries but there are {} items",
                indexes.len(),
                items.len()
            )));
        }
        Some(indexes) => indexes,
        None => vec![IndexEntry::default(); items.len()],
    };

    let base = w.stream_position()?;
    write_i32(w, len_i32(items.len())?)?;

    // Placeholders, patched once every payload has a position
    let index_pos = w.stream_position()?;
    for entry in &indexes {
        write_i32(w, entry.start)?;
        write_i32(w, entry.length)?;
    }

    for (item, entry) in items.iter().zip(indexes.iter_mut()) {
        let start = w.stream_position()? - base;
        let bytes = serialize(item)?;
        write_bytes(w, &bytes)?;
        entry.start = i32::try_from(start)
            .map_err(|_| FontError::shape(format!("item start {} exceeds i32", start)))?;
        entry.length = len_i32(bytes.len())?;
    }

    let end = w.stream_position()?;
    w.seek(SeekFrom::Start(index_pos))?;
    for entry in &indexes {
        write_i32(w, entry.start)?;
        write_i32(w, entry.length)?;
    }
    w.seek(SeekFrom::Start(end))?;

    Ok(indexes)
}

/// Read the count and index of a table starting at the current position.
///
/// Returns the table base and its entries; the stream is left just past the
/// index.
pub fn read_index<R: Read + Seek>(r: &mut R) -> Result<(u64, Vec<IndexEntry>)> {
    let base = r.stream_position()?;
    let count = read_count(r)?;

    // Each entry needs 8 bytes, don't trust count for the allocation
    let mut indexes = Vec::with_capacity(count.min(4096));
    for i in 0..count {
        let start = read_i32(r)?;
        let length = read_i32(r)?;
        if start < 0 || length < 0 {
            return Err(FontError::corrupt(format!(
                "index entry {} has negative start {} or length {}",
                i, start, length
            )));
        }
        indexes.push(IndexEntry { start, length });
    }
    Ok((base, indexes))
}

/// Read an indexed table and deserialize each item with `deserialize`.
///
/// Items come back in index order, which is the order they were written.
/// The stream is left at the end of the table.
pub fn read_indexed_items<R, C, T, F>(r: &mut R, context: &mut C, mut deserialize: F) -> Result<Vec<T>>
where
    R: Read + Seek,
    F: FnMut(&[u8], &mut C) -> Result<T>,
{
    let (base, indexes) = read_index(r)?;
    let mut end = r.stream_position()?;

    let mut items = Vec::with_capacity(indexes.len());
    for entry in &indexes {
        let start = base + entry.start as u64;
        r.seek(SeekFrom::Start(start))?;
        let bytes = read_bytes(r, entry.length as usize)?;
        items.push(deserialize(&bytes, context)?);
        end = end.max(start + entry.length as u64);
    }

    r.seek(SeekFrom::Start(end))?;
    Ok(items)
}
