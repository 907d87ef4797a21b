// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Font header and section table entries.
//!
//! The font header is 16 bytes of fixed-size fields at offset 0. It carries the
//! size of everything after it and a CRC32 over those bytes, so a truncated or
//! bit-flipped file is rejected before any section is parsed.
//!
//! The section table is the single source of truth for what lives in a file.
//! Loading instantiates sections from these entries, in this order; nothing is
//! re-derived from the in-memory roster.

use std::io::{self, Read, Write};

use crc32fast::Hasher as Crc32Hasher;

use super::codec::{read_u16, read_u32, write_u16, write_u32};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "NUSF" in ASCII
pub const MAGIC: [u8; 4] = [0x4E, 0x55, 0x53, 0x46];

/// Current format version
pub const VERSION: u16 = 3;

/// Maximum file size: 512 MB (prevents huge allocations on load)
pub const MAX_FILE_SIZE: usize = 512 * 1024 * 1024;

// ============================================================================
// HEADER
// ============================================================================

/// Fixed font header (16 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontHeader {
    pub version: u16,
    pub flags: u16,
    /// Bytes following the header
    pub data_size: u32,
    /// CRC32 of the bytes following the header
    pub crc32: u32,
}

impl FontHeader {
    // 4 (magic) + 2 (version) + 2 (flags) + 4 (data_size) + 4 (crc32) = 16
    pub const SIZE: usize = 16;

    /// Placeholder header, back-patched once the data is written.
    pub fn placeholder() -> Self {
        Self {
            version: VERSION,
            flags: 0,
            data_size: 0,
            crc32: 0,
        }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        write_u16(w, self.version)?;
        write_u16(w, self.flags)?;
        write_u32(w, self.data_size)?;
        write_u32(w, self.crc32)?;
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid magic: expected NUSF, got {:?}", magic),
            ));
        }

        Ok(Self {
            version: read_u16(r)?,
            flags: read_u16(r)?,
            data_size: read_u32(r)?,
            crc32: read_u32(r)?,
        })
    }

    /// Compute CRC32 over the given bytes
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}

// ============================================================================
// SECTION TABLE
// ============================================================================

/// One row of the section table: which section, and where its bytes are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    pub id: u32,
    /// Absolute file offset of the section payload
    pub offset: u32,
    pub size: u32,
}

impl SectionEntry {
    pub const SIZE: usize = 12;

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_u32(w, self.id)?;
        write_u32(w, self.offset)?;
        write_u32(w, self.size)
    }

    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            id: read_u32(r)?,
            offset: read_u32(r)?,
            size: read_u32(r)?,
        })
    }

    /// End offset, or `None` if it overflows.
    pub fn end(&self) -> Option<u32> {
        self.offset.checked_add(self.size)
    }
}
