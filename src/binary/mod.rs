// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary building blocks for voice font files.
//!
//! Three layers, leaves first. `codec` reads and writes fixed-width
//! little-endian fields. `indexed` frames a list of variable-length records
//! as a relocatable table. `header` and `string_pool` describe the pieces of
//! the container that aren't sections.
//!
//! # File Layout
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ FONT HEADER (16 bytes)                                     │
//! │   magic: [u8; 4] = "NUSF"                                  │
//! │   version: u16, flags: u16                                 │
//! │   data_size: u32 (bytes after header), crc32: u32          │
//! ├────────────────────────────────────────────────────────────┤
//! │ featureCount: i32, sectionCount: i32                       │
//! │ poolOffset: u32, poolSize: u32                             │
//! ├────────────────────────────────────────────────────────────┤
//! │ feature name pool offsets: [u32; featureCount]             │
//! ├────────────────────────────────────────────────────────────┤
//! │ section table: [(id: u32, offset: u32, size: u32)]         │
//! ├────────────────────────────────────────────────────────────┤
//! │ section payloads, in table order                           │
//! ├────────────────────────────────────────────────────────────┤
//! │ string pool (UTF-16LE, keystream-obfuscated)               │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
mod header;
mod indexed;
mod string_pool;

pub use header::{FontHeader, SectionEntry, MAGIC, MAX_FILE_SIZE, VERSION};
pub use indexed::{read_index, read_indexed_items, write_indexed_items, IndexEntry};
pub use string_pool::{decrypt, encrypt, StringPool};
