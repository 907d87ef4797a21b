// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Append-only string pool with byte-offset handles.
//!
//! Strings are stored as UTF-16LE with a zero terminator. A handle is the byte
//! offset of the first code unit, which is what the font's feature table
//! records. The pool is written through a length-preserving keystream
//! transform; `encrypt` and `decrypt` are the same XOR, named separately so
//! call sites read in the direction they mean.

use std::io;

/// Keystream seed for the pool transform.
const POOL_KEY: u32 = 0x4E55_5346;

/// UTF-16 string pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringPool {
    bytes: Vec<u8>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-decrypted pool bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Append a string and return its byte offset.
    pub fn append(&mut self, s: &str) -> u32 {
        let offset = self.bytes.len() as u32;
        for unit in s.encode_utf16() {
            self.bytes.extend_from_slice(&unit.to_le_bytes());
        }
        self.bytes.extend_from_slice(&[0, 0]);
        offset
    }

    /// Read the zero-terminated string at `offset`.
    pub fn get(&self, offset: u32) -> io::Result<String> {
        let start = offset as usize;
        if start % 2 != 0 || start >= self.bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("string pool offset {} out of range", offset),
            ));
        }

        let mut units = Vec::new();
        let mut terminated = false;
        for pair in self.bytes[start..].chunks_exact(2) {
            let unit = u16::from_le_bytes([pair[0], pair[1]]);
            if unit == 0 {
                terminated = true;
                break;
            }
            units.push(unit);
        }
        if !terminated {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("unterminated string at pool offset {}", offset),
            ));
        }

        String::from_utf16(&units).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// xorshift32 keystream
fn apply_keystream(bytes: &[u8]) -> Vec<u8> {
    let mut state = POOL_KEY;
    bytes
        .iter()
        .map(|&b| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            b ^ (state as u8)
        })
        .collect()
}

/// Obfuscate pool bytes for storage. Output length equals input length.
pub fn encrypt(bytes: &[u8]) -> Vec<u8> {
    apply_keystream(bytes)
}

/// Inverse of [`encrypt`].
pub fn decrypt(bytes: &[u8]) -> Vec<u8> {
    apply_keystream(bytes)
}
