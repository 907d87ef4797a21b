// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for voice font reading and writing.
//!
//! Four kinds of failure, all fatal to the operation that raised them:
//!
//! - **Io**: the stream itself failed (missing file, truncated read). Passed
//!   through untouched so callers can still match on `io::ErrorKind`.
//! - **DataShape**: the records don't fit the format (ragged candidate rows,
//!   duration sums that disagree with frame counts, empty phone keys).
//! - **Corrupt**: the file disagrees with itself (a section that doesn't end
//!   where the table says it does, a bad checksum, a size mismatch).
//! - **Unsupported**: a value the format can't carry (string feature values,
//!   unknown precision flags).

use std::io;

use thiserror::Error;

/// Errors raised by the codec, sections, and container.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("data shape error: {0}")]
    DataShape(String),

    #[error("corrupt voice font: {0}")]
    Corrupt(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl FontError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        FontError::DataShape(msg.into())
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        FontError::Corrupt(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        FontError::Unsupported(msg.into())
    }

    /// True for errors caused by running off the end of the stream.
    pub fn is_eof(&self) -> bool {
        matches!(self, FontError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}

pub type Result<T> = std::result::Result<T, FontError>;
