// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Voice font sections.
//!
//! A font is an ordered list of sections. Each section kind owns one slice of
//! the unit model (phones, pitch targets, candidates, ...) and knows how to
//! write it and read it back. The set of kinds is closed: [`SectionBody`] is a
//! sum type, and [`SectionBody::for_id`] is the registry that maps an on-disk
//! tag to an empty section ready to load.
//!
//! # Payload state
//!
//! A section built from a live model is `Fresh` and regenerates its bytes on
//! every write. A section read from a file is `Loaded` and keeps the exact
//! bytes it was read from, so writing a loaded font back out reproduces the
//! file byte for byte. [`Section::invalidate`] drops the cached bytes when the
//! model has been edited and should be re-serialized.
//!
//! # Load order
//!
//! The unit section allocates the unit arena in [`LoadContext`]. Every later
//! section that carries per-unit data finds its units by position in that
//! arena and requires the counts to match exactly.
//!
//! | Section   | Id | Reads/writes                            |
//! |-----------|----|-----------------------------------------|
//! | Unit      | 1  | `phones` (allocates the arena)          |
//! | Target    | 2  | `pitch_target`                          |
//! | Candidate | 3  | `candidates`                            |
//! | Trie      | 4  | trie blob + unit groups (own state)     |
//! | Emotion   | 5  | `emotion`                               |
//! | Prosody   | 6  | `best_prosody`                          |
//! | Prompt    | 7  | `trajectory`                            |
//! | LongUnit  | 8  | `sub_ranges`                            |
//! | Template  | 9  | template reference index (own state)    |

mod candidate;
mod emotion;
mod long_unit;
mod prompt;
mod prosody;
pub mod quantize;
mod target;
mod template;
mod trie;
mod unit;

pub use candidate::CandidateSection;
pub use emotion::EmotionSection;
pub use long_unit::LongUnitSection;
pub use prompt::PromptSection;
pub use prosody::{best_prosody_item, ProsodySection};
pub use target::TargetSection;
pub use template::TemplateSection;
pub use trie::{TrieMode, TrieSection};
pub use unit::UnitSection;

use std::fmt;
use std::io::{Cursor, Read, Seek, Write};

use crate::binary::codec::pos_u32;
use crate::binary::SectionEntry;
use crate::error::{FontError, Result};
use crate::types::{LinguisticFeature, NonUniformUnit};

/// On-disk section tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SectionId {
    Unit = 1,
    Target = 2,
    Candidate = 3,
    Trie = 4,
    Emotion = 5,
    Prosody = 6,
    Prompt = 7,
    LongUnit = 8,
    Template = 9,
}

impl SectionId {
    pub fn from_u32(id: u32) -> Option<Self> {
        Some(match id {
            1 => Self::Unit,
            2 => Self::Target,
            3 => Self::Candidate,
            4 => Self::Trie,
            5 => Self::Emotion,
            6 => Self::Prosody,
            7 => Self::Prompt,
            8 => Self::LongUnit,
            9 => Self::Template,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unit => "UNIT",
            Self::Target => "TARGET",
            Self::Candidate => "CANDIDATE",
            Self::Trie => "TRIE",
            Self::Emotion => "EMOTION",
            Self::Prosody => "PROSODY",
            Self::Prompt => "PROMPT",
            Self::LongUnit => "LONG_UNIT",
            Self::Template => "TEMPLATE",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a section may read while writing.
#[derive(Debug, Clone, Copy)]
pub struct WriteContext<'a> {
    pub features: &'a [LinguisticFeature],
    pub units: &'a [NonUniformUnit],
}

/// Shared state threaded through a font load.
#[derive(Debug, Default)]
pub struct LoadContext {
    /// Feature values stored per phone
    pub feature_count: usize,
    /// Unit arena, allocated by the unit section
    pub units: Option<Vec<NonUniformUnit>>,
}

impl LoadContext {
    pub fn new(feature_count: usize) -> Self {
        Self {
            feature_count,
            units: None,
        }
    }

    /// The arena, checked to hold exactly `count` units.
    pub(crate) fn units_mut(&mut self, section: SectionId, count: usize) -> Result<&mut [NonUniformUnit]> {
        let units = self.units.as_mut().ok_or_else(|| {
            FontError::shape(format!("{} section loaded before the unit section", section))
        })?;
        if units.len() != count {
            return Err(FontError::shape(format!(
                "{} section has {} entries but there are {} units",
                section,
                count,
                units.len()
            )));
        }
        Ok(units)
    }
}

/// The closed set of section kinds.
#[derive(Debug, Clone)]
pub enum SectionBody {
    Unit(UnitSection),
    Target(TargetSection),
    Candidate(CandidateSection),
    Trie(TrieSection),
    Emotion(EmotionSection),
    Prosody(ProsodySection),
    Prompt(PromptSection),
    LongUnit(LongUnitSection),
    Template(TemplateSection),
}

impl SectionBody {
    /// Registry: an empty section of the kind `id` names, ready to load.
    pub fn for_id(id: u32) -> Result<Self> {
        let id = SectionId::from_u32(id)
            .ok_or_else(|| FontError::corrupt(format!("unknown section id {}", id)))?;
        Ok(match id {
            SectionId::Unit => Self::Unit(UnitSection),
            SectionId::Target => Self::Target(TargetSection),
            SectionId::Candidate => Self::Candidate(CandidateSection),
            SectionId::Trie => Self::Trie(TrieSection::empty()),
            SectionId::Emotion => Self::Emotion(EmotionSection),
            SectionId::Prosody => Self::Prosody(ProsodySection::default()),
            SectionId::Prompt => Self::Prompt(PromptSection::default()),
            SectionId::LongUnit => Self::LongUnit(LongUnitSection),
            SectionId::Template => Self::Template(TemplateSection::default()),
        })
    }

    pub fn id(&self) -> SectionId {
        match self {
            Self::Unit(_) => SectionId::Unit,
            Self::Target(_) => SectionId::Target,
            Self::Candidate(_) => SectionId::Candidate,
            Self::Trie(_) => SectionId::Trie,
            Self::Emotion(_) => SectionId::Emotion,
            Self::Prosody(_) => SectionId::Prosody,
            Self::Prompt(_) => SectionId::Prompt,
            Self::LongUnit(_) => SectionId::LongUnit,
            Self::Template(_) => SectionId::Template,
        }
    }

    fn write_data<W: Write + Seek>(&self, w: &mut W, ctx: &WriteContext<'_>) -> Result<()> {
        match self {
            Self::Unit(s) => s.write_data(w, ctx),
            Self::Target(s) => s.write_data(w, ctx),
            Self::Candidate(s) => s.write_data(w, ctx),
            Self::Trie(s) => s.write_data(w),
            Self::Emotion(s) => s.write_data(w, ctx),
            Self::Prosody(s) => s.write_data(w, ctx),
            Self::Prompt(s) => s.write_data(w, ctx),
            Self::LongUnit(s) => s.write_data(w, ctx),
            Self::Template(s) => s.write_data(w),
        }
    }

    fn load_data<R: Read + Seek>(&mut self, r: &mut R, ctx: &mut LoadContext) -> Result<()> {
        match self {
            Self::Unit(s) => s.load_data(r, ctx),
            Self::Target(s) => s.load_data(r, ctx),
            Self::Candidate(s) => s.load_data(r, ctx),
            Self::Trie(s) => s.load_data(r, ctx),
            Self::Emotion(s) => s.load_data(r, ctx),
            Self::Prosody(s) => s.load_data(r, ctx),
            Self::Prompt(s) => s.load_data(r, ctx),
            Self::LongUnit(s) => s.load_data(r, ctx),
            Self::Template(s) => s.load_data(r),
        }
    }
}

/// Where a section's bytes come from on the next write.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Payload {
    /// Regenerate from the live model
    Fresh,
    /// Pass through the bytes the section was loaded from
    Loaded(Vec<u8>),
}

/// A section plus its placement in the file.
#[derive(Debug, Clone)]
pub struct Section {
    body: SectionBody,
    offset: u32,
    size: u32,
    payload: Payload,
}

impl Section {
    pub fn new(body: SectionBody) -> Self {
        Self {
            body,
            offset: 0,
            size: 0,
            payload: Payload::Fresh,
        }
    }

    pub fn id(&self) -> SectionId {
        self.body.id()
    }

    pub fn body(&self) -> &SectionBody {
        &self.body
    }

    /// Absolute offset of the last write or load.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Byte size of the last write or load.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.payload, Payload::Loaded(_))
    }

    /// Forget the loaded bytes; the next write regenerates from the model.
    pub fn invalidate(&mut self) {
        self.payload = Payload::Fresh;
    }

    /// Swap in a rebuilt body of the same kind. Drops any loaded bytes.
    pub(crate) fn set_body(&mut self, body: SectionBody) {
        debug_assert_eq!(body.id(), self.id());
        self.body = body;
        self.payload = Payload::Fresh;
    }

    pub fn entry(&self) -> SectionEntry {
        SectionEntry {
            id: self.id() as u32,
            offset: self.offset,
            size: self.size,
        }
    }

    /// Write at the current position, recording `offset` and `size`.
    pub fn write<W: Write + Seek>(&mut self, w: &mut W, ctx: &WriteContext<'_>) -> Result<()> {
        let start = w.stream_position()?;
        match &self.payload {
            Payload::Loaded(bytes) => w.write_all(bytes)?,
            Payload::Fresh => self.body.write_data(w, ctx)?,
        }
        let end = w.stream_position()?;
        self.offset = pos_u32(start)?;
        self.size = pos_u32(end - start)?;
        log::debug!(
            "wrote {} section at {} ({} bytes{})",
            self.id(),
            self.offset,
            self.size,
            if self.is_loaded() { ", passthrough" } else { "" }
        );
        Ok(())
    }

    /// Load the section `entry` describes from exactly its `size` bytes.
    ///
    /// Fails with a corruption error unless parsing consumes every byte.
    pub fn load(entry: &SectionEntry, bytes: &[u8], ctx: &mut LoadContext) -> Result<Self> {
        let mut body = SectionBody::for_id(entry.id)?;
        if bytes.len() != entry.size as usize {
            return Err(FontError::corrupt(format!(
                "{} section expects {} bytes, got {}",
                body.id(),
                entry.size,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        body.load_data(&mut cursor, ctx)?;
        let consumed = cursor.position();
        if consumed != u64::from(entry.size) {
            return Err(FontError::corrupt(format!(
                "{} section at {} ended at {}, expected {}",
                body.id(),
                entry.offset,
                u64::from(entry.offset) + consumed,
                u64::from(entry.offset) + u64::from(entry.size)
            )));
        }
        log::debug!(
            "loaded {} section at {} ({} bytes)",
            body.id(),
            entry.offset,
            entry.size
        );

        Ok(Self {
            body,
            offset: entry.offset,
            size: entry.size,
            payload: Payload::Loaded(bytes.to_vec()),
        })
    }
}

/// Serialize one item into a scratch buffer, the way every per-unit writer does.
pub(crate) fn scratch<F>(f: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut buf = Vec::new();
    f(&mut buf)?;
    Ok(buf)
}
