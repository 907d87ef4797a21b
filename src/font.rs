// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The voice font container.
//!
//! A [`VoiceFont`] owns the feature list, the unit arena, and an ordered
//! roster of sections. Building picks the roster from a [`FontConfig`];
//! loading takes it from the file's section table and nothing else.
//!
//! # Write
//!
//! The whole file is produced in one pass over an in-memory cursor. Fields
//! whose values are only known later (section table, pool location, data size,
//! CRC) are written as placeholders and patched at the end.
//!
//! # Load
//!
//! The header is checked first: size cap, magic, version, data size, CRC.
//! Sections are then loaded in table order against one shared unit arena, and
//! each must start exactly where the previous one ended and consume exactly
//! the bytes its entry claims.

use std::fs;
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use crate::binary::codec::{len_i32, pos_u32, read_count, read_u32, write_i32, write_u32};
use crate::binary::{decrypt, encrypt, FontHeader, SectionEntry, StringPool, MAGIC, MAX_FILE_SIZE, VERSION};
use crate::config::{FontConfig, FontVariant, PromptConfig};
use crate::error::{FontError, Result};
use crate::section::{
    CandidateSection, EmotionSection, LoadContext, LongUnitSection, PromptSection, ProsodySection,
    Section, SectionBody, SectionId, TargetSection, TemplateSection, TrieMode, TrieSection,
    UnitSection, WriteContext,
};
use crate::types::{LinguisticFeature, NonUniformUnit};

/// Bytes between the font header and the feature offsets.
const COUNTS_SIZE: u64 = 16;

/// An in-memory voice font.
#[derive(Debug, Clone)]
pub struct VoiceFont {
    header: FontHeader,
    features: Vec<LinguisticFeature>,
    units: Vec<NonUniformUnit>,
    templates: Vec<NonUniformUnit>,
    sections: Vec<Section>,
}

fn check_template_refs(templates: &[NonUniformUnit], unit_count: usize) -> Result<()> {
    for (t, template) in templates.iter().enumerate() {
        for (i, refs) in template.template_instances.iter().enumerate() {
            if let Some(&bad) = refs.iter().find(|&&u| u < 0 || u as usize >= unit_count) {
                return Err(FontError::shape(format!(
                    "template {} instance {} references unit {} of {}",
                    t, i, bad, unit_count
                )));
            }
        }
    }
    Ok(())
}

impl VoiceFont {
    // ========================================================================
    // BUILD
    // ========================================================================

    /// Build a font from a unit inventory.
    ///
    /// For [`FontVariant::Template`] the inventory is split on
    /// `is_template`: normal units fill the per-unit sections and template
    /// units are indexed by the trie. Other variants treat every unit as
    /// normal.
    pub fn build(
        features: Vec<LinguisticFeature>,
        units: Vec<NonUniformUnit>,
        config: &FontConfig,
    ) -> Result<Self> {
        let (units, templates): (Vec<_>, Vec<_>) = match config.variant {
            FontVariant::Template => units.into_iter().partition(|u| !u.is_template),
            _ => {
                let flagged = units.iter().filter(|u| u.is_template).count();
                if flagged > 0 {
                    log::warn!(
                        "{} units are flagged as templates but the variant is {:?}; treating them as normal units",
                        flagged,
                        config.variant
                    );
                }
                (units, Vec::new())
            }
        };

        if config.prompt.is_none() && units.iter().any(|u| u.trajectory.is_some()) {
            log::warn!("units carry prompt trajectories but no prompt config was given; they will not be stored");
        }

        let mut bodies = vec![
            SectionBody::Unit(UnitSection),
            SectionBody::Target(TargetSection),
        ];
        match config.variant {
            FontVariant::Standard => {
                bodies.push(SectionBody::Candidate(CandidateSection));
                bodies.push(SectionBody::Trie(TrieSection::from_units(&units)?));
                bodies.push(SectionBody::Emotion(EmotionSection));
                bodies.push(SectionBody::Prosody(ProsodySection::new(config.prosody)));
            }
            FontVariant::Template => {
                check_template_refs(&templates, units.len())?;
                let (trie, index) = TrieSection::from_templates(&templates)?;
                bodies.push(SectionBody::Candidate(CandidateSection));
                bodies.push(SectionBody::Trie(trie));
                bodies.push(SectionBody::Template(TemplateSection::new(index)));
                bodies.push(SectionBody::Emotion(EmotionSection));
                bodies.push(SectionBody::Prosody(ProsodySection::new(config.prosody)));
            }
            FontVariant::LongUnit => {
                bodies.push(SectionBody::Trie(TrieSection::from_units(&units)?));
                bodies.push(SectionBody::LongUnit(LongUnitSection));
                bodies.push(SectionBody::Emotion(EmotionSection));
            }
        }
        if let Some(prompt) = config.prompt {
            bodies.push(SectionBody::Prompt(PromptSection::new(prompt)));
        }

        log::debug!(
            "{:?} roster: {}",
            config.variant,
            bodies.iter().map(|b| b.id().name()).collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            header: FontHeader::placeholder(),
            features,
            units,
            templates,
            sections: bodies.into_iter().map(Section::new).collect(),
        })
    }

    // ========================================================================
    // WRITE
    // ========================================================================

    /// Serialize to a file.
    pub fn write(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path.as_ref(), &bytes)?;
        log::info!("wrote {} ({} bytes)", path.as_ref().display(), bytes.len());
        Ok(())
    }

    /// Serialize to bytes, recording each section's offset and size.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut w = Cursor::new(Vec::new());
        FontHeader::placeholder().write(&mut w)?;

        write_i32(&mut w, len_i32(self.features.len())?)?;
        write_i32(&mut w, len_i32(self.sections.len())?)?;
        let pool_field = w.stream_position()?;
        write_u32(&mut w, 0)?;
        write_u32(&mut w, 0)?;

        let mut pool = StringPool::new();
        for feature in &self.features {
            write_u32(&mut w, pool.append(&feature.name))?;
        }

        let table_pos = w.stream_position()?;
        w.write_all(&vec![0u8; self.sections.len() * SectionEntry::SIZE])?;

        let ctx = WriteContext {
            features: &self.features,
            units: &self.units,
        };
        for section in &mut self.sections {
            section.write(&mut w, &ctx)?;
        }

        let pool_offset = pos_u32(w.stream_position()?)?;
        w.write_all(&encrypt(pool.as_bytes()))?;
        let end = w.stream_position()?;

        w.seek(SeekFrom::Start(pool_field))?;
        write_u32(&mut w, pool_offset)?;
        write_u32(&mut w, pos_u32(pool.len() as u64)?)?;
        w.seek(SeekFrom::Start(table_pos))?;
        for section in &self.sections {
            section.entry().write(&mut w)?;
        }

        let mut bytes = w.into_inner();
        let data = &bytes[FontHeader::SIZE..];
        let header = FontHeader {
            version: VERSION,
            flags: self.header.flags,
            data_size: pos_u32(data.len() as u64)?,
            crc32: FontHeader::compute_crc32(data),
        };
        let mut patched = Vec::with_capacity(FontHeader::SIZE);
        header.write(&mut patched)?;
        bytes[..FontHeader::SIZE].copy_from_slice(&patched);
        self.header = header;

        debug_assert_eq!(bytes.len() as u64, end);
        log::info!(
            "serialized font: {} features, {} units, {} sections, {} bytes",
            self.features.len(),
            self.units.len(),
            self.sections.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    // ========================================================================
    // LOAD
    // ========================================================================

    /// Load a font file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let len = fs::metadata(path)?.len();
        if len > MAX_FILE_SIZE as u64 {
            return Err(FontError::corrupt(format!(
                "{} is {} bytes, larger than the {} byte limit",
                path.display(),
                len,
                MAX_FILE_SIZE
            )));
        }
        let font = Self::from_bytes(&fs::read(path)?)?;
        log::info!("loaded {} ({} bytes)", path.display(), len);
        Ok(font)
    }

    /// Parse a font from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = check_header(bytes)?;

        let mut r = Cursor::new(bytes);
        r.set_position(FontHeader::SIZE as u64);
        let feature_count = read_count(&mut r)?;
        let section_count = read_count(&mut r)?;
        let pool_offset = u64::from(read_u32(&mut r)?);
        let pool_size = u64::from(read_u32(&mut r)?);

        let fixed = (FontHeader::SIZE as u64 + COUNTS_SIZE)
            .saturating_add(feature_count as u64 * 4)
            .saturating_add(section_count as u64 * SectionEntry::SIZE as u64);
        if fixed > bytes.len() as u64 {
            return Err(FontError::corrupt(format!(
                "{} features and {} sections don't fit in {} bytes",
                feature_count,
                section_count,
                bytes.len()
            )));
        }

        let mut name_offsets = Vec::with_capacity(feature_count);
        for _ in 0..feature_count {
            name_offsets.push(read_u32(&mut r)?);
        }
        let mut entries = Vec::with_capacity(section_count);
        for _ in 0..section_count {
            entries.push(SectionEntry::read(&mut r)?);
        }

        let mut ctx = LoadContext::new(feature_count);
        let mut sections = Vec::with_capacity(section_count);
        for entry in &entries {
            let pos = r.position();
            if u64::from(entry.offset) != pos {
                return Err(FontError::corrupt(format!(
                    "section {} starts at {}, expected {}",
                    entry.id, entry.offset, pos
                )));
            }
            let end = entry
                .end()
                .map(u64::from)
                .filter(|&end| end <= bytes.len() as u64)
                .ok_or_else(|| {
                    FontError::corrupt(format!(
                        "section {} at {} with {} bytes runs past the end of the file",
                        entry.id, entry.offset, entry.size
                    ))
                })?;
            sections.push(Section::load(entry, &bytes[pos as usize..end as usize], &mut ctx)?);
            r.set_position(end);
        }

        if pool_offset != r.position() || pool_offset + pool_size != bytes.len() as u64 {
            return Err(FontError::corrupt(format!(
                "string pool at {}..{} doesn't follow the last section at {} and end the file at {}",
                pool_offset,
                pool_offset + pool_size,
                r.position(),
                bytes.len()
            )));
        }
        let pool = StringPool::from_bytes(decrypt(&bytes[pool_offset as usize..]));
        let features = name_offsets
            .iter()
            .enumerate()
            .map(|(i, &offset)| {
                pool.get(offset)
                    .map(LinguisticFeature::new)
                    .map_err(|e| FontError::corrupt(format!("feature {} name: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let units = ctx.units.unwrap_or_default();
        let dangling = template_section(&sections).and_then(|t| t.dangling_ref(units.len()));
        if let Some((id, segment, unit)) = dangling {
            return Err(FontError::corrupt(format!(
                "template {} segment {} references unit {} of {}",
                id,
                segment,
                unit,
                units.len()
            )));
        }
        log::info!(
            "parsed font v{}: {} features, {} units, {} sections",
            header.version,
            features.len(),
            units.len(),
            sections.len()
        );

        Ok(Self {
            header,
            features,
            units,
            templates: Vec::new(),
            sections,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Header of the last write or load.
    pub fn header(&self) -> &FontHeader {
        &self.header
    }

    pub fn features(&self) -> &[LinguisticFeature] {
        &self.features
    }

    /// Normal units, in unit-index order.
    pub fn units(&self) -> &[NonUniformUnit] {
        &self.units
    }

    /// Template units given at build time. Empty for loaded fonts, whose
    /// template section carries only the references.
    pub fn templates(&self) -> &[NonUniformUnit] {
        &self.templates
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The section table as it would be written.
    pub fn entries(&self) -> Vec<SectionEntry> {
        self.sections.iter().map(Section::entry).collect()
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id() == id)
    }

    pub fn trie_section(&self) -> Option<&TrieSection> {
        match self.section(SectionId::Trie)?.body() {
            SectionBody::Trie(t) => Some(t),
            _ => None,
        }
    }

    /// `[trie id][segment][reference]`, for template fonts.
    pub fn template_index(&self) -> Option<&[Vec<Vec<i32>>]> {
        template_section(&self.sections).map(TemplateSection::templates)
    }

    pub fn prompt_config(&self) -> Option<PromptConfig> {
        match self.section(SectionId::Prompt)?.body() {
            SectionBody::Prompt(p) => Some(p.config),
            _ => None,
        }
    }

    /// Units whose phone sequence is exactly `phones`.
    pub fn lookup(&self, phones: &[u16]) -> Option<&[i32]> {
        self.trie_section()?.lookup(phones)
    }

    /// Replace the unit arena.
    ///
    /// Every section is switched back to regenerating its bytes, and a
    /// unit-mode trie is rebuilt over the new units. A template-mode trie
    /// indexes template units, which a loaded font doesn't have, so it keeps
    /// its loaded index. That index must still resolve against `units`; if it
    /// doesn't, nothing is changed.
    pub fn replace_units(&mut self, units: Vec<NonUniformUnit>) -> Result<()> {
        let dangling = template_section(&self.sections).and_then(|t| t.dangling_ref(units.len()));
        if let Some((id, segment, unit)) = dangling {
            return Err(FontError::shape(format!(
                "template {} segment {} references unit {} but only {} units replace the arena",
                id,
                segment,
                unit,
                units.len()
            )));
        }
        for section in &mut self.sections {
            let unit_trie = matches!(section.body(), SectionBody::Trie(t) if t.mode() == TrieMode::Units);
            if unit_trie {
                section.set_body(SectionBody::Trie(TrieSection::from_units(&units)?));
                continue;
            }
            if matches!(section.id(), SectionId::Trie | SectionId::Template) && section.is_loaded() {
                log::warn!("{} section keeps its loaded template index", section.id());
            }
            section.invalidate();
        }
        self.units = units;
        Ok(())
    }
}

fn template_section(sections: &[Section]) -> Option<&TemplateSection> {
    sections.iter().find_map(|s| match s.body() {
        SectionBody::Template(t) => Some(t),
        _ => None,
    })
}

/// Validate everything the font header promises about `bytes`.
fn check_header(bytes: &[u8]) -> Result<FontHeader> {
    if bytes.len() > MAX_FILE_SIZE {
        return Err(FontError::corrupt(format!(
            "font is {} bytes, larger than the {} byte limit",
            bytes.len(),
            MAX_FILE_SIZE
        )));
    }
    if bytes.len() < FontHeader::SIZE + COUNTS_SIZE as usize {
        return Err(FontError::corrupt(format!("font is only {} bytes", bytes.len())));
    }
    if bytes[..4] != MAGIC {
        return Err(FontError::corrupt(format!("bad magic {:?}", &bytes[..4])));
    }

    let header = FontHeader::read(&mut Cursor::new(bytes))?;
    if header.version != VERSION {
        return Err(FontError::corrupt(format!(
            "format version {}, expected {}",
            header.version, VERSION
        )));
    }
    let data = &bytes[FontHeader::SIZE..];
    if header.data_size as usize != data.len() {
        return Err(FontError::corrupt(format!(
            "header says {} data bytes, file has {}",
            header.data_size,
            data.len()
        )));
    }
    let actual = FontHeader::compute_crc32(data);
    if header.crc32 != actual {
        return Err(FontError::corrupt(format!(
            "CRC mismatch: header {:08x}, data {:08x}",
            header.crc32, actual
        )));
    }
    Ok(header)
}
