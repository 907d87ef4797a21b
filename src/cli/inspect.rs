// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `nusfont inspect`: header, features, and section table of a font.

use nusfont::section::{SectionBody, TrieMode};
use nusfont::VoiceFont;

use super::display::{
    format_size, pad_left, pad_right, row, section_badge, section_bot, section_mid, section_top,
    themed, BOLD, GRAY, GREEN,
};

pub fn inspect_font(path: &str) -> Result<(), String> {
    let font = VoiceFont::load(path).map_err(|e| format!("{}: {}", path, e))?;
    let header = font.header();

    section_top("HEADER");
    row(&format!(" file        {}", path));
    row(&format!(" version     {}", header.version));
    row(&format!(" data size   {}", format_size(header.data_size as usize)));
    row(&format!(" crc32       {}", themed(GREEN, &[], &format!("{:08x}", header.crc32))));
    row(&format!(" units       {}", font.units().len()));

    section_mid("FEATURES");
    if font.features().is_empty() {
        row(&themed(GRAY, &[], " (none)"));
    }
    for (i, feature) in font.features().iter().enumerate() {
        row(&format!(" {:>3}  {}", i, feature.name));
    }

    section_mid("SECTIONS");
    row(&themed(
        GRAY,
        &[BOLD],
        &format!(" {}  {}  {}  {}", pad_right("ID", 3), pad_right("NAME", 12), pad_left("OFFSET", 10), pad_left("SIZE", 10)),
    ));
    for section in font.sections() {
        let detail = match section.body() {
            SectionBody::Trie(t) => match t.mode() {
                TrieMode::Units => format!("{} keys, {} groups", t.trie().key_count(), t.groups().len()),
                TrieMode::Templates => format!("{} keys, template mode", t.trie().key_count()),
            },
            SectionBody::Template(t) => format!("{} groups", t.templates().len()),
            SectionBody::Prosody(p) if !p.enabled => "disabled".to_string(),
            SectionBody::Prompt(p) => format!(
                "{:?}, orders {}/{}/{}",
                p.config.precision, p.config.lsp_order, p.config.f0_order, p.config.gain_order
            ),
            _ => String::new(),
        };
        row(&format!(
            " {}  {}  {}  {}  {}",
            pad_right(&(section.id() as u32).to_string(), 3),
            pad_right(&section_badge(section.id()), 12),
            pad_left(&section.offset().to_string(), 10),
            pad_left(&format_size(section.size() as usize), 10),
            themed(GRAY, &[], &detail)
        ));
    }
    section_bot();
    Ok(())
}
