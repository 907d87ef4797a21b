// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Voice font loading under adversarial input.
//!
//! Fonts are shipped to devices and loaded at startup, so a damaged or
//! crafted file must produce an error, never a panic or a runaway
//! allocation. Counts, offsets, and sizes all come from the file.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nusfont::VoiceFont;

fuzz_target!(|data: &[u8]| {
    let Ok(mut font) = VoiceFont::from_bytes(data) else {
        return;
    };

    // INVARIANT: a font that loads rewrites to a font that loads the same
    let rewritten = font.to_bytes().expect("loaded font must rewrite");
    let reloaded = VoiceFont::from_bytes(&rewritten).expect("rewritten font must load");
    assert_eq!(reloaded.features(), font.features());
    assert_eq!(reloaded.units().len(), font.units().len());
    assert_eq!(reloaded.entries(), font.entries());

    // INVARIANT: every grouped unit index is inside the arena
    if let Some(trie) = font.trie_section() {
        for group in trie.groups() {
            for &i in group {
                assert!((i as usize) < font.units().len(), "group references unit {}", i);
            }
        }
    }
});
