// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Build-then-load round trips over arbitrary inventories.
//!
//! The fuzzer picks phone sequences, pitch targets, and candidate matrices;
//! whatever builds must load back with the same lookups.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nusfont::{FeaturePhone, FontConfig, NonUniformUnit, VoiceFont};

#[derive(Debug, Arbitrary)]
struct FuzzUnit {
    phones: Vec<u16>,
    pitch: Vec<f32>,
    candidates: Option<Vec<Vec<i32>>>,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    units: Vec<FuzzUnit>,
    prosody: bool,
}

fuzz_target!(|input: FuzzInput| {
    if input.units.len() > 64 {
        return;
    }
    let units: Vec<NonUniformUnit> = input
        .units
        .into_iter()
        .map(|u| NonUniformUnit {
            phones: u.phones.iter().map(|&p| FeaturePhone::new(p, Vec::new())).collect(),
            pitch_target: u.pitch,
            candidates: u.candidates,
            ..Default::default()
        })
        .collect();
    let config = FontConfig {
        prosody: input.prosody,
        ..FontConfig::default()
    };

    // Empty or overlong phone sequences and ragged matrices are build errors
    let Ok(mut font) = VoiceFont::build(Vec::new(), units.clone(), &config) else {
        return;
    };
    let Ok(bytes) = font.to_bytes() else {
        return;
    };

    let loaded = VoiceFont::from_bytes(&bytes).expect("built font must load");
    assert_eq!(loaded.units().len(), units.len());
    for (i, unit) in units.iter().enumerate() {
        let group = loaded.lookup(&unit.phone_ids()).expect("unit must be indexed");
        assert!(group.contains(&(i as i32)));
        // NaN != NaN, so compare bit patterns
        let a: Vec<u32> = unit.pitch_target.iter().map(|v| v.to_bits()).collect();
        let b: Vec<u32> = loaded.units()[i].pitch_target.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a, b);
    }
});
