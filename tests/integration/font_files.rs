//! Write and reload every font variant through real files.

use nusfont::section::TrieMode;
use nusfont::{FontConfig, FontVariant, Precision, ProsodyItem, SectionId, VoiceFont};
use tempfile::TempDir;

use super::common::{
    assert_sections_contiguous, config, features, long_units, prompt_config, sample_units,
    template_inventory, trajectory,
};

fn ids(font: &VoiceFont) -> Vec<SectionId> {
    font.sections().iter().map(|s| s.id()).collect()
}

// ============================================================================
// STANDARD
// ============================================================================

#[test]
fn test_standard_font_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("standard.nus");

    let units = sample_units();
    let mut font = VoiceFont::build(features(2), units.clone(), &FontConfig::default()).unwrap();
    font.write(&path).unwrap();

    let loaded = VoiceFont::load(&path).unwrap();
    assert_eq!(
        ids(&loaded),
        vec![
            SectionId::Unit,
            SectionId::Target,
            SectionId::Candidate,
            SectionId::Trie,
            SectionId::Emotion,
            SectionId::Prosody,
        ]
    );
    assert_eq!(loaded.features(), font.features());
    assert_eq!(loaded.header(), font.header());
    assert_sections_contiguous(&loaded);

    for (a, b) in units.iter().zip(loaded.units()) {
        assert_eq!(a.phones, b.phones);
        assert_eq!(a.pitch_target, b.pitch_target);
        assert_eq!(a.candidates, b.candidates);
        assert_eq!(a.emotion, b.emotion);
    }
    // Two (0,0,0,0) votes beat one (1,2,3,4)
    assert_eq!(loaded.units()[0].best_prosody, Some(Default::default()));

    assert_eq!(loaded.lookup(&[1, 2]), Some(&[0, 1][..]));
    assert_eq!(loaded.lookup(&[3]), Some(&[2][..]));
    assert_eq!(loaded.lookup(&[2]), None);
}

#[test]
fn test_rewrite_of_loaded_file_is_identical() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.nus");
    let second = dir.path().join("second.nus");

    let mut font = VoiceFont::build(features(2), sample_units(), &FontConfig::default()).unwrap();
    font.write(&first).unwrap();
    let mut loaded = VoiceFont::load(&first).unwrap();
    loaded.write(&second).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn test_replaced_units_are_reindexed() {
    let mut font = VoiceFont::build(features(2), sample_units(), &FontConfig::default()).unwrap();
    let mut loaded = VoiceFont::from_bytes(&font.to_bytes().unwrap()).unwrap();

    let mut units = loaded.units().to_vec();
    units.swap(0, 2);
    loaded.replace_units(units).unwrap();
    let reloaded = VoiceFont::from_bytes(&loaded.to_bytes().unwrap()).unwrap();

    assert_eq!(reloaded.lookup(&[3]), Some(&[0][..]));
    assert_eq!(reloaded.lookup(&[1, 2]), Some(&[1, 2][..]));
    assert_eq!(reloaded.units()[0].pitch_target, vec![98.0]);
}

#[test]
fn test_replaced_units_keep_their_best_prosody() {
    let a = ProsodyItem::new(1, 0, 2, 0);
    let b = ProsodyItem::new(3, 3, 0, 1);
    let mut units = sample_units();
    units[1].prosody_candidates = vec![a, b, b];

    let mut font = VoiceFont::build(features(2), units, &FontConfig::default()).unwrap();
    let mut loaded = VoiceFont::from_bytes(&font.to_bytes().unwrap()).unwrap();
    assert_eq!(loaded.units()[1].best_prosody, Some(b));
    assert!(loaded.units()[1].prosody_candidates.is_empty());

    let same = loaded.units().to_vec();
    loaded.replace_units(same).unwrap();
    let reloaded = VoiceFont::from_bytes(&loaded.to_bytes().unwrap()).unwrap();

    assert_eq!(reloaded.units()[1].best_prosody, Some(b));
    for (before, after) in loaded.units().iter().zip(reloaded.units()) {
        assert_eq!(before.best_prosody, after.best_prosody);
    }
}

// ============================================================================
// PROMPT
// ============================================================================

#[test]
fn test_float_prompt_is_exact() {
    let cfg = prompt_config(Precision::Float);
    let mut units = sample_units();
    units[0].trajectory = Some(trajectory(5, 2, &cfg));
    units[2].trajectory = Some(trajectory(3, 1, &cfg));

    let font_cfg = FontConfig {
        prompt: Some(cfg),
        ..FontConfig::default()
    };
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prompt.nus");
    VoiceFont::build(features(2), units.clone(), &font_cfg)
        .unwrap()
        .write(&path)
        .unwrap();

    let loaded = VoiceFont::load(&path).unwrap();
    assert_eq!(ids(&loaded).last(), Some(&SectionId::Prompt));
    assert_eq!(loaded.prompt_config(), Some(cfg));
    assert_eq!(loaded.units()[0].trajectory, units[0].trajectory);
    assert_eq!(loaded.units()[1].trajectory, None);
    assert_eq!(loaded.units()[2].trajectory, units[2].trajectory);
}

#[test]
fn test_fixed_prompt_is_close() {
    let cfg = prompt_config(Precision::Fixed);
    let mut units = sample_units();
    let original = trajectory(4, 2, &cfg);
    units[1].trajectory = Some(original.clone());

    let font_cfg = FontConfig {
        prompt: Some(cfg),
        ..FontConfig::default()
    };
    let mut font = VoiceFont::build(features(2), units, &font_cfg).unwrap();
    let loaded = VoiceFont::from_bytes(&font.to_bytes().unwrap()).unwrap();
    let t = loaded.units()[1].trajectory.as_ref().unwrap();

    assert_eq!(t.phone_durations, original.phone_durations);
    let close = |a: &[Vec<f32>], b: &[Vec<f32>], tol: f32| {
        a.iter()
            .flatten()
            .zip(b.iter().flatten())
            .all(|(x, y)| (x - y).abs() <= tol)
    };
    assert!(close(&t.lsp, &original.lsp, 0.5 / 400.0 + 1e-5));
    assert!(close(&t.f0, &original.f0, 0.5 / 64.0));
    assert!(close(&t.gain, &original.gain, 0.5 / 1024.0));
}

#[test]
fn test_fixed_prompt_is_smaller_than_float() {
    let size_with = |precision| {
        let cfg = prompt_config(precision);
        let mut units = sample_units();
        units[0].trajectory = Some(trajectory(40, 4, &cfg));
        let font_cfg = FontConfig {
            prompt: Some(cfg),
            ..FontConfig::default()
        };
        let mut font = VoiceFont::build(features(2), units, &font_cfg).unwrap();
        font.to_bytes().unwrap();
        font.section(SectionId::Prompt).unwrap().size()
    };
    assert!(size_with(Precision::Fixed) < size_with(Precision::Float));
}

// ============================================================================
// TEMPLATE AND LONG-UNIT
// ============================================================================

#[test]
fn test_template_font_round_trip() {
    let cfg = config(FontVariant::Template);
    let mut font = VoiceFont::build(features(1), template_inventory(), &cfg).unwrap();
    assert_eq!(font.units().len(), 2);
    assert_eq!(font.templates().len(), 2);

    let loaded = VoiceFont::from_bytes(&font.to_bytes().unwrap()).unwrap();
    assert!(ids(&loaded).contains(&SectionId::Template));
    assert_eq!(loaded.units().len(), 2);
    assert!(loaded.templates().is_empty());

    let trie = loaded.trie_section().unwrap();
    assert_eq!(trie.mode(), TrieMode::Templates);
    let id = trie.trie().key_id(&[5, 6]).unwrap() as usize;
    let index = loaded.template_index().unwrap();
    assert_eq!(index[id], vec![vec![0, 1], vec![1], vec![0]]);
}

#[test]
fn test_template_reference_out_of_range_is_rejected() {
    let mut inventory = template_inventory();
    inventory[2].template_instances.push(vec![7]);
    let result = VoiceFont::build(features(1), inventory, &config(FontVariant::Template));
    assert!(matches!(result, Err(nusfont::FontError::DataShape(_))));
}

#[test]
fn test_shrinking_a_template_font_arena_is_rejected() {
    let mut font = VoiceFont::build(features(1), template_inventory(), &config(FontVariant::Template)).unwrap();
    let bytes = font.to_bytes().unwrap();
    let mut loaded = VoiceFont::from_bytes(&bytes).unwrap();

    let first = loaded.units()[..1].to_vec();
    let result = loaded.replace_units(first);
    assert!(matches!(result, Err(nusfont::FontError::DataShape(_))));

    // The font is untouched and still writes the same file
    assert_eq!(loaded.units().len(), 2);
    assert_eq!(loaded.to_bytes().unwrap(), bytes);

    // Same-size replacement keeps the loaded template index valid
    let same = loaded.units().to_vec();
    loaded.replace_units(same).unwrap();
    let reloaded = VoiceFont::from_bytes(&loaded.to_bytes().unwrap()).unwrap();
    assert_eq!(reloaded.template_index(), loaded.template_index());
}

#[test]
fn test_long_unit_font_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("long.nus");
    let units = long_units();
    VoiceFont::build(features(1), units.clone(), &config(FontVariant::LongUnit))
        .unwrap()
        .write(&path)
        .unwrap();

    let loaded = VoiceFont::load(&path).unwrap();
    assert_eq!(
        ids(&loaded),
        vec![
            SectionId::Unit,
            SectionId::Target,
            SectionId::Trie,
            SectionId::LongUnit,
            SectionId::Emotion,
        ]
    );
    assert_eq!(loaded.units()[0].sub_ranges, units[0].sub_ranges);
    assert_eq!(loaded.lookup(&[4, 4, 7]), Some(&[0][..]));
}

#[test]
fn test_empty_font_round_trip() {
    let (_, loaded) = super::common::round_trip(Vec::new(), Vec::new(), &FontConfig::default());
    assert!(loaded.units().is_empty());
    assert!(loaded.features().is_empty());
    assert_eq!(loaded.lookup(&[1]), None);
}
