//! Whole-font properties over random inventories.

use nusfont::binary::FontHeader;
use nusfont::{Emotion, FontConfig, NonUniformUnit, ProsodyItem, VoiceFont};
use proptest::prelude::*;

use crate::common::{assert_sections_contiguous, features, unit};

// ============================================================================
// STRATEGIES
// ============================================================================

const FEATURES: usize = 2;

fn prosody_strategy() -> impl Strategy<Value = ProsodyItem> {
    (0u8..3, 0u8..3, 0u8..2, 0u8..2).prop_map(|(a, b, c, d)| ProsodyItem::new(a, b, c, d))
}

fn unit_strategy() -> impl Strategy<Value = NonUniformUnit> {
    (
        prop::collection::vec(1u16..8, 1..4),
        prop::collection::vec(50.0f32..400.0, 0..6),
        (0usize..3, 0usize..3),
        0i32..8,
        prop::collection::vec(prosody_strategy(), 0..5),
    )
        .prop_map(|(phones, pitch, (rows, width), emotion, prosody)| {
            let mut u = unit(&phones, FEATURES);
            u.pitch_target = pitch;
            if rows > 0 {
                u.candidates = Some(vec![(0..width as i32).collect(); rows]);
            }
            u.emotion = Emotion::from_i32(emotion).unwrap_or_default();
            u.prosody_candidates = prosody;
            u
        })
}

fn inventory_strategy() -> impl Strategy<Value = Vec<NonUniformUnit>> {
    prop::collection::vec(unit_strategy(), 0..12)
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Loading and rewriting reproduces the file byte for byte.
    #[test]
    fn prop_rewrite_is_byte_identical(units in inventory_strategy()) {
        let mut font = VoiceFont::build(features(FEATURES), units, &FontConfig::default()).unwrap();
        let bytes = font.to_bytes().unwrap();
        let mut loaded = VoiceFont::from_bytes(&bytes).unwrap();
        prop_assert_eq!(loaded.to_bytes().unwrap(), bytes);
    }

    /// Sections tile the file between the table and the string pool.
    #[test]
    fn prop_sections_are_contiguous(units in inventory_strategy()) {
        let mut font = VoiceFont::build(features(FEATURES), units, &FontConfig::default()).unwrap();
        font.to_bytes().unwrap();
        assert_sections_contiguous(&font);
    }

    /// Every unit is found under its own phone sequence after a round trip.
    #[test]
    fn prop_lookup_finds_every_unit(units in inventory_strategy()) {
        let mut font = VoiceFont::build(features(FEATURES), units.clone(), &FontConfig::default()).unwrap();
        let loaded = VoiceFont::from_bytes(&font.to_bytes().unwrap()).unwrap();
        for (i, u) in units.iter().enumerate() {
            let group = loaded.lookup(&u.phone_ids());
            prop_assert!(group.is_some_and(|g| g.contains(&(i as i32))));
        }
    }

    /// Per-unit fields the standard roster stores come back unchanged.
    #[test]
    fn prop_unit_fields_survive(units in inventory_strategy()) {
        let mut font = VoiceFont::build(features(FEATURES), units.clone(), &FontConfig::default()).unwrap();
        let loaded = VoiceFont::from_bytes(&font.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(loaded.units().len(), units.len());
        for (a, b) in units.iter().zip(loaded.units()) {
            prop_assert_eq!(&a.phones, &b.phones);
            prop_assert_eq!(&a.pitch_target, &b.pitch_target);
            prop_assert_eq!(a.emotion, b.emotion);
            let expected = a.candidates.clone().filter(|rows| rows.iter().all(|r| !r.is_empty()));
            prop_assert_eq!(&expected, &b.candidates);
        }
    }

    /// Any single corrupted byte after the header is caught.
    #[test]
    fn prop_payload_corruption_is_detected(
        units in inventory_strategy(),
        position in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let mut font = VoiceFont::build(features(FEATURES), units, &FontConfig::default()).unwrap();
        let mut bytes = font.to_bytes().unwrap();
        let i = FontHeader::SIZE + position.index(bytes.len() - FontHeader::SIZE);
        bytes[i] ^= flip;
        prop_assert!(VoiceFont::from_bytes(&bytes).is_err());
    }

    /// Arbitrary input never panics the loader.
    #[test]
    fn prop_loader_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = VoiceFont::from_bytes(&bytes);
    }
}
