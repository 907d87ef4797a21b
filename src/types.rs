// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Unit records and the pieces they're made of.
//!
//! A `NonUniformUnit` is one stretch of recorded speech: a phone sequence with
//! per-phone linguistic features, plus whatever the training pipeline attached
//! to it (pitch targets, alternative candidates, emotion, prosody votes,
//! acoustic trajectories, long-unit sub-ranges). No single section owns a
//! whole unit. Each section writes and reloads its own fields, keyed by the
//! unit's position in the arena.

use serde::{Deserialize, Serialize};

/// A named linguistic feature. The font stores one value per feature per phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinguisticFeature {
    pub name: String,
}

impl LinguisticFeature {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Value type tag stored ahead of every feature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum FeatureValueType {
    Integer = 0,
    String = 1,
}

impl FeatureValueType {
    pub fn from_i32(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(Self::Integer),
            1 => Some(Self::String),
            _ => None,
        }
    }
}

/// One linguistic feature value. Only integers can be stored in a font.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i32),
    Str(String),
}

impl FeatureValue {
    pub fn value_type(&self) -> FeatureValueType {
        match self {
            FeatureValue::Int(_) => FeatureValueType::Integer,
            FeatureValue::Str(_) => FeatureValueType::String,
        }
    }
}

/// A phone and its linguistic feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePhone {
    pub phone_id: u16,
    #[serde(default)]
    pub features: Vec<FeatureValue>,
}

impl FeaturePhone {
    pub fn new(phone_id: u16, features: Vec<i32>) -> Self {
        Self {
            phone_id,
            features: features.into_iter().map(FeatureValue::Int).collect(),
        }
    }
}

/// Emotion tag carried by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Emotion {
    #[default]
    Unspecified = 0,
    Neutral = 1,
    Happy = 2,
    Sad = 3,
    Angry = 4,
    Fear = 5,
    Surprise = 6,
    Disgust = 7,
}

impl Emotion {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Self::Unspecified,
            1 => Self::Neutral,
            2 => Self::Happy,
            3 => Self::Sad,
            4 => Self::Angry,
            5 => Self::Fear,
            6 => Self::Surprise,
            7 => Self::Disgust,
            _ => return None,
        })
    }
}

/// Boundary and ToBI labels at a unit's edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProsodyItem {
    pub head_break: u8,
    pub tail_break: u8,
    pub head_tobi: u8,
    pub tail_tobi: u8,
}

impl ProsodyItem {
    pub fn new(head_break: u8, tail_break: u8, head_tobi: u8, tail_tobi: u8) -> Self {
        Self {
            head_break,
            tail_break,
            head_tobi,
            tail_tobi,
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.head_break, self.tail_break, self.head_tobi, self.tail_tobi]
    }

    pub fn from_bytes(b: [u8; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

/// Frame-rate acoustic streams for prompt playback.
///
/// Each stream is `frames × order`. The per-phone durations are in frames and
/// must sum to the frame count of every stream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    pub lsp: Vec<Vec<f32>>,
    pub f0: Vec<Vec<f32>>,
    pub gain: Vec<Vec<f32>>,
    pub phone_durations: Vec<u32>,
}

impl Trajectory {
    /// Sum of per-phone durations, i.e. the frame count every stream must have.
    pub fn duration_frames(&self) -> u64 {
        self.phone_durations.iter().map(|&d| u64::from(d)).sum()
    }
}

/// A `(start, length)` sub-segment of a long recorded unit, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRange {
    pub start: i32,
    pub length: i32,
}

/// One acoustic/linguistic unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NonUniformUnit {
    pub phones: Vec<FeaturePhone>,
    /// Pitch target curve; empty when the unit has none.
    pub pitch_target: Vec<f32>,
    /// Alternative candidate unit indices. Every row has the same width.
    pub candidates: Option<Vec<Vec<i32>>>,
    pub emotion: Emotion,
    pub prosody_candidates: Vec<ProsodyItem>,
    /// Majority-vote result over `prosody_candidates`, filled when loaded.
    ///
    /// Writing votes over the candidates and falls back to this item when
    /// there are none, so a loaded unit keeps its item through a rewrite. A
    /// unit with neither is written as the default item and loads back as
    /// `Some(ProsodyItem::default())`, not `None`. Stays `None` when the font
    /// has prosody disabled.
    pub best_prosody: Option<ProsodyItem>,
    pub trajectory: Option<Trajectory>,
    pub sub_ranges: Vec<SubRange>,
    /// Template units only: each instance is a sequence of normal-unit references.
    pub template_instances: Vec<Vec<i32>>,
    pub is_template: bool,
}

impl NonUniformUnit {
    /// A unit with the given phones, each with an empty feature vector.
    pub fn with_phones(phone_ids: &[u16]) -> Self {
        Self {
            phones: phone_ids
                .iter()
                .map(|&id| FeaturePhone::new(id, Vec::new()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn phone_ids(&self) -> Vec<u16> {
        self.phones.iter().map(|p| p.phone_id).collect()
    }
}
