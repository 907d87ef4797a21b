// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Build configuration for voice fonts.
//!
//! Read from JSON alongside the unit inventory:
//!
//! ```json
//! {
//!   "variant": "standard",
//!   "prosody": true,
//!   "prompt": { "precision": "fixed", "lsp_order": 16, "f0_order": 1, "gain_order": 1 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{FontError, Result};
use crate::types::{LinguisticFeature, NonUniformUnit};

/// Which section roster a font is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontVariant {
    /// Unit, target, candidate, trie, emotion, prosody (+ prompt)
    #[default]
    Standard,
    /// Normal units plus template units indexed by a template section
    Template,
    /// Long recorded units with sub-range boundaries, no candidates or prosody
    LongUnit,
}

/// Storage precision of prompt trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Precision {
    #[default]
    Float = 0,
    Fixed = 1,
}

impl Precision {
    pub fn from_i32(flag: i32) -> Result<Self> {
        match flag {
            0 => Ok(Self::Float),
            1 => Ok(Self::Fixed),
            other => Err(FontError::unsupported(format!(
                "prompt precision flag {}",
                other
            ))),
        }
    }
}

/// Prompt trajectory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub precision: Precision,
    pub lsp_order: u32,
    pub f0_order: u32,
    pub gain_order: u32,
}

/// Everything that decides a font's section roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default)]
    pub variant: FontVariant,
    #[serde(default = "default_prosody")]
    pub prosody: bool,
    #[serde(default)]
    pub prompt: Option<PromptConfig>,
}

fn default_prosody() -> bool {
    true
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            variant: FontVariant::Standard,
            prosody: true,
            prompt: None,
        }
    }
}

/// Build input: features, units, and an optional embedded config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontInput {
    pub features: Vec<LinguisticFeature>,
    pub units: Vec<NonUniformUnit>,
    #[serde(default)]
    pub config: Option<FontConfig>,
}
