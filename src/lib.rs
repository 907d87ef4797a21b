// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary voice font sections and the unit-selection cost lattice.
//!
//! A voice font is a single file holding a unit inventory for concatenative
//! synthesis: phone sequences with linguistic features, pitch targets,
//! candidate lists, a phone-sequence trie, emotion and prosody labels, and
//! optional prompt trajectories. This crate builds those files, reads them
//! back, and models the Viterbi lattice a unit-selection search walks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  types.rs   │────▶│  section/    │────▶│   font.rs   │
//! │ (units,     │     │ (one module  │     │ (container, │
//! │  phones)    │     │  per kind)   │     │  roster)    │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!        │                   │                    │
//!        ▼                   ▼                    ▼
//! ┌─────────────────────────────────────────────────────┐
//! │  binary/ (codec, indexed tables, header, pool)      │
//! │  trie/   (phone trie, unit grouping)                │
//! └─────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────┐
//! │  lattice/ (cost nodes, clusters, routes, trace)     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use nusfont::{FontConfig, LinguisticFeature, NonUniformUnit, VoiceFont};
//!
//! let units = vec![NonUniformUnit::with_phones(&[12, 7])];
//! let mut font = VoiceFont::build(Vec::new(), units, &FontConfig::default())?;
//! font.write("voice.nus")?;
//!
//! let loaded = VoiceFont::load("voice.nus")?;
//! assert_eq!(loaded.lookup(&[12, 7]), Some(&[0][..]));
//! # let _ = LinguisticFeature::new("pos");
//! # Ok::<(), nusfont::FontError>(())
//! ```

pub mod binary;
pub mod config;
pub mod error;
pub mod font;
pub mod lattice;
pub mod section;
pub mod trie;
pub mod types;

pub use config::{FontConfig, FontInput, FontVariant, Precision, PromptConfig};
pub use error::{FontError, Result};
pub use font::VoiceFont;
pub use lattice::{CostNode, CostNodeCluster, LatticeError, NodeRoute, TraceError, ViterbiLattice};
pub use section::{SectionBody, SectionId};
pub use trie::{PhoneKey, PhoneTrie};
pub use types::{
    Emotion, FeaturePhone, FeatureValue, LinguisticFeature, NonUniformUnit, ProsodyItem, SubRange,
    Trajectory,
};
