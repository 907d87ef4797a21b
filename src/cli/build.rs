// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `nusfont build`: JSON inventories in, voice fonts out.
//!
//! Inputs are independent, so with the `parallel` feature they are built
//! across the rayon pool behind an indicatif progress bar.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use nusfont::{FontConfig, FontInput, VoiceFont};

/// What one input produced.
struct Built {
    path: PathBuf,
    units: usize,
    bytes: usize,
}

#[cfg(feature = "parallel")]
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:<10} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╸")
}

fn read_config(path: &str) -> Result<FontConfig, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Failed to read config {}: {}", path, e))?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid config JSON in {}: {}", path, e))
}

fn build_one(input: &str, output_dir: &Path, fallback: &FontConfig) -> Result<Built, String> {
    let text = fs::read_to_string(input).map_err(|e| format!("Failed to read {}: {}", input, e))?;
    let parsed: FontInput =
        serde_json::from_str(&text).map_err(|e| format!("Invalid inventory JSON in {}: {}", input, e))?;
    let config = parsed.config.unwrap_or_else(|| fallback.clone());
    let units = parsed.units.len();

    let mut font = VoiceFont::build(parsed.features, parsed.units, &config)
        .map_err(|e| format!("{}: {}", input, e))?;

    let stem = Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "font".to_string());
    let path = output_dir.join(format!("{}.nus", stem));
    let bytes = font.to_bytes().map_err(|e| format!("{}: {}", input, e))?;
    fs::write(&path, &bytes).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

    log::info!("{} -> {} ({} units)", input, path.display(), units);
    Ok(Built {
        path,
        units,
        bytes: bytes.len(),
    })
}

pub fn run_build(inputs: &[String], output_dir: &str, config: Option<&str>) -> Result<(), String> {
    let output_path = Path::new(output_dir);
    fs::create_dir_all(output_path).map_err(|e| format!("Failed to create output dir: {}", e))?;
    let fallback = match config {
        Some(path) => read_config(path)?,
        None => FontConfig::default(),
    };

    #[cfg(feature = "parallel")]
    let results: Vec<Result<Built, String>> = {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(create_progress_style());
        pb.set_prefix("Building");
        pb.set_message("fonts...");
        let results = inputs
            .par_iter()
            .map(|input| {
                let r = build_one(input, output_path, &fallback);
                pb.inc(1);
                r
            })
            .collect();
        pb.finish_with_message(format!("built {} fonts", inputs.len()));
        results
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<Built, String>> = inputs
        .iter()
        .map(|input| build_one(input, output_path, &fallback))
        .collect();

    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(built) => println!(
                "✓ {} ({} units, {})",
                built.path.display(),
                built.units,
                super::display::format_size(built.bytes)
            ),
            Err(e) => failures.push(e),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("\n"))
    }
}
