// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the nusfont command-line interface.
//!
//! Three subcommands: `build` to turn JSON unit inventories into voice fonts,
//! `inspect` to examine a font's header and section table, and `trace` to
//! load a unit-selection trace into a lattice and show its routes.

pub mod build;
pub mod display;
pub mod inspect;
pub mod trace;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nusfont", about = "Voice font section builder and inspector", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build one voice font per JSON inventory
    Build {
        /// Inventory files (features, units, optional config)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<String>,

        /// Output directory for .nus files
        #[arg(short, long)]
        output: String,

        /// Font config applied to inputs that don't embed one
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Inspect a voice font's structure
    Inspect {
        /// Path to .nus file
        file: String,
    },

    /// Parse a unit-selection trace and show its routes
    Trace {
        /// Path to trace file
        file: String,

        /// Select this route instead of the traced selection
        #[arg(short, long)]
        route: Option<usize>,

        /// Re-run the Viterbi search instead of trusting the dumped costs
        #[arg(long)]
        search: bool,
    },
}
