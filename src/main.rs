// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;

mod cli;
use cli::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build {
            input,
            output,
            config,
        } => cli::build::run_build(&input, &output, config.as_deref()),
        Commands::Inspect { file } => cli::inspect::inspect_font(&file),
        Commands::Trace { file, route, search } => cli::trace::run_trace(&file, route, search),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
