//! Command-line interface for sortaway.
//!
//! This module owns the argument surface and the orchestration glue: build a
//! [`ScanConfig`] from the arguments, run the scan on a background worker
//! while draining its events to the console, then either stop after a
//! dry-run summary or hand the result to a transfer worker.

use crate::classify::Category;
use crate::config::{RulesConfig, ScanConfig, parse_custom_extensions};
use crate::events::{CancelToken, EventSink};
use crate::output::{ConsoleSink, summary_table};
use crate::transfer::TransferMode;
use crate::worker::{spawn_scan, spawn_transfer};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sortaway", version)]
#[command(about = "Scan a directory tree for common user files and relocate them into a categorized, timestamped batch folder")]
pub struct Cli {
    /// Directory tree to scan.
    pub source: PathBuf,

    /// Destination root for the batch directory. Required unless --scan-only.
    pub destination: Option<PathBuf>,

    /// Move files instead of copying them.
    #[arg(long = "move")]
    pub move_files: bool,

    /// Scan and report only; transfer nothing.
    #[arg(long)]
    pub scan_only: bool,

    /// Put everything directly into the batch directory instead of
    /// per-category subfolders.
    #[arg(long)]
    pub flat: bool,

    /// Categories to match (comma-separated, e.g. "images,archives").
    /// Defaults to all of them.
    #[arg(long, value_delimiter = ',')]
    pub types: Option<Vec<String>>,

    /// Ad-hoc extensions to match as their own category
    /// (comma-separated, e.g. ".xyz,.abc").
    #[arg(long)]
    pub ext: Option<String>,

    /// Path to a TOML exclusion-rules file.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Do not narrow messaging-app export trees to their msg subdirectory.
    #[arg(long)]
    pub no_messaging_redirect: bool,
}

/// Runs the CLI end to end. Errors are returned as display-ready strings.
pub fn run(cli: Cli) -> Result<(), String> {
    let config = build_config(&cli)?;

    if !cli.scan_only && config.destination.is_none() {
        return Err("A destination is required unless --scan-only is given".to_string());
    }

    let sink = ConsoleSink::new();
    let token = CancelToken::new();

    let scan_job = spawn_scan(config.clone(), token.clone()).map_err(|e| e.to_string())?;
    for event in scan_job.events.iter() {
        event.dispatch(&sink);
    }
    let scan = scan_job
        .join()
        .map_err(|_| "Scan worker panicked".to_string())?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in &scan.records {
        *counts
            .entry(record.category.display_name().to_string())
            .or_insert(0) += 1;
    }
    summary_table(&counts, scan.len());

    if cli.scan_only {
        sink.status("Dry run, nothing was transferred");
        return Ok(());
    }

    if scan.is_empty() {
        return Err("Nothing to transfer: the scan matched no files".to_string());
    }

    let destination = config
        .destination
        .clone()
        .ok_or_else(|| "A destination is required".to_string())?;
    let mode = if cli.move_files {
        TransferMode::Move
    } else {
        TransferMode::Copy
    };

    let transfer_job = spawn_transfer(
        scan,
        destination,
        mode,
        config.organize_by_type,
        token.clone(),
    );
    for event in transfer_job.events.iter() {
        event.dispatch(&sink);
    }
    let outcome = transfer_job
        .join()
        .map_err(|_| "Transfer worker panicked".to_string())?
        .map_err(|e| e.to_string())?;

    if outcome.failed > 0 {
        sink.log(&format!(
            "{} files failed; see the log lines above for causes",
            outcome.failed
        ));
    }

    Ok(())
}

/// Assembles a [`ScanConfig`] from parsed arguments.
fn build_config(cli: &Cli) -> Result<ScanConfig, String> {
    let rules = RulesConfig::load(cli.rules.as_deref())
        .and_then(RulesConfig::compile)
        .map_err(|e| e.to_string())?;

    let mut config = ScanConfig::new(&cli.source);
    config.destination = cli.destination.clone();
    config.organize_by_type = !cli.flat;
    config.messaging_redirect = !cli.no_messaging_redirect;
    config.rules = rules;

    if let Some(names) = &cli.types {
        config.enabled = names
            .iter()
            .map(|name| {
                Category::parse(name).ok_or_else(|| format!("Unknown category: {}", name))
            })
            .collect::<Result<_, _>>()?;
    }

    if let Some(ext) = &cli.ext {
        config.custom_extensions = parse_custom_extensions(ext);
    }

    Ok(config)
}
