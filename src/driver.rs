//! Directory driver
//!
//! Enumerates architecture files in a directory and runs a per-file
//! operation over them. Directory-level problems (missing directory, no
//! matching files) are fatal; per-file failures are reported and counted
//! without aborting the batch.

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::cli::Verbosity;
use crate::errors::{MigrateError, Result};
use crate::schema;

/// Outcome of a batch run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Enumerate `*.model_arch.json` files, sorted by file name
pub fn find_model_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MigrateError::NotADirectory(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.ends_with(schema::MODEL_ARCH_SUFFIX))
        })
        .collect();

    if files.is_empty() {
        return Err(MigrateError::NoModelFiles(dir.to_path_buf()));
    }

    files.sort();
    Ok(files)
}

/// Run `op` over every architecture file in `dir`, independently.
/// The operation returns its report lines; failures are printed against
/// the file they belong to and the batch keeps going.
pub fn run_on_dir<F>(dir: &Path, verbosity: Verbosity, mut op: F) -> Result<RunSummary>
where
    F: FnMut(&Path) -> Result<Vec<String>>,
{
    let files = find_model_files(dir)?;
    let mut summary = RunSummary::default();

    if verbosity.show_info() {
        println!("Found {} model file(s):", files.len());
    }

    for path in &files {
        let label = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        if verbosity.show_info() {
            println!("\n{}", format!("[{label}]").cyan().bold());
        }

        match op(path) {
            Ok(report) => {
                summary.processed += 1;
                if verbosity.show_info() {
                    for line in report {
                        println!("  {line}");
                    }
                }
            }
            Err(e) => {
                summary.failed += 1;
                eprintln!("  {} {label}: {e}", "error:".red().bold());
            }
        }
    }

    if verbosity.show_info() {
        println!(
            "\nDone. {} file(s) processed, {} failed.",
            summary.processed, summary.failed
        );
    }

    Ok(summary)
}
