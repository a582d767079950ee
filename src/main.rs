//! kerasport - Main CLI entry point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use kerasport::{
    backup,
    cli::{Args, Commands},
    driver,
    migrate::{convert_file, patch_file},
    rebuild::rebuild_file,
};

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{} {e}", "[ERROR]".red().bold());
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let verbosity = args.verbosity();

    // Per-file failures are reported inside the driver and do not affect
    // the exit code; only directory-level errors propagate out of here.
    match &args.command {
        Commands::Convert { models_dir } => {
            driver::run_on_dir(models_dir, verbosity, convert_file)?;
            if verbosity.show_info() {
                println!("Originals in *.{}", backup::KERAS0X_SUFFIX);
            }
        }
        Commands::Patch { models_dir } => {
            driver::run_on_dir(models_dir, verbosity, patch_file)?;
            if verbosity.show_info() {
                println!("Originals in *.{}", backup::ORIG_SUFFIX);
            }
        }
        Commands::Rebuild { models_dir } => {
            let detail = verbosity.show_detail();
            driver::run_on_dir(models_dir, verbosity, |path| rebuild_file(path, detail))?;
        }
        Commands::Restore { models_dir } => {
            driver::run_on_dir(models_dir, verbosity, backup::restore_file)?;
        }
    }

    Ok(())
}
