//! Command-line argument parsing for kerasport
//!
//! One subcommand per migration lineage, each taking the models directory
//! as its only positional argument.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kerasport - migrate legacy Keras model architecture JSON
#[derive(Parser, Debug)]
#[command(name = "kerasport")]
#[command(version)]
#[command(about = "Migrate legacy Keras 0.x model architecture JSON to the 1.x format", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (per-layer detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress everything except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert flat 0.x architecture files to the wrapped 1.x shape
    Convert {
        /// Directory containing *.model_arch.json files
        #[arg(value_name = "DIR")]
        models_dir: PathBuf,
    },

    /// Re-thread every Dense layer's input_dim from the previous output_dim
    Patch {
        /// Directory containing *.model_arch.json files
        #[arg(value_name = "DIR")]
        models_dir: PathBuf,
    },

    /// Rebuild each model as a typed descriptor and re-serialize natively
    Rebuild {
        /// Directory containing *.model_arch.json and *.model_weights.h5 files
        #[arg(value_name = "DIR")]
        models_dir: PathBuf,
    },

    /// Put backed-up architecture files back to their original bytes
    Restore {
        /// Directory containing *.model_arch.json files
        #[arg(value_name = "DIR")]
        models_dir: PathBuf,
    },
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// The models directory of whichever subcommand was given
    pub fn models_dir(&self) -> &PathBuf {
        match &self.command {
            Commands::Convert { models_dir }
            | Commands::Patch { models_dir }
            | Commands::Rebuild { models_dir }
            | Commands::Restore { models_dir } => models_dir,
        }
    }
}

impl Verbosity {
    /// Check if status and report lines should be printed
    pub fn show_info(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if per-layer detail should be printed
    pub fn show_detail(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}
