//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Project management commands.
#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Create a project
    Create {
        /// Project name (also its file name)
        name: String,

        /// Seconds between samples (5-20)
        #[arg(short, long)]
        interval: u32,

        /// Taxonomy class as "Name=attr1,attr2" (repeatable)
        #[arg(long = "class", value_name = "NAME=ATTRS")]
        classes: Vec<String>,

        /// Overwrite a project with the same name
        #[arg(short, long)]
        force: bool,
    },

    /// List projects
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a project's settings and taxonomy
    Show {
        /// Project name
        name: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change a project's sampling interval
    Edit {
        /// Project name
        name: String,

        /// New seconds between samples (5-20)
        #[arg(short, long)]
        interval: u32,
    },
}

/// Taxonomy editing commands. Each loads the project, applies the edit, and
/// saves it again.
#[derive(Debug, Subcommand)]
pub enum TaxonomyCommand {
    /// Append a class
    Add {
        /// Project name
        project: String,

        /// Class name
        class: String,

        /// Comma-separated attributes
        attributes: String,
    },

    /// Replace the class at an index
    Edit {
        /// Project name
        project: String,

        /// Zero-based position of the class
        index: usize,

        /// New class name
        class: String,

        /// New comma-separated attributes
        attributes: String,
    },

    /// Remove the class at an index
    Remove {
        /// Project name
        project: String,

        /// Zero-based position of the class
        index: usize,
    },
}

/// Route logging arguments.
#[derive(Debug, Args)]
pub struct LogCommand {
    /// Project to log
    pub project: String,

    /// Stop automatically after this many ticks
    #[arg(short, long)]
    pub ticks: Option<u64>,
}

/// Route log viewing commands.
#[derive(Debug, Subcommand)]
pub enum RoutesCommand {
    /// List a project's sessions, most recent first
    List {
        /// Project name
        project: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print a session's records
    Show {
        /// Session file name (as printed by `routes list`)
        file: String,

        /// Number of records to show [default: viewer.max_lines]
        #[arg(short = 'n', long)]
        max_lines: Option<usize>,
    },
}

/// Configuration management commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to config file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
