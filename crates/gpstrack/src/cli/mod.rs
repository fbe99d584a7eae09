//! Command-line interface for gpstrack.
//!
//! This module provides the CLI structure for the `gpstrack` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, LogCommand, ProjectCommand, RoutesCommand, TaxonomyCommand};

/// gpstrack - Log GPS routes tagged with your own taxonomy
///
/// Create projects with a sampling interval and classes of contextual tags,
/// record location samples at that interval, and review the logs later.
#[derive(Debug, Parser)]
#[command(name = "gpstrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create, list, show and edit projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Edit a project's taxonomy
    #[command(subcommand)]
    Taxonomy(TaxonomyCommand),

    /// Record a route interactively
    Log(LogCommand),

    /// Browse recorded routes
    #[command(subcommand)]
    Routes(RoutesCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

/// Split a `Name=attr1,attr2` argument into name and attribute list.
///
/// Returns `None` if there is no `=`.
#[must_use]
pub fn split_class_arg(arg: &str) -> Option<(&str, &str)> {
    arg.split_once('=')
}

/// Parse a metadata line such as `Weather=Sunny; Traffic=Heavy` into
/// `(class, attribute)` pairs.
///
/// # Errors
///
/// Returns a message naming the first malformed assignment.
pub fn parse_meta_assignments(line: &str) -> Result<Vec<(&str, &str)>, String> {
    line.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.split_once('=')
                .map(|(class, attr)| (class.trim(), attr.trim()))
                .filter(|(class, attr)| !class.is_empty() && !attr.is_empty())
                .ok_or_else(|| format!("expected Class=Attribute, got '{part}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Config(ConfigCommand::Path),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "gpstrack");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        use crate::logging::Verbosity;
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_project_create() {
        let cli = Cli::try_parse_from([
            "gpstrack",
            "project",
            "create",
            "Survey1",
            "--interval",
            "10",
            "--class",
            "Weather=Sunny,Cloudy",
            "--class",
            "Traffic=Heavy",
        ])
        .unwrap();
        match cli.command {
            Command::Project(ProjectCommand::Create {
                name,
                interval,
                classes,
                force,
            }) => {
                assert_eq!(name, "Survey1");
                assert_eq!(interval, 10);
                assert_eq!(classes, vec!["Weather=Sunny,Cloudy", "Traffic=Heavy"]);
                assert!(!force);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_log_with_ticks() {
        let cli = Cli::try_parse_from(["gpstrack", "log", "Survey1", "--ticks", "2"]).unwrap();
        match cli.command {
            Command::Log(cmd) => {
                assert_eq!(cmd.project, "Survey1");
                assert_eq!(cmd.ticks, Some(2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_routes_show() {
        let cli = Cli::try_parse_from([
            "gpstrack",
            "routes",
            "show",
            "route_Survey1_1.jsonl",
            "-n",
            "5",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Routes(RoutesCommand::Show {
                max_lines: Some(5),
                ..
            })
        ));
    }

    #[test]
    fn test_parse_taxonomy_remove() {
        let cli = Cli::try_parse_from(["gpstrack", "taxonomy", "remove", "Survey1", "0"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Taxonomy(TaxonomyCommand::Remove { index: 0, .. })
        ));
    }

    #[test]
    fn test_parse_with_global_flags() {
        let cli = Cli::try_parse_from(["gpstrack", "-c", "/custom/config.toml", "-v", "config", "path"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_split_class_arg() {
        assert_eq!(
            split_class_arg("Weather=Sunny,Cloudy"),
            Some(("Weather", "Sunny,Cloudy"))
        );
        assert_eq!(split_class_arg("Weather"), None);
    }

    #[test]
    fn test_parse_meta_assignments() {
        assert_eq!(
            parse_meta_assignments("Weather=Sunny; Traffic = Heavy ;").unwrap(),
            vec![("Weather", "Sunny"), ("Traffic", "Heavy")]
        );
        assert!(parse_meta_assignments("").unwrap().is_empty());
        assert!(parse_meta_assignments("Weather").is_err());
        assert!(parse_meta_assignments("Weather=").is_err());
    }
}
