//! CLI module for the key-value playground
//!
//! Provides subcommands:
//! - `serve`: HTTP API server (default)
//! - `exercise`: random CRUD traffic against a running server

pub mod exercise;
pub mod serve;

use clap::{Parser, Subcommand};

/// Key-value playground - CRUD over a cache store and a persistent store
#[derive(Parser)]
#[command(name = "kv-playground")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server (default)
    Serve,

    /// Send random create/read/modify/delete requests to a running server
    Exercise(exercise::ExerciseArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["kv-playground"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_exercise_args() {
        let cli = Cli::try_parse_from([
            "kv-playground",
            "exercise",
            "--base-url",
            "http://10.0.0.5:8081/api",
            "--max-keys",
            "3",
            "--iterations",
            "20",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Exercise(args)) => {
                assert_eq!(args.base_url, "http://10.0.0.5:8081/api");
                assert_eq!(args.max_keys, 3);
                assert_eq!(args.iterations, Some(20));
                assert_eq!(args.min_delay_secs, 1);
                assert_eq!(args.max_delay_secs, 5);
            }
            _ => panic!("expected exercise command"),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
