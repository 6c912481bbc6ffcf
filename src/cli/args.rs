//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! - `--debug`: Debug logging for this crate on stderr
//! - `--quiet` / `-q`: Minimal, machine-friendly output
//! - `--config <path>`: Use this config file instead of the standard locations

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// leetpush - push solved problems to your GitHub repository
#[derive(Parser, Debug)]
#[command(name = "leetpush")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to use instead of the standard locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the stored GitHub token
    #[command(subcommand)]
    Auth(AuthAction),

    /// Push a solution file to GitHub
    #[command(
        long_about = "Push a solution file to GitHub.\n\n\
            The file is committed to OWNER/NAME if --repo is given, otherwise to \
            <your login>/leetcode_repo, which is created on first use. Pushing a file \
            whose content already matches the repository (ignoring surrounding \
            whitespace) makes no commit.",
        after_help = "\
EXAMPLES:
    leetpush push 0001_two_sum.py
    leetpush push solutions/two_sum.py --path 0001_two_sum.py
    leetpush push 0001_two_sum.py --repo alice/solutions"
    )]
    Push {
        /// Local file to push
        file: PathBuf,

        /// Target repository as OWNER/NAME
        #[arg(long, value_name = "OWNER/NAME")]
        repo: Option<String>,

        /// Path in the repository (defaults to the file name)
        #[arg(long, value_name = "PATH")]
        path: Option<String>,
    },

    /// List recorded pushes
    Log {
        /// Only show pushes by this login
        #[arg(long, value_name = "LOGIN")]
        user: Option<String>,
    },
}

/// Token management actions.
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Verify a token with GitHub and store it
    Login {
        /// Read the token from stdin instead of prompting
        #[arg(long)]
        token_stdin: bool,
    },

    /// Show who the current token authenticates as
    Status,

    /// Remove the stored token
    Logout,
}
