//! CLI commands and argument parsing

use crate::types::StateFilter;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gitea REST client CLI
#[derive(Parser, Debug)]
#[command(name = "gitea-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server URL (e.g. https://gitea.example.com)
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Servers file (YAML)
    #[arg(long, global = true)]
    pub servers: Option<PathBuf>,

    /// Pick the server with this credentials id from the servers file
    #[arg(long, global = true)]
    pub server_id: Option<String>,

    /// Access token
    #[arg(short, long, global = true)]
    pub token: Option<String>,

    /// Username for HTTP Basic auth
    #[arg(short, long, global = true, requires = "password")]
    pub username: Option<String>,

    /// Password for HTTP Basic auth
    #[arg(short, long, global = true, requires = "username")]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    pub timeout: u64,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the server version
    Version,

    /// Show the authenticated user
    Whoami,

    /// List repositories of a user or organization
    Repos {
        /// Owner name
        owner: String,
    },

    /// List branches of a repository
    Branches {
        /// Owner name
        owner: String,
        /// Repository name
        repo: String,
    },

    /// List tags of a repository
    Tags {
        /// Owner name
        owner: String,
        /// Repository name
        repo: String,
    },

    /// List pull requests of a repository
    Pulls {
        /// Owner name
        owner: String,
        /// Repository name
        repo: String,
        /// State filter
        #[arg(long, default_value = "open")]
        state: StateFilter,
    },

    /// List issues of a repository
    Issues {
        /// Owner name
        owner: String,
        /// Repository name
        repo: String,
        /// State filter
        #[arg(long, default_value = "open")]
        state: StateFilter,
    },

    /// List webhooks of a repository, or of an organization when no repo is given
    Hooks {
        /// Owner name
        owner: String,
        /// Repository name
        repo: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}
