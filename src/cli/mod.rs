//! Command-line interface for triplectl
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Merging flags with environment and config-file settings
//! - Subcommand definitions
//!
//! Connection flags are global so they can follow any subcommand, and
//! fall back to the loaded configuration when unset.

pub mod completion;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::{Config, LogLevel};
use crate::error::{ConfigError, Result};

/// A command-line client for RDFox-style triple-store servers
#[derive(Parser, Debug)]
#[command(
    name = "triplectl",
    version,
    about = "Triple-store server CLI",
    long_about = "A command-line client for RDFox-style triple-store servers:\n\
bulk data export, role and privilege management, statistics, and maintenance."
)]
pub struct Cli {
    /// Server host, e.g. rdf.example.com:12110
    #[arg(long, global = true, value_name = "HOST")]
    pub server: Option<String>,

    /// Transport scheme (http or https)
    #[arg(long, global = true, value_name = "SCHEME")]
    pub scheme: Option<String>,

    /// Role used to authenticate against the server
    #[arg(long, global = true, value_name = "ROLE")]
    pub role: Option<String>,

    /// Password for the role
    #[arg(long, global = true, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long = "log-level", global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for triplectl
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export data from a datastore to a file
    Export(ExportArgs),

    /// Get stats for a server or datastore
    Stats {
        /// The datastore that you want stats for; leave unset for server stats
        #[arg(long, value_name = "NAME")]
        datastore: Option<String>,

        /// The format of the results (console, json)
        #[arg(long, default_value = "console")]
        format: String,
    },

    /// Compact a datastore
    Compact {
        /// The datastore to compact
        #[arg(long, value_name = "NAME")]
        datastore: String,
    },

    /// Import axioms from one graph into another
    ImportAxioms {
        /// The datastore holding both graphs
        #[arg(long, value_name = "NAME")]
        datastore: String,

        /// The graph to read axioms from
        #[arg(long, value_name = "IRI")]
        source_graph: String,

        /// The graph to add axioms to
        #[arg(long, value_name = "IRI")]
        destination_graph: String,
    },

    /// Manage roles and privileges
    Roles {
        #[command(subcommand)]
        command: RolesCommand,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish, ...)
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },

    /// Show version information
    Version,
}

/// Arguments for the export subcommand
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// The datastore that contains the data you want to export
    #[arg(long, value_name = "NAME", default_value = "")]
    pub datastore: String,

    /// The graph that contains the data you want to export
    #[arg(long, value_name = "IRI", default_value = "")]
    pub graph: String,

    /// The file that the exported data will be written to
    #[arg(long, value_name = "PATH", default_value = "export.ttl")]
    pub file: PathBuf,

    /// The maximum number of triples to return in a single cursor request
    #[arg(long, value_name = "N", default_value_t = 5000)]
    pub limit: i64,

    /// The types of facts to export ('all', 'explicit' or 'implicit')
    #[arg(long, value_name = "KIND", default_value = "all")]
    pub facts: String,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

/// Role management subcommands
#[derive(Subcommand, Debug)]
pub enum RolesCommand {
    /// List all roles
    List,

    /// Create a new role
    Create {
        /// The name of the new role
        #[arg(long, value_name = "NAME", default_value = "")]
        name: String,

        /// The password of the new role
        #[arg(long, value_name = "PASSWORD", default_value = "")]
        new_password: String,
    },

    /// Delete a role
    Delete {
        /// The role to delete
        #[arg(long, value_name = "NAME")]
        name: String,
    },

    /// Grant datastore privileges to a role
    Grant {
        /// The role receiving the privileges
        #[arg(long, value_name = "NAME")]
        name: String,

        /// Comma-separated access types, e.g. read,write
        #[arg(long, value_name = "TYPES")]
        access_types: String,
    },

    /// Revoke datastore privileges from a role
    Revoke {
        /// The role losing the privileges
        #[arg(long, value_name = "NAME")]
        name: String,

        /// Comma-separated access types, e.g. read,write
        #[arg(long, value_name = "TYPES")]
        access_types: String,
    },

    /// Show the privileges held by a role
    Info {
        /// The role to inspect
        #[arg(long, value_name = "NAME")]
        name: String,
    },
}

/// Configuration file subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Initialise the config file
    Init {
        /// The server host to store
        #[arg(long, value_name = "HOST", default_value = "")]
        server: String,

        /// The transport scheme to store
        #[arg(long, value_name = "SCHEME", default_value = "https")]
        scheme: String,

        /// The role to store
        #[arg(long, value_name = "ROLE", default_value = "")]
        role: String,

        /// The password to store
        #[arg(long, value_name = "PASSWORD", default_value = "")]
        password: String,

        /// The log level to use as default
        #[arg(long = "default-log-level", value_name = "LEVEL", default_value = "info")]
        log_level: String,

        /// The config file path
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(long)]
        overwrite: bool,
    },

    /// Print the active configuration
    Print,
}

/// Connection settings resolved from flags, environment, and config file
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub scheme: String,
    pub role: String,
    pub password: String,
    pub timeout: u64,
}

impl Cli {
    /// Resolve connection settings, flags taking precedence over the
    /// loaded configuration. The server host is required.
    pub fn server_settings(&self, config: &Config) -> Result<ServerSettings> {
        let host = self
            .server
            .clone()
            .unwrap_or_else(|| config.server.host.clone());

        if host.is_empty() {
            return Err(ConfigError::MissingField("server".to_string()).into());
        }

        Ok(ServerSettings {
            host,
            scheme: self
                .scheme
                .clone()
                .unwrap_or_else(|| config.server.scheme.clone()),
            role: self
                .role
                .clone()
                .unwrap_or_else(|| config.server.role.clone()),
            password: self
                .password
                .clone()
                .unwrap_or_else(|| config.server.password.clone()),
            timeout: config.server.timeout,
        })
    }

    /// Effective log level: the flag wins over the config file
    pub fn log_level(&self, config: &Config) -> Result<LogLevel> {
        match &self.log_level {
            Some(level) => Ok(level.parse()?),
            None => Ok(config.logging.level),
        }
    }
}
