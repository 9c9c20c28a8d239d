//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum, and
//! the [`RunArgs`] struct. Every flag has an environment variable
//! equivalent for container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "portward",
    version,
    about = "Local reverse proxies for Cloudflare Access applications",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        portward run -e app.example.com            Proxy one application\n  \
        portward run -e 9000:app.example.com:8443  Custom local and destination ports\n  \
        portward run -c proxies.yaml               Use a config file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start reverse proxies to Cloudflare Access applications
    Run(RunArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        portward run -e app.example.com                        Defaults (local 8888, dest 443)\n  \
        portward run -e app1.example.com -e 8082:app2.example.com   Two proxies\n  \
        portward run -e app.internal -s                        Skip TLS verification\n  \
        portward run -c proxies.yaml --pretty                  Config file, local dev logs")]
pub struct RunArgs {
    /// Endpoint to proxy in format [LOCAL_PORT:]HOSTNAME[:DEST_PORT] (repeatable)
    #[arg(short, long = "endpoint", env = "PORTWARD_ENDPOINTS", value_delimiter = ',')]
    pub endpoints: Vec<String>,

    /// Skip TLS verification of the target
    #[arg(short, long, env = "PORTWARD_SKIP_TLS")]
    pub skip_tls: bool,

    /// Config file path (default is ~/.config/portward/config.yaml)
    #[arg(short, long, env = "PORTWARD_CONFIG")]
    pub config: Option<PathBuf>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
