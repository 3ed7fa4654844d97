use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised before any worker is launched
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read option file {path:?}: {source}")]
    OptionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't locate home directory to find ~/.my.cnf")]
    NoHomeDir,

    #[error("MySQL credentials (user, password, host) must be provided either via CLI or ~/.my.cnf, missing: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("empty connection field {0:?}")]
    EmptyField(&'static str),

    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

/// Per-worker failures, only ever logged
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to connect: {0:#}")]
    Connect(#[source] anyhow::Error),

    #[error("connection error: {0:#}")]
    Liveness(#[source] anyhow::Error),
}
