use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ExpressionError {
    #[error("missing config file fbexpr.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("config is missing required path: {0}")]
    ConfigMissingPath(String),

    #[error("cannot open source {path}: {message}")]
    SourceOpen { path: String, message: String },

    #[error("cannot read source {path}: {message}")]
    SourceRead { path: String, message: String },

    #[error("sink write failed: {0}")]
    Sink(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
