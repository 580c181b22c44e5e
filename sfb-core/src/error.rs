//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Scene File Browser
//!
//! This module defines the error enum used across the whole crate. Each
//! variant carries the context the status surface needs (most importantly the
//! offending entry name), and all fallible operations return
//! `Result<T, AppError>`.

use compact_str::CompactString;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for all browser operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// The user dismissed the host permission prompt. Never surfaced to the
    /// status slot.
    #[error("directory selection was cancelled")]
    UserAborted,

    /// The host permission system rejected the request for any other reason.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Enumeration or read failure, tagged with the directory/file name it
    /// happened in.
    #[error("I/O error in \"{name}\": {source}")]
    Io {
        name: CompactString,
        #[source]
        source: io::Error,
    },

    /// The activated entry is neither an `.excalidraw` file nor of an
    /// accepted media type.
    #[error("unsupported file type: \"{0}\". Select an .excalidraw or JSON file")]
    UnsupportedFileType(CompactString),

    /// The scene deserializer rejected the file content.
    #[error("could not parse scene data: {0}")]
    SceneParse(String),

    /// TOML config parsing error.
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Config file I/O error with path.
    #[error("failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other error, with description.
    #[error("unexpected error: {0}")]
    Other(String),
}

impl AppError {
    /// Tag an enumeration failure with the directory it happened in.
    pub fn enumerate_failed<S: Into<CompactString>>(name: S, source: io::Error) -> Self {
        Self::Io {
            name: name.into(),
            source,
        }
    }

    /// Tag a content-read failure with the file it happened on.
    pub fn read_failed<S: Into<CompactString>>(name: S, source: io::Error) -> Self {
        Self::Io {
            name: name.into(),
            source,
        }
    }

    /// Create an unsupported-file-type rejection for the given entry name.
    pub fn unsupported<S: Into<CompactString>>(name: S) -> Self {
        Self::UnsupportedFileType(name.into())
    }

    /// True for the one failure that must never reach the status slot.
    #[must_use]
    pub const fn is_user_abort(&self) -> bool {
        matches!(self, Self::UserAborted)
    }
}

// Manual Clone implementation to handle the non-Clone io::Error fields
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            Self::UserAborted => Self::UserAborted,
            Self::PermissionDenied(msg) => Self::PermissionDenied(msg.clone()),
            Self::Io { name, source } => Self::Io {
                name: name.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::UnsupportedFileType(name) => Self::UnsupportedFileType(name.clone()),
            Self::SceneParse(msg) => Self::SceneParse(msg.clone()),
            Self::Config(e) => Self::Other(format!("config error: {e}")),
            Self::ConfigIo { path, source } => Self::ConfigIo {
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::Other(msg) => Self::Other(msg.clone()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::SceneParse(e.to_string())
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}
