//! Errors returned by the store, the command parser and snapshot I/O.
//!
//! Ошибки не логируются внутри библиотеки: всё возвращается вызывающему коду,
//! который сам решает, прерываться или нет.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KvError>;

#[derive(Debug, Error)]
pub enum KvError {
    /// First token is not SET/GET/DELETE.
    #[error("unknown command: {command}")]
    UnknownCommand { verb: String, command: String },

    /// Known verb with the wrong number of tokens (verb included in the count).
    #[error("malformed {verb} command: expected {expected} tokens, got {got}")]
    MalformedCommand {
        verb: &'static str,
        expected: usize,
        got: usize,
    },

    /// Open/create/read/write failure on the snapshot file (encode failures too).
    #[error("snapshot io at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot file is not a JSON object of string -> string.
    #[error("snapshot decode at {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl KvError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }

    /// True for errors coming from command text (as opposed to snapshot I/O).
    pub fn is_command_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand { .. } | Self::MalformedCommand { .. }
        )
    }
}
