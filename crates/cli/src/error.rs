//! Failures of the `vector-field` binary and the exit code each one maps to.
//!
//! | code | meaning |
//! |---|---|
//! | 0 | frame rendered, list or sample printed |
//! | 2 | bad command line, reported by clap before `run` starts |
//! | 10 | unknown engine or wave preset, zero or oversized canvas |
//! | 11 | seed file unreadable, PNG or `--save-seed` file not writable |
//! | 12 | `--params` not JSON, seed file missing fields, non-positive `--fps` |
//! | 13 | `--json` report could not be encoded |

use thiserror::Error;
use vector_field_core::EngineError;

#[derive(Debug, Error)]
pub enum CliError {
    /// The seed names something the registry cannot build or simulate.
    #[error(transparent)]
    Engine(EngineError),
    /// Reading the seed or writing the snapshot failed.
    #[error("{0}")]
    Io(String),
    /// The user's `--params`, `--pointer` or seed file is malformed.
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// PNG write failures count as I/O; bad param values and colors as input.
impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            EngineError::InvalidParam { .. } | EngineError::InvalidColor(_) => {
                CliError::Input(e.to_string())
            }
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}
