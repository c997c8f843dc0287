//! Error taxonomy for the engine.
//!
//! Three families, all recoverable at the command-loop boundary:
//!
//! - [`ParseError`]: malformed pipeline syntax
//! - [`LaunchError`]: a stage could not be spawned or wired up
//! - [`NotFoundError`]: a job id or alias that is not tracked
//!
//! A non-zero exit status from a process that *did* launch is not an error;
//! it travels back as data in [`crate::ExecResult`].

use std::path::PathBuf;

use thiserror::Error;

/// Top-level engine error, one variant per family.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

/// Malformed pipeline syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command line")]
    EmptyInput,
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("unexpected character at column {0}")]
    UnexpectedCharacter(usize),
    #[error("'&' is only allowed at the end of a command line")]
    BackgroundNotLast,
    #[error("empty pipeline stage")]
    EmptyStage,
    #[error("'{0}' requires a file name")]
    MissingRedirectTarget(char),
    #[error("redirection is only allowed at the ends of a pipeline")]
    MisplacedRedirect,
}

/// A stage could not be spawned or its streams could not be connected.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{program}: command not found")]
    NotFound { program: String },
    #[error("{program}: permission denied")]
    PermissionDenied { program: String },
    #[error("cannot open {}: {source}", path.display())]
    BadRedirect {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("pipeline i/o error: {0}")]
    Io(std::io::Error),
}

impl LaunchError {
    /// Classify a spawn failure for `program`.
    pub(crate) fn from_spawn(program: &str, err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => LaunchError::NotFound {
                program: program.to_string(),
            },
            ErrorKind::PermissionDenied => LaunchError::PermissionDenied {
                program: program.to_string(),
            },
            _ => LaunchError::Spawn {
                program: program.to_string(),
                source: err,
            },
        }
    }
}

/// A job id or alias that is not currently tracked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("no such job: {0}")]
    Job(u64),
    #[error("no such alias: {0}")]
    Alias(String),
}
