use std::io;

use thiserror::Error;

use crate::history::error::HistoryError;

/// Errors reported back to the interactive loop.
///
/// Only [`ShellError::ForkFailure`] ends the session; everything else is
/// printed and the loop carries on.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("unable to fork: {0}")]
    ForkFailure(#[source] io::Error),

    /// The process was created but the program could not be started.
    #[error("{cmd}: {source}")]
    ExecFailure {
        cmd: String,
        #[source]
        source: io::Error,
    },

    #[error("kill: ({0}) - No such process")]
    ProcessNotFound(u32),

    #[error("kill: could not kill ({pid}): {source}")]
    KillFailure {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("type: {0}: not found")]
    NotABuiltin(String),

    /// Bad arguments to a builtin; carries the builtin's usage text.
    #[error("{0}")]
    Usage(&'static str),

    #[error("h: history recall nested more than {0} levels")]
    RecallTooDeep(usize),

    #[error("history: {0}")]
    History(#[from] HistoryError),
}

impl ShellError {
    /// Classify an error from starting a child process.
    ///
    /// Only running out of processes or memory counts as a failed fork;
    /// anything else (bad format, permission denied) is an exec failure.
    pub fn from_spawn(cmd: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::OutOfMemory => ShellError::ForkFailure(err),
            _ => ShellError::ExecFailure {
                cmd: cmd.to_string(),
                source: err,
            },
        }
    }

    /// Whether the session has to end.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::ForkFailure(_))
    }
}
