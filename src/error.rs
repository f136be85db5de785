use nix::errno::Errno;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

/// Everything that can go wrong while reading or running a command line.
///
/// None of these end the session; the interpreter reports them and shows the
/// next prompt.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// Built-in called with the wrong arguments.
    #[error("{usage}")]
    Usage { command: String, usage: String },

    #[error("chdir: {}: {}", path.display(), errno.desc())]
    ChangeDir { path: PathBuf, errno: Errno },

    #[error("fork: {}", .0.desc())]
    Fork(Errno),

    #[error("wait: {}", .0.desc())]
    Wait(Errno),

    /// Token that cannot be passed to exec because it contains a NUL byte.
    #[error("{0}: argument contains a NUL byte")]
    InvalidArgument(String),

    #[error("read: {0}")]
    Io(#[from] std::io::Error),

    #[error("readline: {0}")]
    Readline(#[from] ReadlineError),
}
