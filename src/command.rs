use crate::error::ShellError;
use crate::lexer::ArgumentVector;
use crate::process::ProcessControl;
use std::io::Write;

/// What the read-eval loop should do after a command was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Print the next prompt.
    Continue,
    /// Leave the loop.
    Exit,
}

/// Per-dispatch resources a command may use.
///
/// Nothing here outlives a single command: the background flag and the argument
/// vector live on the command itself and are rebuilt for every line.
pub struct Context<'a> {
    /// Kernel primitives (fork, exec, wait, chdir).
    pub process: &'a mut dyn ProcessControl,
    /// Destination of the argument trace.
    pub stdout: &'a mut dyn Write,
    /// Print the argument vector before spawning external programs.
    pub trace: bool,
}

/// A parsed command ready to run.
///
/// Builtins get this through a blanket impl; external programs implement it directly.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<Control, ShellError>;
}

/// Factory that tries to create a command from an argument vector.
///
/// Returns `None` when the factory doesn't recognize the command name, and
/// `Some(Err(_))` when it does but the arguments are unusable.
pub trait CommandFactory {
    fn try_create(
        &self,
        argv: &ArgumentVector<'_>,
    ) -> Option<Result<Box<dyn ExecutableCommand>, ShellError>>;
}
