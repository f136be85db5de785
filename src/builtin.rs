use crate::command::{CommandFactory, Context, Control, ExecutableCommand};
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::lexer::ArgumentVector;
use argh::FromArgs;
use std::path::Path;

/// Commands the shell runs in its own process.
///
/// Arguments are parsed with [`argh`]; a parse failure becomes a usage error.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "exit" or "cd".
    fn name() -> &'static str;

    /// Message reported when the arguments don't parse.
    fn usage() -> &'static str;

    fn execute(self, ctx: &mut Context<'_>) -> Result<Control, ShellError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<Control, ShellError> {
        <T as BuiltinCommand>::execute(*self, ctx)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        argv: &ArgumentVector<'_>,
    ) -> Option<Result<Box<dyn ExecutableCommand>, ShellError>> {
        let name = argv.program()?;
        if name != T::name() {
            return None;
        }
        // Everything after the name is positional, even tokens that look like flags.
        let args: Vec<&str> = std::iter::once("--").chain(argv.iter().skip(1)).collect();
        Some(match T::from_args(&[name], &args) {
            Ok(cmd) => Ok(Box::new(cmd) as Box<dyn ExecutableCommand>),
            Err(_) => Err(ShellError::Usage {
                command: name.to_string(),
                usage: T::usage().to_string(),
            }),
        })
    }
}

#[derive(FromArgs, Debug)]
/// Leave the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; exit never looks at its arguments.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn usage() -> &'static str {
        "usage: exit"
    }

    fn execute(self, _ctx: &mut Context<'_>) -> Result<Control, ShellError> {
        Ok(Control::Exit)
    }
}

#[derive(FromArgs, Debug)]
/// Change the working directory of the shell and of every command started after it.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn usage() -> &'static str {
        "usage: cd <directory>"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Control, ShellError> {
        let target = Path::new(&self.target);
        ctx.process.change_dir(target)?;
        tracing::debug!(target = %target.display(), "changed directory");
        Ok(Control::Continue)
    }
}
