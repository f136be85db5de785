use crate::command::{CommandFactory, Context, Control};
use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::lexer::{ArgumentVector, split_into_tokens};
use crate::process::{ProcessControl, UnixProcessControl};
use crate::reader::LineSource;
use std::io::Write;

/// Zero-sized [`CommandFactory`] for the command type `T`.
///
/// Implemented for every builtin and for [`ExternalCommand`](crate::external::ExternalCommand).
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell that runs `exit`, `cd` and external programs.
///
/// The interpreter owns the [`ProcessControl`] it spawns children through and a list
/// of [`CommandFactory`] objects queried in order for each line. The last factory
/// accepts any command name, so every non-empty line ends up somewhere.
///
/// Example
/// ```no_run
/// use lambda_shell::{Control, Interpreter, ShellConfig, split_into_tokens};
/// let mut sh = Interpreter::with_config(ShellConfig::default());
/// let argv = split_into_tokens("ls -la ..");
/// let next = sh.dispatch(&argv, &mut std::io::stdout(), &mut std::io::stderr());
/// assert_eq!(next, Control::Continue);
/// ```
pub struct Interpreter<P = UnixProcessControl> {
    config: ShellConfig,
    process: P,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter<UnixProcessControl> {
    pub fn with_config(config: ShellConfig) -> Self {
        Self::new(config, UnixProcessControl)
    }
}

impl<P: ProcessControl> Interpreter<P> {
    /// Create an interpreter with the default commands:
    /// - built-ins: `exit`, `cd`
    /// - external command launcher
    pub fn new(config: ShellConfig, process: P) -> Self {
        use crate::builtin::{Cd, Exit};
        use crate::external::ExternalCommand;
        Self {
            config,
            process,
            commands: vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn process(&self) -> &P {
        &self.process
    }

    /// Run one tokenized line.
    ///
    /// Errors are written to `stderr` as `lssh: <message>` and never stop the shell;
    /// only `exit` yields [`Control::Exit`]. `stdout` receives the argument trace when
    /// it is enabled.
    pub fn dispatch(
        &mut self,
        argv: &ArgumentVector<'_>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Control {
        match self.execute(argv, stdout) {
            Ok(control) => control,
            Err(err) => {
                tracing::debug!(%err, "command failed");
                if let Err(io_err) = writeln!(stderr, "lssh: {err}") {
                    tracing::warn!(%io_err, "failed to report error");
                }
                Control::Continue
            }
        }
    }

    /// Run one tokenized line, returning errors to the caller.
    pub fn execute(
        &mut self,
        argv: &ArgumentVector<'_>,
        stdout: &mut dyn Write,
    ) -> Result<Control, ShellError> {
        if argv.is_empty() {
            return Ok(Control::Continue);
        }
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(argv) {
                let mut ctx = Context {
                    process: &mut self.process,
                    stdout: &mut *stdout,
                    trace: self.config.trace,
                };
                return cmd?.execute(&mut ctx);
            }
        }
        Ok(Control::Continue)
    }

    /// Read-eval loop: prompt, read, tokenize, dispatch, until `exit` or end of input.
    pub fn repl(
        &mut self,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let prompt = self.config.prompt.clone();
        while let Some(line) = source.read_line(&prompt)? {
            let argv = split_into_tokens(&line);
            if self.dispatch(&argv, stdout, stderr) == Control::Exit {
                tracing::debug!("exit requested");
                break;
            }
        }
        Ok(())
    }
}
