use crate::command::{CommandFactory, Context, Control, ExecutableCommand};
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::lexer::ArgumentVector;
use crate::process::{ProcessControl, exit_code};
use std::ffi::CString;
use std::io::Write;

/// Command that is not a builtin.
///
/// Holds the argument vector with any trailing `&` already removed, converted to the
/// NUL-terminated form exec expects.
#[derive(Debug)]
pub struct ExternalCommand {
    argv: Vec<CString>,
    background: bool,
}

impl ExternalCommand {
    /// Build a command from a tokenized line, detecting and stripping the background marker.
    pub fn from_argv(argv: &ArgumentVector<'_>) -> Result<Self, ShellError> {
        let mut argv = argv.clone();
        let background = argv.strip_background();
        let argv = argv
            .iter()
            .map(|arg| {
                CString::new(arg).map_err(|_| ShellError::InvalidArgument(arg.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { argv, background })
    }

    pub fn is_background(&self) -> bool {
        self.background
    }

    pub fn argv(&self) -> &[CString] {
        &self.argv
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        argv: &ArgumentVector<'_>,
    ) -> Option<Result<Box<dyn ExecutableCommand>, ShellError>> {
        argv.program()?;
        Some(
            ExternalCommand::from_argv(argv)
                .map(|cmd| Box::new(cmd) as Box<dyn ExecutableCommand>),
        )
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<Control, ShellError> {
        let Some(program) = self.argv.first() else {
            tracing::debug!("background marker without a command");
            return Ok(Control::Continue);
        };

        reap_background(ctx.process);

        if ctx.trace {
            trace_arguments(ctx.stdout, &self.argv)?;
        }

        let pid = ctx.process.spawn(program, &self.argv)?;
        tracing::debug!(
            pid = pid.as_raw(),
            program = %program.to_string_lossy(),
            background = self.background,
            "spawned"
        );

        if !self.background {
            let status = ctx.process.wait_for(pid)?;
            tracing::debug!(
                pid = pid.as_raw(),
                exit_code = ?exit_code(&status),
                "foreground child finished"
            );
        }
        Ok(Control::Continue)
    }
}

/// Collect background children that already finished, discarding their statuses.
fn reap_background(process: &mut dyn ProcessControl) {
    match process.reap_exited() {
        Ok(reaped) => {
            for status in reaped {
                tracing::debug!(
                    pid = ?status.pid().map(|p| p.as_raw()),
                    exit_code = ?exit_code(&status),
                    "reaped background child"
                );
            }
        }
        Err(err) => tracing::warn!(%err, "failed to reap background children"),
    }
}

/// Print `<index>: '<arg>'` for every argument.
fn trace_arguments(out: &mut dyn Write, argv: &[CString]) -> Result<(), ShellError> {
    for (i, arg) in argv.iter().enumerate() {
        writeln!(out, "{}: '{}'", i, arg.to_string_lossy())?;
    }
    out.flush()?;
    Ok(())
}
