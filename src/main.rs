use anyhow::{Context, Result};
use argh::FromArgs;
use lambda_shell::reader::{EditorSource, LineSource, StreamSource};
use lambda_shell::{EditorMode, Interpreter, ShellConfig};
use std::env;
use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// A minimal interactive command shell.
struct Options {
    #[argh(option)]
    /// text printed before each line is read.
    prompt: Option<String>,

    #[argh(switch)]
    /// print the arguments of every external command before running it.
    trace: bool,

    #[argh(switch, short = 'v')]
    /// log process lifecycle events to stderr.
    verbose: bool,

    #[argh(switch)]
    /// read plain lines from stdin even on a terminal.
    plain: bool,
}

impl Options {
    fn config(&self) -> ShellConfig {
        let mut config = ShellConfig::default().with_trace(self.trace);
        if let Some(prompt) = &self.prompt {
            config = config.with_prompt(prompt.clone());
        }
        if self.plain {
            config = config.with_editor(EditorMode::Plain);
        }
        config
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = env::var("LSSH_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let options: Options = argh::from_env();
    init_logging(options.verbose);

    let config = options.config();
    let use_editor = config.editor == EditorMode::Auto && io::stdin().is_terminal();
    let mut source: Box<dyn LineSource> = if use_editor {
        Box::new(EditorSource::new().context("failed to start line editor")?)
    } else {
        Box::new(StreamSource::new(io::stdin().lock(), io::stdout()))
    };
    tracing::debug!(editor = use_editor, "starting shell");

    let mut shell = Interpreter::with_config(config);
    shell
        .repl(source.as_mut(), &mut io::stdout(), &mut io::stderr())
        .context("failed to read input")?;
    Ok(())
}
