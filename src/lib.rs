//! A minimal interactive command shell.
//!
//! Each input line is split into an argument vector and either handled in-process
//! (`exit`, `cd`) or run as an external program through fork/exec, in the foreground
//! or, with a trailing `&`, in the background. Finished background children are
//! reaped before every new program is started.
//!
//! The main entry point is [`Interpreter`]. Process creation goes through the
//! [`ProcessControl`] trait so dispatch rules can be exercised without forking.

mod builtin;
pub mod command;
pub mod config;
pub mod error;
pub mod external;
mod interpreter;
pub mod lexer;
pub mod process;
pub mod reader;

pub use command::Control;
pub use config::{EditorMode, ShellConfig};
pub use error::ShellError;
pub use interpreter::Interpreter;
pub use lexer::{ArgumentVector, split_into_tokens};
pub use process::{ProcessControl, UnixProcessControl};
