//! Shell-wide settings and the fixed input limits.

/// Prompt printed before every line is read.
pub const PROMPT: &str = "lambda-shell$ ";

/// Size of the line buffer, terminator included.
///
/// A line holds at most `MAX_LINE_LEN - 1` bytes of content; anything past that is
/// dropped by the line reader.
pub const MAX_LINE_LEN: usize = 1024;

/// Number of slots in the token table, terminator included.
///
/// At most `MAX_TOKENS - 1` tokens are kept per line.
pub const MAX_TOKENS: usize = 100;

/// How the read loop obtains lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// Line editor on a terminal, plain reader otherwise.
    #[default]
    Auto,
    /// Always use the plain buffered reader.
    Plain,
}

/// Settings for a shell session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Text printed before each line is read.
    pub prompt: String,
    /// Print every argument of an external command to stdout before spawning it.
    pub trace: bool,
    /// Line source selection.
    pub editor: EditorMode,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: PROMPT.to_string(),
            trace: false,
            editor: EditorMode::Auto,
        }
    }
}

impl ShellConfig {
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_editor(mut self, editor: EditorMode) -> Self {
        self.editor = editor;
        self
    }
}
