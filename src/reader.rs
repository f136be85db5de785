//! Where input lines come from.
//!
//! The read loop only needs "print a prompt, hand me the next line or tell me input
//! ended". [`EditorSource`] does that with `rustyline` on a terminal and
//! [`StreamSource`] with any buffered reader (pipes, files, tests).

use crate::config::MAX_LINE_LEN;
use crate::error::ShellError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Read, Write};

/// Supplier of raw input lines.
pub trait LineSource {
    /// Show `prompt` and return the next line, or `None` at end of input.
    ///
    /// Returned lines hold at most `MAX_LINE_LEN - 1` bytes. Input that is not valid
    /// UTF-8 has the offending bytes replaced with U+FFFD, so arguments naming files
    /// with non-UTF-8 names cannot be typed.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError>;
}

/// Interactive line editor with history.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self, ShellError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        tracing::debug!(%err, "failed to record history");
                    }
                }
                Ok(Some(truncate_line(line)))
            }
            // Ctrl-C drops the line being edited.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Prompt-and-read over plain streams.
///
/// The prompt is written to `output` and flushed before every read. Bytes past the
/// line limit are consumed and thrown away, so an overlong line never spills into
/// the next one.
pub struct StreamSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn discard_rest_of_line(&mut self) -> Result<(), ShellError> {
        loop {
            let buf = self.input.fill_buf()?;
            if buf.is_empty() {
                return Ok(());
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    self.input.consume(pos + 1);
                    return Ok(());
                }
                None => {
                    let len = buf.len();
                    self.input.consume(len);
                }
            }
        }
    }

    /// Called once the limit is reached; returns whether any content was thrown away.
    fn skip_past_limit(&mut self) -> Result<bool, ShellError> {
        match self.input.fill_buf()?.first().copied() {
            None => Ok(false),
            Some(b'\n') => {
                self.input.consume(1);
                Ok(false)
            }
            Some(_) => {
                self.discard_rest_of_line()?;
                Ok(true)
            }
        }
    }
}

impl<R: BufRead, W: Write> LineSource for StreamSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let limit = (MAX_LINE_LEN - 1) as u64;
        let mut buf = Vec::new();
        let n = (&mut self.input).take(limit).read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        let mut dropped = false;
        if n as u64 == limit && buf.last() != Some(&b'\n') {
            dropped = self.skip_past_limit()?;
        }
        let mut line = String::from_utf8_lossy(&buf).into_owned();
        // Replacement characters can push a line back over the limit.
        dropped |= cut_to_limit(&mut line);
        if dropped {
            tracing::debug!(limit, "input line too long, truncated");
        }
        Ok(Some(line))
    }
}

/// Cut `line` to at most `MAX_LINE_LEN - 1` bytes without splitting a character.
pub fn truncate_line(mut line: String) -> String {
    if cut_to_limit(&mut line) {
        tracing::debug!(limit = MAX_LINE_LEN - 1, "input line too long, truncated");
    }
    line
}

fn cut_to_limit(line: &mut String) -> bool {
    let limit = MAX_LINE_LEN - 1;
    if line.len() <= limit {
        return false;
    }
    let mut end = limit;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    line.truncate(end);
    true
}
