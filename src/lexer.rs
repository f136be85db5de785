//! Splitting a raw input line into an argument vector.
//!
//! There is no quoting or escaping: a token is any maximal run of characters outside
//! [`DELIMITERS`]. Tokens are slices of the line they came from, so an
//! [`ArgumentVector`] cannot outlive the line buffer it was built from.

use crate::config::MAX_TOKENS;

/// Characters that separate tokens. Runs of them collapse into one separator.
pub const DELIMITERS: [char; 4] = [' ', '\t', '\n', '\r'];

/// Literal token that marks a command for background execution.
pub const BACKGROUND_MARKER: &str = "&";

/// Ordered, bounded list of tokens borrowed from one input line.
///
/// Tokens are never empty and never contain a delimiter. Indexing one past the last
/// token with [`ArgumentVector::get`] yields `None`, which plays the role of the end
/// marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector<'a> {
    tokens: Vec<&'a str>,
    truncated: bool,
}

impl<'a> ArgumentVector<'a> {
    /// Build a vector from already split tokens, applying the same cap as the tokenizer.
    pub fn from_tokens(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut iter = tokens.into_iter().filter(|t| !t.is_empty());
        let tokens: Vec<&'a str> = iter.by_ref().take(MAX_TOKENS - 1).collect();
        let truncated = iter.next().is_some();
        Self { tokens, truncated }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `index`, or `None` at and past the end.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    /// Name of the command, i.e. token 0.
    pub fn program(&self) -> Option<&'a str> {
        self.get(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().copied()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.tokens
    }

    /// True if tokens past the cap were dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Remove a trailing `&` token.
    ///
    /// Returns whether the marker was present. Only the last token is inspected.
    pub fn strip_background(&mut self) -> bool {
        if self.tokens.last() == Some(&BACKGROUND_MARKER) {
            self.tokens.pop();
            true
        } else {
            false
        }
    }
}

/// Split `line` on [`DELIMITERS`].
///
/// A blank line gives an empty vector. At most `MAX_TOKENS - 1` tokens are kept; the
/// rest are silently dropped and the vector is flagged as truncated.
pub fn split_into_tokens(line: &str) -> ArgumentVector<'_> {
    let argv = ArgumentVector::from_tokens(line.split(DELIMITERS));
    if argv.is_truncated() {
        tracing::debug!(kept = argv.len(), "too many tokens, extra tokens dropped");
    }
    argv
}
