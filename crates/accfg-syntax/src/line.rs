//! Logical line reader.
//!
//! Groups tokens into lines of the form `key [value [extra...]]`.

use std::io::BufRead;

use crate::lexer::{Delimiter, Lexer};
use crate::SyntaxError;

/// One logical line: the non-empty tokens between two newlines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number the line started on.
    pub number: usize,
    pub tokens: Vec<String>,
}

impl Line {
    /// True for blank and comment-only lines.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The first token.
    pub fn key(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// The second token, if any.
    pub fn value(&self) -> Option<&str> {
        self.tokens.get(1).map(String::as_str)
    }

    /// Tokens after the value.
    pub fn extra(&self) -> &[String] {
        self.tokens.get(2..).unwrap_or_default()
    }

    /// True when the line is exactly `}`.
    pub fn is_block_end(&self) -> bool {
        self.tokens.len() == 1 && self.tokens[0] == "}"
    }
}

/// Reads logical lines from a byte stream.
pub struct LineReader<R> {
    lexer: Lexer<R>,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lexer: Lexer::new(reader),
            line: 1,
        }
    }

    /// Line number of the most recently started line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next logical line.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. Blank lines come back
    /// as empty [`Line`]s so the caller sees every line boundary.
    pub fn next_line(&mut self) -> Result<Option<Line>, SyntaxError> {
        self.line = self.lexer.line();
        let mut tokens = Vec::new();

        loop {
            let Some(token) = self.lexer.next_token(tokens.is_empty())? else {
                if tokens.is_empty() {
                    return Ok(None);
                }
                break;
            };

            if !token.text.is_empty() {
                tokens.push(token.text);
            }
            if token.delimiter == Delimiter::Newline {
                break;
            }
        }

        tracing::trace!(line = self.line, ?tokens, "read line");
        Ok(Some(Line {
            number: self.line,
            tokens,
        }))
    }
}
