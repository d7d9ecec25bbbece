//! Errors raised while tokenizing a config stream.

use std::io;

/// Errors produced by the lexer and line reader.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    /// The underlying stream failed.
    #[error("read error: {0}")]
    Io(#[from] io::Error),

    /// End of stream was reached inside a quoted span.
    #[error("unterminated {quote}-quoted string starting on line {line}")]
    UnterminatedQuote { quote: char, line: usize },

    /// A token was not valid UTF-8.
    #[error("invalid UTF-8 in token on line {line}")]
    InvalidUtf8 { line: usize },
}
