//! Tokenizer and line reader for AC-style config files.
//!
//! A config file is a sequence of whitespace-delimited lines:
//!
//! ```text
//! key value extra extra   # comment
//! key: "quoted \t value"
//! section {
//!     key value
//! }
//! ```
//!
//! This crate turns a byte stream into logical lines of tokens. It does not
//! interpret keys, blocks, or values; that is left to the binding layer.

mod error;
mod lexer;
mod line;

pub use error::SyntaxError;
pub use lexer::{Delimiter, Lexer, Token};
pub use line::{Line, LineReader};
