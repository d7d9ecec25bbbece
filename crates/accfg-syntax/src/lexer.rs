//! Byte-level tokenizer.
//!
//! Tokens are runs of bytes separated by spaces, tabs, or carriage returns.
//! Quoted spans (`"..."` or `'...'`) are folded into the surrounding token, so
//! `ab"c d"ef` is the single token `abc def`. A `#` outside quotes starts a
//! comment running to end of line. A colon ends the first token of a line
//! (`key: value`) and is an ordinary byte anywhere else.

use std::io::{self, BufRead};

use crate::SyntaxError;

/// What ended a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Whitespace (or the first-token colon); more tokens may follow on this line.
    Space,
    /// End of line, comment, or end of stream; the logical line is complete.
    Newline,
}

/// A single token. The text may be empty, e.g. for a blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub delimiter: Delimiter,
}

/// Pulls tokens from a buffered byte stream one byte at a time.
pub struct Lexer<R> {
    bytes: io::Bytes<R>,
    line: usize,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: reader.bytes(),
            line: 1,
        }
    }

    /// The 1-based line the next unread byte is on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next token.
    ///
    /// `first` must be true when this is the first token of a logical line;
    /// only then does a colon act as a delimiter.
    ///
    /// Returns `Ok(None)` at end of stream when nothing is pending. A final
    /// token without a trailing newline is returned with
    /// [`Delimiter::Newline`], and the following call returns `Ok(None)`.
    pub fn next_token(&mut self, first: bool) -> Result<Option<Token>, SyntaxError> {
        let start = self.line;
        let mut buf = Vec::new();

        loop {
            let Some(byte) = self.next_byte()? else {
                if buf.is_empty() {
                    return Ok(None);
                }
                return finish(buf, Delimiter::Newline, start).map(Some);
            };

            match byte {
                b'#' => {
                    self.skip_line()?;
                    return finish(buf, Delimiter::Newline, start).map(Some);
                }
                b'\n' => return finish(buf, Delimiter::Newline, start).map(Some),
                b'"' | b'\'' => self.read_quoted(byte, &mut buf)?,
                b':' if first => {
                    if !buf.is_empty() {
                        return finish(buf, Delimiter::Space, start).map(Some);
                    }
                }
                b' ' | b'\t' | b'\r' => {
                    if !buf.is_empty() {
                        return finish(buf, Delimiter::Space, start).map(Some);
                    }
                }
                _ => buf.push(byte),
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, SyntaxError> {
        match self.bytes.next() {
            None => Ok(None),
            Some(Ok(byte)) => {
                if byte == b'\n' {
                    self.line += 1;
                }
                Ok(Some(byte))
            }
            Some(Err(e)) => Err(e.into()),
        }
    }

    /// Discard through the next newline (or end of stream).
    fn skip_line(&mut self) -> Result<(), SyntaxError> {
        while let Some(byte) = self.next_byte()? {
            if byte == b'\n' {
                break;
            }
        }
        Ok(())
    }

    /// Append the body of a quoted span to `buf`, consuming the closing quote.
    ///
    /// A backslash escapes the following byte. Inside double quotes `\t`,
    /// `\n`, `\r` and `\b` become control characters.
    fn read_quoted(&mut self, quote: u8, buf: &mut Vec<u8>) -> Result<(), SyntaxError> {
        let start = self.line;
        let unterminated = || SyntaxError::UnterminatedQuote {
            quote: char::from(quote),
            line: start,
        };

        loop {
            let mut byte = self.next_byte()?.ok_or_else(unterminated)?;
            if byte == quote {
                return Ok(());
            }
            if byte == b'\\' {
                let escaped = self.next_byte()?.ok_or_else(unterminated)?;
                byte = if quote == b'"' {
                    match escaped {
                        b't' => b'\t',
                        b'n' => b'\n',
                        b'r' => b'\r',
                        b'b' => 0x08,
                        other => other,
                    }
                } else {
                    escaped
                };
            }
            buf.push(byte);
        }
    }
}

fn finish(buf: Vec<u8>, delimiter: Delimiter, line: usize) -> Result<Token, SyntaxError> {
    let text = String::from_utf8(buf).map_err(|_| SyntaxError::InvalidUtf8 { line })?;
    Ok(Token { text, delimiter })
}
