//! Shared error utilities used across the BL front-end.
//!
//! Every failure is fatal: the parser stops at the first problem and hands
//! the error back to its caller. Lexical errors point at the offending byte
//! with a caret, the same way the rest of the diagnostics quote the token
//! that was found in place of the expected one.

use std::path::PathBuf;

use snafu::Snafu;

pub type BlResult<T> = Result<T, BlError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum BlError {
  #[snafu(display("line {line}: {source_line}\n{marker} {message}"))]
  Lex {
    line: usize,
    source_line: String,
    marker: String,
    message: String,
  },

  #[snafu(display("expected {expected}, but got \"{found}\""))]
  TokenMismatch { expected: String, found: String },

  #[snafu(display("expected an identifier, but got \"{found}\""))]
  InvalidIdentifier { found: String },

  #[snafu(display("expected a condition, but got \"{found}\""))]
  InvalidCondition { found: String },

  #[snafu(display("{construct} \"{opening}\" is closed by \"END {closing}\""))]
  NameMismatch {
    construct: String,
    opening: String,
    closing: String,
  },

  #[snafu(display("instruction \"{name}\" is defined more than once"))]
  DuplicateInstructionName { name: String },

  #[snafu(display("\"{name}\" is a primitive instruction and cannot be redefined"))]
  ReservedInstructionName { name: String },

  #[snafu(display("expected {expected}, but reached end of input"))]
  PrematureEndOfInput { expected: String },

  #[snafu(display("unexpected token \"{found}\" after end of program"))]
  TrailingTokens { found: String },

  #[snafu(display("statements nested deeper than {limit} levels"))]
  NestingTooDeep { limit: usize },

  #[snafu(display("cannot read {}: {source}", path.display()))]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
}

impl BlError {
  /// Construct a lexical error anchored at a byte offset in the source.
  pub fn at(source: &str, loc: usize, message: impl Into<String>) -> Self {
    let safe_loc = loc.min(source.len());
    let line_start = source[..safe_loc].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[safe_loc..]
      .find('\n')
      .map_or(source.len(), |i| safe_loc + i);
    let line = source[..line_start].matches('\n').count() + 1;
    let source_line = source[line_start..line_end].to_string();
    let prefix = format!("line {line}: ");
    let column = source[line_start..safe_loc].chars().count();
    let marker = format!("{}^", " ".repeat(prefix.chars().count() + column));
    Self::Lex {
      line,
      source_line,
      marker,
      message: message.into(),
    }
  }

  pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
    Self::TokenMismatch {
      expected: expected.into(),
      found: found.into(),
    }
  }

  pub(crate) fn premature(expected: impl Into<String>) -> Self {
    Self::PrematureEndOfInput {
      expected: expected.into(),
    }
  }
}
