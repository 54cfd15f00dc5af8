//! Lexical analysis: turns BL source text into a queue of word tokens.
//!
//! The tokenizer knows the lexical classes the parser asks about (keywords,
//! identifiers, conditions) but nothing about the grammar. Tokens are plain
//! strings; the queue always ends with the [`END_OF_INPUT`] sentinel, which no
//! source text can produce because it contains spaces.

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use crate::condition::Condition;
use crate::error::{BlError, BlResult};

/// Sentinel that terminates every token queue produced by [`tokenize`].
pub const END_OF_INPUT: &str = "### END OF INPUT ###";

pub const KEYWORDS: [&str; 10] = [
  "PROGRAM",
  "INSTRUCTION",
  "IS",
  "BEGIN",
  "END",
  "IF",
  "THEN",
  "ELSE",
  "WHILE",
  "DO",
];

/// Built-in instructions; valid in calls but never as user instruction names.
pub const PRIMITIVE_INSTRUCTIONS: [&str; 5] = ["move", "turnleft", "turnright", "infect", "skip"];

pub fn is_keyword(token: &str) -> bool {
  KEYWORDS.contains(&token)
}

pub fn is_primitive_instruction(token: &str) -> bool {
  PRIMITIVE_INSTRUCTIONS.contains(&token)
}

pub fn is_condition(token: &str) -> bool {
  Condition::is_condition(token)
}

/// A letter followed by letters, digits and dashes, that is neither a keyword
/// nor a condition word.
pub fn is_identifier(token: &str) -> bool {
  let mut chars = token.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  first.is_ascii_alphabetic()
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
    && !is_keyword(token)
    && !is_condition(token)
}

/// FIFO of tokens consumed strictly front to back by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
  queue: VecDeque<String>,
}

impl Tokens {
  /// Wrap tokens as given. The caller is responsible for the sentinel.
  pub fn new<I, S>(tokens: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      queue: tokens.into_iter().map(Into::into).collect(),
    }
  }

  /// Wrap tokens and append the end-of-input sentinel.
  pub fn terminated<I, S>(tokens: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut tokens = Self::new(tokens);
    tokens.queue.push_back(END_OF_INPUT.to_string());
    tokens
  }

  pub fn front(&self) -> Option<&str> {
    self.queue.front().map(String::as_str)
  }

  pub fn dequeue(&mut self) -> Option<String> {
    self.queue.pop_front()
  }

  pub fn len(&self) -> usize {
    self.queue.len()
  }

  pub fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }

  /// True when nothing but the sentinel (or nothing at all) is left.
  pub fn is_at_end(&self) -> bool {
    matches!(self.front(), None | Some(END_OF_INPUT))
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.queue.iter().map(String::as_str)
  }
}

impl fmt::Display for Tokens {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for token in self.iter().filter(|t| *t != END_OF_INPUT) {
      if !first {
        f.write_str(" ")?;
      }
      f.write_str(token)?;
      first = false;
    }
    Ok(())
  }
}

/// Lex the input into a token queue terminated by [`END_OF_INPUT`].
///
/// Words are maximal runs of ASCII letters, digits, `-` and `_`; whether a
/// word is a usable identifier is the parser's business. Any other
/// non-whitespace character is a lexical error. `#` starts a comment that
/// runs to the end of the line.
pub fn tokenize(input: &str) -> BlResult<Tokens> {
  let mut tokens = VecDeque::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    if c.is_ascii_whitespace() {
      i += 1;
      continue;
    }

    if c == b'#' {
      while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
      }
      continue;
    }

    if is_word_byte(c) {
      let start = i;
      while i < bytes.len() && is_word_byte(bytes[i]) {
        i += 1;
      }
      tokens.push_back(input[start..i].to_string());
      continue;
    }

    let invalid = input[i..].chars().next().unwrap_or_default();
    return Err(BlError::at(input, i, format!("invalid character '{invalid}'")));
  }

  trace!(count = tokens.len(), "tokenized input");
  tokens.push_back(END_OF_INPUT.to_string());
  Ok(Tokens { queue: tokens })
}

fn is_word_byte(c: u8) -> bool {
  c.is_ascii_alphanumeric() || c == b'-' || c == b'_'
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_words_and_appends_sentinel() {
    let tokens = tokenize("PROGRAM Test IS\n  BEGIN move END Test\n").unwrap();
    let words: Vec<_> = tokens.iter().collect();
    assert_eq!(
      words,
      ["PROGRAM", "Test", "IS", "BEGIN", "move", "END", "Test", END_OF_INPUT]
    );
  }

  #[test]
  fn comments_are_skipped() {
    let tokens = tokenize("move # turn around\nturnleft").unwrap();
    assert_eq!(tokens.to_string(), "move turnleft");
  }

  #[test]
  fn rejects_stray_punctuation() {
    let err = tokenize("BEGIN\n  move;\nEND").unwrap_err();
    assert!(matches!(err, BlError::Lex { line: 2, .. }), "{err:?}");
    assert!(err.to_string().contains("invalid character ';'"));
  }

  #[test]
  fn reports_non_ascii_characters_whole() {
    let err = tokenize("move\n  caf\u{e9}").unwrap_err();
    assert!(matches!(err, BlError::Lex { line: 2, .. }), "{err:?}");
    assert!(err.to_string().contains("invalid character '\u{e9}'"));
  }

  #[test]
  fn identifier_classification() {
    assert!(is_identifier("foo"));
    assert!(is_identifier("turn-around2"));
    assert!(is_identifier("move"));
    assert!(!is_identifier("IF"));
    assert!(!is_identifier("next-is-wall"));
    assert!(!is_identifier("2fast"));
    assert!(!is_identifier("under_score"));
    assert!(!is_identifier(""));
    assert!(!is_identifier(END_OF_INPUT));
  }

  #[test]
  fn keywords_are_never_identifiers() {
    for keyword in KEYWORDS {
      assert!(is_keyword(keyword));
      assert!(!is_identifier(keyword));
    }
  }

  #[test]
  fn queue_is_consumed_front_to_back() {
    let mut tokens = Tokens::terminated(["a", "b"]);
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens.dequeue().as_deref(), Some("a"));
    assert_eq!(tokens.front(), Some("b"));
    assert!(!tokens.is_at_end());
    tokens.dequeue();
    assert!(tokens.is_at_end());
    assert_eq!(tokens.front(), Some(END_OF_INPUT));
  }
}
