//! Crate root: wires together the BL front-end.
//!
//! The stages are small and composable:
//! - `tokenizer` splits source text into a queue of word tokens ending in a
//!   sentinel, and owns the lexical predicates (keyword, identifier, ...).
//! - `parser` owns all syntactic knowledge and builds `Statement`/`Program`
//!   trees by recursive descent.
//! - `ast` is the tree kernel: assemble/disassemble operations that move
//!   sub-trees between owners.
//! - `printer` turns a tree back into canonical BL source.
//! - `error` centralises the diagnostics shared by the other modules.

pub mod ast;
pub mod condition;
pub mod error;
pub mod parser;
pub mod printer;
pub mod tokenizer;

pub use ast::{Context, Kind, Program, Statement};
pub use condition::Condition;
pub use error::{BlError, BlResult};
pub use parser::ParserConfig;
pub use printer::PrinterConfig;
pub use tokenizer::{END_OF_INPUT, Tokens};

/// Tokenize and parse a complete BL program.
pub fn parse_program_source(source: &str) -> BlResult<Program> {
  let mut tokens = tokenizer::tokenize(source)?;
  parser::parse_program(&mut tokens)
}

/// Tokenize and parse a sequence of statements that must make up the whole
/// input.
pub fn parse_block_source(source: &str) -> BlResult<Statement> {
  let mut tokens = tokenizer::tokenize(source)?;
  let block = parser::parse_block(&mut tokens)?;
  expect_exhausted(&tokens)?;
  Ok(block)
}

/// Tokenize and parse exactly one statement.
pub fn parse_statement_source(source: &str) -> BlResult<Statement> {
  let mut tokens = tokenizer::tokenize(source)?;
  let stmt = parser::parse_statement(&mut tokens)?;
  expect_exhausted(&tokens)?;
  Ok(stmt)
}

/// Parse a program and print it back in canonical layout.
pub fn format_program_source(source: &str) -> BlResult<String> {
  let program = parse_program_source(source)?;
  Ok(printer::pretty_print(&program))
}

fn expect_exhausted(tokens: &Tokens) -> BlResult<()> {
  match tokens.front() {
    Some(token) if token != END_OF_INPUT => Err(BlError::TrailingTokens {
      found: token.to_string(),
    }),
    _ => Ok(()),
  }
}
