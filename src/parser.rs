//! Recursive-descent parser producing BL statements and programs.
//!
//! The grammar is LL(1): the front token always decides which alternative
//! to take, and tokens are removed from the queue as they are consumed.
//! Blocks have no terminator of their own; a block simply ends at the first
//! token that cannot start a statement, and the enclosing construct then
//! demands its own closing words (`END IF`, `END WHILE`, `END name`).
//!
//! ```text
//! Program     ::= "PROGRAM" Identifier "IS" { Instruction }
//!                 "BEGIN" Block "END" Identifier EndOfInput
//! Instruction ::= "INSTRUCTION" Identifier "IS" Block "END" Identifier
//! Block       ::= { Statement }
//! Statement   ::= IfStmt | WhileStmt | CallStmt
//! IfStmt      ::= "IF" Condition "THEN" Block [ "ELSE" Block ] "END" "IF"
//! WhileStmt   ::= "WHILE" Condition "DO" Block "END" "WHILE"
//! CallStmt    ::= Identifier
//! ```
//!
//! The first error aborts the parse; no partial tree is returned.

use tracing::{debug, instrument, trace};

use crate::ast::{Context, Program, Statement};
use crate::condition::Condition;
use crate::error::{BlError, BlResult};
use crate::tokenizer::{END_OF_INPUT, Tokens, is_identifier};

/// Tunables for a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
  /// Deepest allowed nesting of `IF`/`WHILE` blocks.
  pub max_depth: usize,
}

impl Default for ParserConfig {
  fn default() -> Self {
    Self { max_depth: 256 }
  }
}

/// Parse a complete program, including the trailing end-of-input marker.
pub fn parse_program(tokens: &mut Tokens) -> BlResult<Program> {
  parse_program_with_config(tokens, &ParserConfig::default())
}

#[instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn parse_program_with_config(tokens: &mut Tokens, config: &ParserConfig) -> BlResult<Program> {
  let mut stream = TokenStream::new(tokens, config);

  stream.skip("PROGRAM")?;
  let name = stream.get_ident()?;
  stream.skip("IS")?;

  let mut context = Context::new();
  while stream.peek() == Some("INSTRUCTION") {
    let (instruction, body) = parse_instruction(&mut stream)?;
    debug!(
      instruction = %instruction,
      statements = body.length_of_block(),
      "parsed instruction"
    );
    context.add(instruction, body)?;
  }

  stream.skip("BEGIN")?;
  let body = parse_block_body(&mut stream)?;
  stream.skip("END")?;
  let closing = stream.get_ident()?;
  if closing != name {
    return Err(BlError::NameMismatch {
      construct: "PROGRAM".to_string(),
      opening: name,
      closing,
    });
  }
  stream.expect_end_of_input()?;

  debug!(
    program = %name,
    instructions = context.len(),
    statements = body.length_of_block(),
    "parsed program"
  );
  Ok(Program::assemble(name, context, body))
}

/// Parse a single statement from the front of `tokens`.
pub fn parse_statement(tokens: &mut Tokens) -> BlResult<Statement> {
  parse_statement_with_config(tokens, &ParserConfig::default())
}

pub fn parse_statement_with_config(
  tokens: &mut Tokens,
  config: &ParserConfig,
) -> BlResult<Statement> {
  let mut stream = TokenStream::new(tokens, config);
  parse_stmt(&mut stream)
}

/// Parse the longest run of statements at the front of `tokens` into a block.
/// Consumption stops at the first token that cannot start a statement.
pub fn parse_block(tokens: &mut Tokens) -> BlResult<Statement> {
  parse_block_with_config(tokens, &ParserConfig::default())
}

pub fn parse_block_with_config(tokens: &mut Tokens, config: &ParserConfig) -> BlResult<Statement> {
  let mut stream = TokenStream::new(tokens, config);
  parse_block_body(&mut stream)
}

/// Returns the instruction name and its body.
fn parse_instruction(stream: &mut TokenStream) -> BlResult<(String, Statement)> {
  stream.skip("INSTRUCTION")?;
  let name = stream.get_ident()?;
  stream.skip("IS")?;
  let body = parse_block_body(stream)?;
  stream.skip("END")?;
  let closing = stream.get_ident()?;
  if closing != name {
    return Err(BlError::NameMismatch {
      construct: "INSTRUCTION".to_string(),
      opening: name,
      closing,
    });
  }
  Ok((name, body))
}

fn parse_block_body(stream: &mut TokenStream) -> BlResult<Statement> {
  let mut block = Statement::new_block();
  while stream.at_statement_start() {
    let stmt = parse_stmt(stream)?;
    block.add_to_block(block.length_of_block(), stmt);
  }
  trace!(statements = block.length_of_block(), "parsed block");
  Ok(block)
}

fn parse_stmt(stream: &mut TokenStream) -> BlResult<Statement> {
  match stream.peek() {
    Some("IF") => parse_if(stream),
    Some("WHILE") => parse_while(stream),
    Some(token) if is_identifier(token) => parse_call(stream),
    None | Some(END_OF_INPUT) => Err(BlError::premature("a statement")),
    Some(token) => Err(BlError::mismatch("a statement", token)),
  }
}

fn parse_if(stream: &mut TokenStream) -> BlResult<Statement> {
  stream.skip("IF")?;
  let condition = stream.get_condition()?;
  stream.skip("THEN")?;
  let then_block = stream.nested_block()?;

  match stream.peek() {
    Some("ELSE") => {
      stream.skip("ELSE")?;
      let else_block = stream.nested_block()?;
      stream.skip("END")?;
      stream.skip("IF")?;
      Ok(Statement::assemble_if_else(condition, then_block, else_block))
    }
    Some("END") => {
      stream.skip("END")?;
      stream.skip("IF")?;
      Ok(Statement::assemble_if(condition, then_block))
    }
    None | Some(END_OF_INPUT) => Err(BlError::premature("\"ELSE\" or \"END\"")),
    Some(token) => Err(BlError::mismatch("\"ELSE\" or \"END\"", token)),
  }
}

fn parse_while(stream: &mut TokenStream) -> BlResult<Statement> {
  stream.skip("WHILE")?;
  let condition = stream.get_condition()?;
  stream.skip("DO")?;
  let body = stream.nested_block()?;
  stream.skip("END")?;
  stream.skip("WHILE")?;
  Ok(Statement::assemble_while(condition, body))
}

fn parse_call(stream: &mut TokenStream) -> BlResult<Statement> {
  let name = stream.get_ident()?;
  Ok(Statement::assemble_call(name))
}

/// Cursor over the caller's token queue; consumed tokens are gone for good.
struct TokenStream<'a> {
  tokens: &'a mut Tokens,
  config: &'a ParserConfig,
  depth: usize,
}

impl<'a> TokenStream<'a> {
  fn new(tokens: &'a mut Tokens, config: &'a ParserConfig) -> Self {
    Self {
      tokens,
      config,
      depth: 0,
    }
  }

  fn peek(&self) -> Option<&str> {
    self.tokens.front()
  }

  fn at_statement_start(&self) -> bool {
    matches!(self.peek(), Some(t) if t == "IF" || t == "WHILE" || is_identifier(t))
  }

  /// Consume the front token if it is exactly `word`.
  fn equal(&mut self, word: &str) -> bool {
    if self.peek() == Some(word) {
      self.tokens.dequeue();
      return true;
    }
    false
  }

  fn skip(&mut self, word: &str) -> BlResult<()> {
    if self.equal(word) {
      return Ok(());
    }
    let expected = format!("\"{word}\"");
    match self.peek() {
      None | Some(END_OF_INPUT) => Err(BlError::premature(expected)),
      Some(token) => Err(BlError::mismatch(expected, token)),
    }
  }

  fn get_ident(&mut self) -> BlResult<String> {
    match self.peek() {
      None | Some(END_OF_INPUT) => Err(BlError::premature("an identifier")),
      Some(token) if is_identifier(token) => Ok(self.take_front()),
      Some(token) => Err(BlError::InvalidIdentifier {
        found: token.to_string(),
      }),
    }
  }

  fn get_condition(&mut self) -> BlResult<Condition> {
    let condition = match self.peek() {
      None | Some(END_OF_INPUT) => return Err(BlError::premature("a condition")),
      Some(token) => Condition::from_token(token).ok_or_else(|| BlError::InvalidCondition {
        found: token.to_string(),
      })?,
    };
    self.tokens.dequeue();
    Ok(condition)
  }

  /// Parse a block one nesting level deeper than the current one.
  fn nested_block(&mut self) -> BlResult<Statement> {
    if self.depth >= self.config.max_depth {
      return Err(BlError::NestingTooDeep {
        limit: self.config.max_depth,
      });
    }
    self.depth += 1;
    let block = parse_block_body(self);
    self.depth -= 1;
    block
  }

  fn expect_end_of_input(&mut self) -> BlResult<()> {
    match self.tokens.dequeue() {
      Some(token) if token == END_OF_INPUT => Ok(()),
      Some(token) => Err(BlError::TrailingTokens { found: token }),
      None => Err(BlError::premature("the end-of-input marker")),
    }
  }

  /// Callers have already checked that a token is present.
  fn take_front(&mut self) -> String {
    self.tokens.dequeue().unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::Kind;
  use crate::tokenizer::tokenize;

  fn tokens(words: &[&str]) -> Tokens {
    Tokens::terminated(words.iter().copied())
  }

  fn calls(names: &[&str]) -> Statement {
    let mut block = Statement::new_block();
    for name in names {
      block.add_to_block(block.length_of_block(), Statement::assemble_call(*name));
    }
    block
  }

  #[test]
  fn block_stops_at_first_non_statement_token() {
    let mut tokens = tokens(&["move", "foo", "END", "bar"]);
    let block = parse_block(&mut tokens).unwrap();
    assert_eq!(block, calls(&["move", "foo"]));
    assert_eq!(tokens.front(), Some("END"));
  }

  #[test]
  fn empty_block_consumes_nothing() {
    let mut tokens = tokens(&["ELSE", "move"]);
    let block = parse_block(&mut tokens).unwrap();
    assert_eq!(block.length_of_block(), 0);
    assert_eq!(tokens.len(), 3);
  }

  #[test]
  fn if_without_else() {
    let mut tokens = tokens(&["IF", "next-is-empty", "THEN", "move", "END", "IF"]);
    let stmt = parse_statement(&mut tokens).unwrap();
    assert_eq!(stmt.kind(), Kind::If);
    assert_eq!(
      stmt,
      Statement::assemble_if(Condition::NextIsEmpty, calls(&["move"]))
    );
    assert!(tokens.is_at_end());
  }

  #[test]
  fn if_with_else_keeps_block_order() {
    let mut tokens = tokenize(
      "IF next-is-enemy THEN infect ELSE turnleft turnleft END IF",
    )
    .unwrap();
    let mut stmt = parse_statement(&mut tokens).unwrap();
    assert_eq!(stmt.kind(), Kind::IfElse);
    let (condition, then_block, else_block) = stmt.disassemble_if_else();
    assert_eq!(condition, Condition::NextIsEnemy);
    assert_eq!(then_block, calls(&["infect"]));
    assert_eq!(else_block, calls(&["turnleft", "turnleft"]));
  }

  #[test]
  fn nested_while_inside_if() {
    let mut tokens = tokenize(
      "IF true THEN WHILE next-is-not-wall DO move END WHILE turnright END IF",
    )
    .unwrap();
    let stmt = parse_statement(&mut tokens).unwrap();

    let mut inner = Statement::new_block();
    inner.add_to_block(
      0,
      Statement::assemble_while(Condition::NextIsNotWall, calls(&["move"])),
    );
    inner.add_to_block(1, Statement::assemble_call("turnright"));
    assert_eq!(stmt, Statement::assemble_if(Condition::True, inner));
  }

  #[test]
  fn endif_is_a_call_not_a_terminator() {
    let mut unclosed = tokens(&["IF", "random", "THEN", "move", "ENDIF"]);
    let err = parse_statement(&mut unclosed).unwrap_err();
    assert!(
      matches!(err, BlError::PrematureEndOfInput { ref expected } if expected == "\"ELSE\" or \"END\""),
      "{err:?}"
    );

    let mut misclosed = tokens(&["IF", "random", "THEN", "move", "ENDIF", "DO"]);
    let err = parse_statement(&mut misclosed).unwrap_err();
    assert!(
      matches!(err, BlError::TokenMismatch { ref found, .. } if found == "DO"),
      "{err:?}"
    );

    let mut then_part = tokens(&["move", "ENDIF", "END", "IF"]);
    let block = parse_block(&mut then_part).unwrap();
    assert_eq!(block, calls(&["move", "ENDIF"]));
    assert_eq!(then_part.front(), Some("END"));
  }

  #[test]
  fn end_while_must_name_while() {
    let mut tokens = tokens(&["WHILE", "true", "DO", "move", "END", "IF"]);
    let err = parse_statement(&mut tokens).unwrap_err();
    assert_eq!(err.to_string(), "expected \"WHILE\", but got \"IF\"");
  }

  #[test]
  fn bad_condition_is_reported() {
    let mut tokens = tokens(&["WHILE", "next-is-lava", "DO", "move", "END", "WHILE"]);
    let err = parse_statement(&mut tokens).unwrap_err();
    assert!(matches!(err, BlError::InvalidCondition { ref found } if found == "next-is-lava"));
  }

  #[test]
  fn keyword_cannot_start_a_statement() {
    let mut tokens = tokens(&["THEN"]);
    let err = parse_statement(&mut tokens).unwrap_err();
    assert!(matches!(err, BlError::TokenMismatch { .. }), "{err:?}");
  }

  #[test]
  fn statement_at_end_of_input_is_premature() {
    let mut tokens = tokens(&[]);
    let err = parse_statement(&mut tokens).unwrap_err();
    assert!(matches!(err, BlError::PrematureEndOfInput { .. }), "{err:?}");
  }

  #[test]
  fn nesting_limit_is_enforced() {
    let mut words = Vec::new();
    for _ in 0..3 {
      words.extend(["WHILE", "true", "DO"]);
    }
    words.push("move");
    for _ in 0..3 {
      words.extend(["END", "WHILE"]);
    }

    let config = ParserConfig { max_depth: 2 };
    let err = parse_statement_with_config(&mut tokens(&words), &config).unwrap_err();
    assert!(matches!(err, BlError::NestingTooDeep { limit: 2 }), "{err:?}");

    let config = ParserConfig { max_depth: 3 };
    let stmt = parse_statement_with_config(&mut tokens(&words), &config).unwrap();
    assert_eq!(stmt.kind(), Kind::While);
  }

  #[test]
  fn minimal_program() {
    let mut tokens = tokens(&["PROGRAM", "P", "IS", "BEGIN", "foo", "END", "P"]);
    let program = parse_program(&mut tokens).unwrap();
    assert_eq!(program.name(), "P");
    assert!(program.context().is_empty());
    assert_eq!(program.body(), &calls(&["foo"]));
    assert!(tokens.is_empty());
  }

  #[test]
  fn program_with_instructions() {
    let mut tokens = tokenize(
      "PROGRAM Walk IS
         INSTRUCTION step IS move END step
         INSTRUCTION turn-back IS turnleft turnleft END turn-back
       BEGIN
         step turn-back step
       END Walk",
    )
    .unwrap();
    let program = parse_program(&mut tokens).unwrap();
    assert_eq!(program.context().len(), 2);
    assert_eq!(program.context().get("step"), Some(&calls(&["move"])));
    assert_eq!(
      program.context().get("turn-back"),
      Some(&calls(&["turnleft", "turnleft"]))
    );
    assert_eq!(program.body(), &calls(&["step", "turn-back", "step"]));
  }

  #[test]
  fn instruction_name_must_match() {
    let mut tokens = tokens(&[
      "PROGRAM", "P", "IS", "INSTRUCTION", "foo", "IS", "move", "END", "bar", "BEGIN", "END", "P",
    ]);
    let err = parse_program(&mut tokens).unwrap_err();
    assert!(
      matches!(
        err,
        BlError::NameMismatch { ref construct, ref opening, ref closing }
          if construct == "INSTRUCTION" && opening == "foo" && closing == "bar"
      ),
      "{err:?}"
    );
  }

  #[test]
  fn trailing_tokens_are_rejected() {
    let mut tokens = tokens(&["PROGRAM", "P", "IS", "BEGIN", "END", "P", "move"]);
    let err = parse_program(&mut tokens).unwrap_err();
    assert!(matches!(err, BlError::TrailingTokens { ref found } if found == "move"));
  }

  #[test]
  fn missing_begin_is_a_mismatch() {
    let mut tokens = tokens(&["PROGRAM", "P", "IS", "move", "END", "P"]);
    let err = parse_program(&mut tokens).unwrap_err();
    assert_eq!(err.to_string(), "expected \"BEGIN\", but got \"move\"");
  }
}
