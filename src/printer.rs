//! Pretty-printing: lower a parsed tree back into BL source text.
//!
//! Output re-tokenizes to exactly the token sequence the parser accepts for
//! the same tree, so `parse(print(p)) == p` for every well-formed program.

use crate::ast::{Program, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
  /// Spaces per nesting level.
  pub indent: usize,
}

impl Default for PrinterConfig {
  fn default() -> Self {
    Self { indent: 4 }
  }
}

pub fn pretty_print(program: &Program) -> String {
  pretty_print_with_config(program, &PrinterConfig::default())
}

pub fn pretty_print_with_config(program: &Program, config: &PrinterConfig) -> String {
  let mut out = String::new();
  let step = config.indent;

  line(&mut out, 0, &format!("PROGRAM {} IS", program.name()));
  out.push('\n');
  for (name, body) in program.context().iter() {
    line(&mut out, step, &format!("INSTRUCTION {name} IS"));
    emit_stmt(body, step + step, step, &mut out);
    line(&mut out, step, &format!("END {name}"));
    out.push('\n');
  }
  line(&mut out, 0, "BEGIN");
  emit_stmt(program.body(), step, step, &mut out);
  line(&mut out, 0, &format!("END {}", program.name()));

  out
}

/// Print `stmt` with its first line indented by `offset` spaces.
pub fn pretty_print_statement(stmt: &Statement, offset: usize) -> String {
  pretty_print_statement_with_config(stmt, offset, &PrinterConfig::default())
}

pub fn pretty_print_statement_with_config(
  stmt: &Statement,
  offset: usize,
  config: &PrinterConfig,
) -> String {
  let mut out = String::new();
  emit_stmt(stmt, offset, config.indent, &mut out);
  out
}

/// A block prints its children at the same offset; compound statements
/// indent their nested blocks one step further.
fn emit_stmt(stmt: &Statement, offset: usize, step: usize, out: &mut String) {
  match stmt {
    Statement::Block(children) => {
      for child in children {
        emit_stmt(child, offset, step, out);
      }
    }
    Statement::If {
      condition,
      then_block,
    } => {
      line(out, offset, &format!("IF {condition} THEN"));
      emit_stmt(then_block, offset + step, step, out);
      line(out, offset, "END IF");
    }
    Statement::IfElse {
      condition,
      then_block,
      else_block,
    } => {
      line(out, offset, &format!("IF {condition} THEN"));
      emit_stmt(then_block, offset + step, step, out);
      line(out, offset, "ELSE");
      emit_stmt(else_block, offset + step, step, out);
      line(out, offset, "END IF");
    }
    Statement::While { condition, body } => {
      line(out, offset, &format!("WHILE {condition} DO"));
      emit_stmt(body, offset + step, step, out);
      line(out, offset, "END WHILE");
    }
    Statement::Call { instruction } => line(out, offset, instruction),
  }
}

fn line(out: &mut String, offset: usize, text: &str) {
  out.push_str(&format!("{}{text}\n", " ".repeat(offset)));
}
