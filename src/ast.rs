//! Statement and Program trees.
//!
//! A `Statement` owns its children outright. Sub-statements only ever move
//! between positions: assembling takes its parts by value, disassembling
//! hands the parts back and leaves the statement as an empty block. There
//! is no shared ownership anywhere in the tree, so no two live handles can
//! observe each other's mutation.
//!
//! Preconditions on the kernel operations are caller contracts (the parser
//! never violates them) and are checked with `debug_assert!`.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::mem;

use crate::condition::Condition;
use crate::error::{BlError, BlResult};
use crate::tokenizer::{is_identifier, is_primitive_instruction};

/// Discriminant of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
  Block,
  If,
  IfElse,
  While,
  Call,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
  /// Ordered children, none of which is itself a block.
  Block(Vec<Statement>),
  If {
    condition: Condition,
    then_block: Box<Statement>,
  },
  IfElse {
    condition: Condition,
    then_block: Box<Statement>,
    else_block: Box<Statement>,
  },
  While {
    condition: Condition,
    body: Box<Statement>,
  },
  Call {
    instruction: String,
  },
}

impl Default for Statement {
  fn default() -> Self {
    Self::new_block()
  }
}

impl Statement {
  /// An empty block.
  pub fn new_block() -> Self {
    Self::Block(Vec::new())
  }

  pub fn kind(&self) -> Kind {
    match self {
      Self::Block(_) => Kind::Block,
      Self::If { .. } => Kind::If,
      Self::IfElse { .. } => Kind::IfElse,
      Self::While { .. } => Kind::While,
      Self::Call { .. } => Kind::Call,
    }
  }

  /// Reset to an empty block, dropping the current contents.
  pub fn clear(&mut self) {
    *self = Self::new_block();
  }

  fn children(&self) -> &Vec<Statement> {
    match self {
      Self::Block(children) => children,
      other => panic!("expected a BLOCK statement, found {:?}", other.kind()),
    }
  }

  fn children_mut(&mut self) -> &mut Vec<Statement> {
    match self {
      Self::Block(children) => children,
      other => panic!("expected a BLOCK statement, found {:?}", other.kind()),
    }
  }

  /// Insert `s` at `pos` in this block, taking ownership of it.
  pub fn add_to_block(&mut self, pos: usize, s: Statement) {
    debug_assert!(s.kind() != Kind::Block, "a block cannot contain a block");
    let children = self.children_mut();
    debug_assert!(pos <= children.len(), "pos {pos} past end of block");
    children.insert(pos, s);
  }

  /// Remove the child at `pos` and hand ownership of it to the caller.
  pub fn remove_from_block(&mut self, pos: usize) -> Statement {
    let children = self.children_mut();
    debug_assert!(pos < children.len(), "pos {pos} past end of block");
    children.remove(pos)
  }

  /// Number of children in this block.
  pub fn length_of_block(&self) -> usize {
    self.children().len()
  }

  /// Borrow the child at `pos` without disturbing the block.
  pub fn block_entry(&self, pos: usize) -> &Statement {
    &self.children()[pos]
  }

  /// Children in order, borrowed.
  pub fn block_iter(&self) -> std::slice::Iter<'_, Statement> {
    self.children().iter()
  }

  /// Build `IF condition THEN then_block END IF`. `then_block` must be a block.
  pub fn assemble_if(condition: Condition, then_block: Statement) -> Statement {
    debug_assert_eq!(then_block.kind(), Kind::Block);
    Self::If {
      condition,
      then_block: Box::new(then_block),
    }
  }

  /// Split an `IF` into its condition and then-block; `self` becomes an empty
  /// block.
  pub fn disassemble_if(&mut self) -> (Condition, Statement) {
    match mem::take(self) {
      Self::If {
        condition,
        then_block,
      } => (condition, *then_block),
      other => panic!("expected an IF statement, found {:?}", other.kind()),
    }
  }

  /// The two blocks are taken by value, so they are necessarily distinct.
  pub fn assemble_if_else(
    condition: Condition,
    then_block: Statement,
    else_block: Statement,
  ) -> Statement {
    debug_assert_eq!(then_block.kind(), Kind::Block);
    debug_assert_eq!(else_block.kind(), Kind::Block);
    Self::IfElse {
      condition,
      then_block: Box::new(then_block),
      else_block: Box::new(else_block),
    }
  }

  /// Split an `IF ... ELSE` into its condition and both blocks, moving them
  /// out. `self` becomes an empty block.
  pub fn disassemble_if_else(&mut self) -> (Condition, Statement, Statement) {
    match mem::take(self) {
      Self::IfElse {
        condition,
        then_block,
        else_block,
      } => (condition, *then_block, *else_block),
      other => panic!("expected an IF_ELSE statement, found {:?}", other.kind()),
    }
  }

  /// Build `WHILE condition DO body END WHILE`. `body` must be a block.
  pub fn assemble_while(condition: Condition, body: Statement) -> Statement {
    debug_assert_eq!(body.kind(), Kind::Block);
    Self::While {
      condition,
      body: Box::new(body),
    }
  }

  /// Move the condition and body out of a `WHILE`, leaving `self` an empty
  /// block.
  pub fn disassemble_while(&mut self) -> (Condition, Statement) {
    match mem::take(self) {
      Self::While { condition, body } => (condition, *body),
      other => panic!("expected a WHILE statement, found {:?}", other.kind()),
    }
  }

  /// A call of `instruction`, which must be an identifier.
  pub fn assemble_call(instruction: impl Into<String>) -> Statement {
    let instruction = instruction.into();
    debug_assert!(
      is_identifier(&instruction),
      "\"{instruction}\" is not an identifier"
    );
    Self::Call { instruction }
  }

  /// Take the instruction name out of a call; `self` becomes an empty block.
  pub fn disassemble_call(&mut self) -> String {
    match mem::take(self) {
      Self::Call { instruction } => instruction,
      other => panic!("expected a CALL statement, found {:?}", other.kind()),
    }
  }
}

/// User-defined instructions of a program, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
  instructions: BTreeMap<String, Statement>,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  /// Define instruction `name` with `body`.
  ///
  /// Fails if `name` is not an identifier, names a primitive instruction, or
  /// is already defined. `body` must be a block.
  pub fn add(&mut self, name: impl Into<String>, body: Statement) -> BlResult<()> {
    let name = name.into();
    debug_assert_eq!(body.kind(), Kind::Block);
    if !is_identifier(&name) {
      return Err(BlError::InvalidIdentifier { found: name });
    }
    if is_primitive_instruction(&name) {
      return Err(BlError::ReservedInstructionName { name });
    }
    match self.instructions.entry(name) {
      btree_map::Entry::Occupied(entry) => Err(BlError::DuplicateInstructionName {
        name: entry.key().clone(),
      }),
      btree_map::Entry::Vacant(entry) => {
        entry.insert(body);
        Ok(())
      }
    }
  }

  /// Undefine `name`, handing its body back if it was defined.
  pub fn remove(&mut self, name: &str) -> Option<Statement> {
    self.instructions.remove(name)
  }

  pub fn get(&self, name: &str) -> Option<&Statement> {
    self.instructions.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.instructions.contains_key(name)
  }

  /// Number of defined instructions.
  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  /// Instructions in name order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Statement)> {
    self.instructions.iter().map(|(k, v)| (k.as_str(), v))
  }
}

/// A named program: its instruction context and main body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
  name: String,
  context: Context,
  body: Statement,
}

impl Default for Program {
  fn default() -> Self {
    Self::new()
  }
}

impl Program {
  /// An empty program named `Unnamed`.
  pub fn new() -> Self {
    Self {
      name: "Unnamed".to_string(),
      context: Context::new(),
      body: Statement::new_block(),
    }
  }

  /// Build a program from its parts, taking ownership of all three.
  pub fn assemble(name: impl Into<String>, context: Context, body: Statement) -> Self {
    let name = name.into();
    debug_assert!(is_identifier(&name), "\"{name}\" is not an identifier");
    debug_assert_eq!(body.kind(), Kind::Block);
    Self {
      name,
      context,
      body,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Rename the program. `name` must be an identifier.
  pub fn set_name(&mut self, name: impl Into<String>) {
    let name = name.into();
    debug_assert!(is_identifier(&name), "\"{name}\" is not an identifier");
    self.name = name;
  }

  pub fn context(&self) -> &Context {
    &self.context
  }

  pub fn body(&self) -> &Statement {
    &self.body
  }

  /// Install `context`, returning the one it replaces.
  pub fn replace_context(&mut self, context: Context) -> Context {
    mem::replace(&mut self.context, context)
  }

  /// Install `body`, returning the one it replaces.
  pub fn replace_body(&mut self, body: Statement) -> Statement {
    debug_assert_eq!(body.kind(), Kind::Block);
    mem::replace(&mut self.body, body)
  }

  /// Reset to `Program::new()`.
  pub fn clear(&mut self) {
    *self = Self::new();
  }
}
