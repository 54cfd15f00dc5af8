//! Primitive sensor conditions tested by `IF` and `WHILE`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Condition {
  NextIsEmpty,
  NextIsNotEmpty,
  NextIsWall,
  NextIsNotWall,
  NextIsFriend,
  NextIsNotFriend,
  NextIsEnemy,
  NextIsNotEnemy,
  Random,
  True,
}

impl Condition {
  pub const ALL: [Condition; 10] = [
    Condition::NextIsEmpty,
    Condition::NextIsNotEmpty,
    Condition::NextIsWall,
    Condition::NextIsNotWall,
    Condition::NextIsFriend,
    Condition::NextIsNotFriend,
    Condition::NextIsEnemy,
    Condition::NextIsNotEnemy,
    Condition::Random,
    Condition::True,
  ];

  /// The spelling of this condition in BL source.
  pub fn as_token(self) -> &'static str {
    match self {
      Condition::NextIsEmpty => "next-is-empty",
      Condition::NextIsNotEmpty => "next-is-not-empty",
      Condition::NextIsWall => "next-is-wall",
      Condition::NextIsNotWall => "next-is-not-wall",
      Condition::NextIsFriend => "next-is-friend",
      Condition::NextIsNotFriend => "next-is-not-friend",
      Condition::NextIsEnemy => "next-is-enemy",
      Condition::NextIsNotEnemy => "next-is-not-enemy",
      Condition::Random => "random",
      Condition::True => "true",
    }
  }

  /// Decode a condition token; `None` if the token is not in the vocabulary.
  pub fn from_token(token: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|c| c.as_token() == token)
  }

  pub fn is_condition(token: &str) -> bool {
    Self::from_token(token).is_some()
  }
}

impl fmt::Display for Condition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_token())
  }
}
