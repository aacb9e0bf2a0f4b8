use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a running script instance. Local variables are scoped to it
/// and the message box is owned by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterpreterContext {
  pub id: String,
  #[serde(default)]
  pub owner: Option<String>,
}

impl InterpreterContext {
  pub fn new(id: impl Into<String>, owner: Option<String>) -> Self {
    InterpreterContext {
      id: id.into(),
      owner,
    }
  }

  pub fn set(&mut self, id: impl Into<String>, owner: Option<String>) {
    self.id = id.into();
    self.owner = owner;
  }
}

impl fmt::Display for InterpreterContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.owner {
      Some(owner) => write!(f, "{}@{owner}", self.id),
      None => f.write_str(&self.id),
    }
  }
}
