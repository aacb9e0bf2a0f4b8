use std::collections::VecDeque;

use crate::context::InterpreterContext;

/// Lines kept in the backlog before the oldest are dropped.
pub const BACKLOG_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
  Number { digits: u32 },
  Text { letters: u32 },
}

/// What the message box is currently presenting.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
  Text {
    character: Option<String>,
    text: String,
  },
  Choices(Vec<String>),
  Input(InputKind),
}

/// The single on-screen message box.
///
/// Messages and choices from any context simply replace what is shown. An
/// input prompt is different: the prompting context locks the box until the
/// player submits, and other contexts wait until then. A context never waits
/// on a lock held by one of its callers.
#[derive(Debug, Default)]
pub struct MessageBox {
  owner: Option<InterpreterContext>,
  content: Option<Content>,
  /// The most recent lines of text shown, oldest first.
  pub backlog: VecDeque<String>,
}

impl MessageBox {
  /// Context holding an input prompt open, if any.
  pub fn owner(&self) -> Option<&InterpreterContext> {
    self.owner.as_ref()
  }

  pub fn content(&self) -> Option<&Content> {
    self.content.as_ref()
  }

  /// Whether an input prompt of an unrelated context holds the box.
  /// `callers` lists the contexts suspended on `context`, outermost first.
  pub fn is_locked_against(
    &self,
    context: &InterpreterContext,
    callers: &[InterpreterContext],
  ) -> bool {
    matches!(&self.owner, Some(owner) if owner != context && !callers.contains(owner))
  }

  /// Locks the box for an input prompt of `context`.
  pub fn lock(&mut self, context: &InterpreterContext, callers: &[InterpreterContext]) -> bool {
    if self.is_locked_against(context, callers) {
      return false;
    }
    self.owner = Some(context.clone());
    true
  }

  /// Drops the lock of `context` and clears the box. Does nothing for any
  /// other context.
  pub fn release(&mut self, context: &InterpreterContext) {
    if self.owner.as_ref() == Some(context) {
      self.owner = None;
      self.content = None;
    }
  }

  /// Clears whatever is shown unless an input prompt is open.
  pub fn erase(&mut self) {
    if self.owner.is_none() {
      self.content = None;
    }
  }

  pub fn show(&mut self, content: Content) {
    if let Content::Text { character, text } = &content {
      if self.backlog.len() == BACKLOG_LIMIT {
        self.backlog.pop_front();
      }
      self.backlog.push_back(match character {
        Some(character) => format!("{character}: {text}"),
        None => text.clone(),
      });
    }
    self.content = Some(content);
  }
}
