use std::collections::HashMap;

use derivative::Derivative;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
  error::{Error, Result},
  interpreter::dispatch::{self, Handler},
  value::Value,
  variables::VariableRef,
};

/// One instruction of a script. Block structure is carried by `indent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
  pub id: String,
  #[serde(default)]
  pub indent: usize,
  #[serde(default)]
  pub params: serde_json::Value,
}

impl Command {
  pub fn new(id: impl Into<String>, indent: usize, params: serde_json::Value) -> Self {
    Command {
      id: id.into(),
      indent,
      params,
    }
  }

  /// Decodes `params` into the handler's typed view of them.
  pub fn params<T: DeserializeOwned>(&self) -> Result<T> {
    let decoded = match &self.params {
      serde_json::Value::Null => T::deserialize(serde_json::Value::Object(Default::default())),
      params => T::deserialize(params),
    };
    decoded.map_err(|source| Error::InvalidParams {
      command: self.id.clone(),
      source,
    })
  }

  /// Name carried by `Label` and `JumpToLabel` commands.
  pub fn label_name(&self) -> Option<&str> {
    self.params.get("name").and_then(serde_json::Value::as_str)
  }

  /// Commands that prompt the player for input. A save taken while one of
  /// them is pending rolls back so the prompt is shown again on load.
  pub fn is_input_prompt(&self) -> bool {
    matches!(
      self.id.as_str(),
      "InputNumber" | "InputText" | "Choice" | "ShowChoices"
    )
  }
}

/// A param that is either written inline or read from a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
  Variable(VariableRef),
  Literal(Value),
}

impl Default for Operand {
  fn default() -> Self {
    Operand::Literal(Value::default())
  }
}

impl From<Value> for Operand {
  fn from(value: Value) -> Self {
    Operand::Literal(value)
  }
}

/// A command list prepared for execution: handlers are resolved, labels
/// indexed and the indent structure validated once, when the script loads.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Script {
  commands: Vec<Command>,
  #[derivative(Debug = "ignore")]
  handlers: Vec<Option<Handler>>,
  labels: HashMap<String, usize>,
  jump_targets: Vec<Option<usize>>,
}

impl Script {
  pub fn compile(commands: Vec<Command>) -> Result<Script> {
    let mut previous = 0;
    for (index, command) in commands.iter().enumerate() {
      if command.indent > previous + 1 || (index == 0 && command.indent > 0) {
        return Err(Error::MalformedIndent {
          index,
          indent: command.indent,
          previous,
        });
      }
      previous = command.indent;
    }

    let mut labels = HashMap::new();
    for (index, command) in commands.iter().enumerate() {
      if command.id == "Label" {
        if let Some(name) = command.label_name() {
          labels.entry(name.to_string()).or_insert(index);
        }
      }
    }

    let handlers = commands
      .iter()
      .map(|command| {
        let handler = dispatch::lookup(&command.id);
        if handler.is_none() {
          debug!("no handler for command '{}', it will be skipped", command.id);
        }
        handler
      })
      .collect();

    let jump_targets = commands
      .iter()
      .map(|command| match command.id.as_str() {
        "JumpToLabel" => command
          .label_name()
          .and_then(|name| labels.get(name).copied()),
        _ => None,
      })
      .collect();

    Ok(Script {
      commands,
      handlers,
      labels,
      jump_targets,
    })
  }

  pub fn len(&self) -> usize {
    self.commands.len()
  }

  pub fn is_empty(&self) -> bool {
    self.commands.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&Command> {
    self.commands.get(index)
  }

  pub fn commands(&self) -> &[Command] {
    &self.commands
  }

  pub fn handler(&self, index: usize) -> Option<Handler> {
    self.handlers.get(index).copied().flatten()
  }

  /// Precomputed target of the `JumpToLabel` command at `index`.
  pub fn jump_target(&self, index: usize) -> Option<usize> {
    self.jump_targets.get(index).copied().flatten()
  }

  pub fn label(&self, name: &str) -> Option<usize> {
    self.labels.get(name).copied()
  }
}
