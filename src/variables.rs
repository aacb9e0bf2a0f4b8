use std::collections::HashMap;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{
  context::InterpreterContext,
  error::{Error, Result},
  value::Value,
};

/// Highest slot a script may address in any bank, and the highest index a
/// list may be grown to.
pub const MAX_SLOT: usize = 9_999;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
  #[default]
  Local,
  Global,
  Persistent,
  /// Scratch space scoped to a context and refreshed every tick.
  Temp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Kind {
  #[default]
  Number,
  String,
  Boolean,
  List,
}

/// Address of a single variable slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableRef {
  #[serde(default)]
  pub scope: Scope,
  #[serde(default)]
  pub kind: Kind,
  #[serde(deserialize_with = "slot_index")]
  pub index: usize,
}

fn slot_index<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<usize, D::Error> {
  let index = usize::deserialize(deserializer)?;
  if index > MAX_SLOT {
    return Err(de::Error::custom(format!(
      "slot {index} is above the limit of {MAX_SLOT}"
    )));
  }
  Ok(index)
}

/// Checks an index computed at run time against `MAX_SLOT`.
pub fn check_slot(index: usize) -> Result<usize> {
  if index > MAX_SLOT {
    return Err(Error::SlotOutOfRange(index));
  }
  Ok(index)
}

impl VariableRef {
  pub fn local(kind: Kind, index: usize) -> Self {
    VariableRef {
      scope: Scope::Local,
      kind,
      index,
    }
  }

  pub fn global(kind: Kind, index: usize) -> Self {
    VariableRef {
      scope: Scope::Global,
      kind,
      index,
    }
  }

  /// The same slot shifted by `offset`, used by range operations.
  pub fn offset(&self, offset: usize) -> Result<Self> {
    Ok(VariableRef {
      index: check_slot(self.index.saturating_add(offset))?,
      ..self.clone()
    })
  }
}

/// One bank of variables of every kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSet {
  pub numbers: Vec<f64>,
  pub strings: Vec<String>,
  pub booleans: Vec<bool>,
  pub lists: Vec<Vec<Value>>,
}

fn slot<T: Default + Clone>(values: &mut Vec<T>, index: usize) -> &mut T {
  if index >= values.len() {
    values.resize(index + 1, T::default());
  }
  &mut values[index]
}

impl VariableSet {
  pub fn number(&self, index: usize) -> f64 {
    self.numbers.get(index).copied().unwrap_or(0.)
  }

  pub fn string(&self, index: usize) -> &str {
    self.strings.get(index).map(String::as_str).unwrap_or("")
  }

  pub fn boolean(&self, index: usize) -> bool {
    self.booleans.get(index).copied().unwrap_or(false)
  }

  pub fn list(&self, index: usize) -> &[Value] {
    self.lists.get(index).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn set_number(&mut self, index: usize, value: f64) {
    *slot(&mut self.numbers, index) = value;
  }

  pub fn set_string(&mut self, index: usize, value: String) {
    *slot(&mut self.strings, index) = value;
  }

  pub fn set_boolean(&mut self, index: usize, value: bool) {
    *slot(&mut self.booleans, index) = value;
  }

  pub fn list_mut(&mut self, index: usize) -> &mut Vec<Value> {
    slot(&mut self.lists, index)
  }
}

/// The variable store shared by every interpreter.
#[derive(Debug, Default)]
pub struct Variables {
  pub global: VariableSet,
  pub persistent: VariableSet,
  locals: HashMap<InterpreterContext, VariableSet>,
  temps: HashMap<InterpreterContext, VariableSet>,
}

impl Variables {
  /// Resets the temp bank of `context` for the tick about to run.
  pub fn setup_temp_variables(&mut self, context: &InterpreterContext) {
    match self.temps.get_mut(context) {
      Some(temps) => *temps = VariableSet::default(),
      None => {
        self.temps.insert(context.clone(), VariableSet::default());
      }
    }
  }

  pub fn clear_local_variables(&mut self, context: &InterpreterContext) {
    self.locals.remove(context);
    self.temps.remove(context);
  }

  fn bank(&self, context: &InterpreterContext, scope: Scope) -> Option<&VariableSet> {
    match scope {
      Scope::Global => Some(&self.global),
      Scope::Persistent => Some(&self.persistent),
      Scope::Local => self.locals.get(context),
      Scope::Temp => self.temps.get(context),
    }
  }

  pub fn bank_mut(&mut self, context: &InterpreterContext, scope: Scope) -> &mut VariableSet {
    match scope {
      Scope::Global => &mut self.global,
      Scope::Persistent => &mut self.persistent,
      Scope::Local => self.locals.entry(context.clone()).or_default(),
      Scope::Temp => self.temps.entry(context.clone()).or_default(),
    }
  }

  /// Reads a slot as a `Value` according to its kind. Lists read as their
  /// length.
  pub fn get(&self, context: &InterpreterContext, variable: &VariableRef) -> Value {
    match variable.kind {
      Kind::Number => Value::Float(self.number(context, variable)),
      Kind::String => Value::String(self.string(context, variable)),
      Kind::Boolean => Value::Bool(self.boolean(context, variable)),
      Kind::List => Value::Integer(self.list(context, variable).len() as i64),
    }
  }

  pub fn number(&self, context: &InterpreterContext, variable: &VariableRef) -> f64 {
    self
      .bank(context, variable.scope)
      .map(|set| set.number(variable.index))
      .unwrap_or(0.)
  }

  pub fn string(&self, context: &InterpreterContext, variable: &VariableRef) -> String {
    self
      .bank(context, variable.scope)
      .map(|set| set.string(variable.index).to_string())
      .unwrap_or_default()
  }

  pub fn boolean(&self, context: &InterpreterContext, variable: &VariableRef) -> bool {
    self
      .bank(context, variable.scope)
      .map(|set| set.boolean(variable.index))
      .unwrap_or(false)
  }

  pub fn list(&self, context: &InterpreterContext, variable: &VariableRef) -> Vec<Value> {
    self
      .bank(context, variable.scope)
      .map(|set| set.list(variable.index).to_vec())
      .unwrap_or_default()
  }

  pub fn set_number(&mut self, context: &InterpreterContext, variable: &VariableRef, value: f64) {
    self
      .bank_mut(context, variable.scope)
      .set_number(variable.index, value);
  }

  pub fn set_string(&mut self, context: &InterpreterContext, variable: &VariableRef, value: String) {
    self
      .bank_mut(context, variable.scope)
      .set_string(variable.index, value);
  }

  pub fn set_boolean(&mut self, context: &InterpreterContext, variable: &VariableRef, value: bool) {
    self
      .bank_mut(context, variable.scope)
      .set_boolean(variable.index, value);
  }

  pub fn list_mut(&mut self, context: &InterpreterContext, variable: &VariableRef) -> &mut Vec<Value> {
    self.bank_mut(context, variable.scope).list_mut(variable.index)
  }

  /// Writes `value` to the slot using the slot's own kind.
  pub fn assign(&mut self, context: &InterpreterContext, variable: &VariableRef, value: &Value) {
    match variable.kind {
      Kind::Number => self.set_number(context, variable, value.to_f64()),
      Kind::String => self.set_string(context, variable, value.to_string()),
      Kind::Boolean => self.set_boolean(context, variable, value.to_bool()),
      Kind::List => self.list_mut(context, variable).push(value.clone()),
    }
  }

  /// Seeds the local banks of a freshly called common event with the
  /// caller's arguments: numbers go to number slots, text to string slots,
  /// booleans to boolean slots, each in call order.
  pub fn set_parameters(&mut self, context: &InterpreterContext, parameters: &[Value]) {
    let locals = self.bank_mut(context, Scope::Local);
    let (mut numbers, mut strings, mut booleans) = (0, 0, 0);
    for parameter in parameters {
      match parameter {
        Value::Integer(_) | Value::Float(_) => {
          locals.set_number(numbers, parameter.to_f64());
          numbers += 1;
        }
        Value::String(string) => {
          locals.set_string(strings, string.clone());
          strings += 1;
        }
        Value::Bool(bool) => {
          locals.set_boolean(booleans, *bool);
          booleans += 1;
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn scripts_cannot_address_huge_slots() {
    let slot: VariableRef = serde_json::from_value(json!({ "index": MAX_SLOT })).unwrap();
    assert_eq!(slot.index, MAX_SLOT);
    assert!(serde_json::from_value::<VariableRef>(json!({ "index": 1_000_000_000_000u64 })).is_err());
    assert!(matches!(slot.offset(1), Err(Error::SlotOutOfRange(index)) if index == MAX_SLOT + 1));
  }

  fn context(id: &str) -> InterpreterContext {
    InterpreterContext::new(id, None)
  }

  #[test]
  fn locals_are_scoped_to_their_context() {
    let mut variables = Variables::default();
    let slot = VariableRef::local(Kind::Number, 2);
    variables.set_number(&context("a"), &slot, 7.);
    assert_eq!(variables.number(&context("a"), &slot), 7.);
    assert_eq!(variables.number(&context("b"), &slot), 0.);
  }

  #[test]
  fn globals_are_shared() {
    let mut variables = Variables::default();
    let slot = VariableRef::global(Kind::String, 0);
    variables.set_string(&context("a"), &slot, "hello".to_string());
    assert_eq!(variables.string(&context("b"), &slot), "hello");
  }

  #[test]
  fn temp_variables_reset_each_setup() {
    let mut variables = Variables::default();
    let slot = VariableRef {
      scope: Scope::Temp,
      kind: Kind::Boolean,
      index: 0,
    };
    variables.setup_temp_variables(&context("a"));
    variables.set_boolean(&context("a"), &slot, true);
    assert!(variables.boolean(&context("a"), &slot));
    variables.setup_temp_variables(&context("a"));
    assert!(!variables.boolean(&context("a"), &slot));
  }

  #[test]
  fn parameters_fill_slots_by_kind() {
    let mut variables = Variables::default();
    let ctx = context("event");
    variables.set_parameters(
      &ctx,
      &[Value::Integer(4), Value::from("name"), Value::Float(1.5), Value::Bool(true)],
    );
    assert_eq!(variables.number(&ctx, &VariableRef::local(Kind::Number, 0)), 4.);
    assert_eq!(variables.number(&ctx, &VariableRef::local(Kind::Number, 1)), 1.5);
    assert_eq!(variables.string(&ctx, &VariableRef::local(Kind::String, 0)), "name");
    assert!(variables.boolean(&ctx, &VariableRef::local(Kind::Boolean, 0)));
  }
}
