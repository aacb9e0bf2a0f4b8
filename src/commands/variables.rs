use log::warn;
use rand::Rng;
use serde::Deserialize;

use super::script;
use crate::{
  command::{Command, Operand},
  error::{Error, Result},
  interpreter::Interpreter,
  runtime::Runtime,
  value::Value,
  variables::{check_slot, VariableRef},
};

fn one() -> usize {
  1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum NumberOperation {
  #[default]
  Set,
  Add,
  Sub,
  Mul,
  Div,
  Mod,
}

impl NumberOperation {
  fn apply(self, current: f64, operand: f64) -> Result<f64> {
    Ok(match self {
      NumberOperation::Set => operand,
      NumberOperation::Add => current + operand,
      NumberOperation::Sub => current - operand,
      NumberOperation::Mul => current * operand,
      NumberOperation::Div if operand == 0. => return Err(Error::DivisionByZero),
      NumberOperation::Div => current / operand,
      NumberOperation::Mod if operand == 0. => return Err(Error::DivisionByZero),
      NumberOperation::Mod => {
        let mut result = current % operand;
        if result / operand < 0. {
          result += operand;
        }
        result
      }
    })
  }
}

#[derive(Debug, Deserialize)]
struct RandomRange {
  min: Operand,
  max: Operand,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberSource {
  Random { random: RandomRange },
  Value(Operand),
}

#[derive(Debug, Deserialize)]
struct ChangeNumberParams {
  target: VariableRef,
  #[serde(default = "one")]
  range: usize,
  #[serde(default)]
  operation: NumberOperation,
  source: NumberSource,
}

fn random_between(min: f64, max: f64) -> f64 {
  let (low, high) = if min <= max { (min, max) } else { (max, min) };
  let (low, high) = (low.round() as i64, high.round() as i64);
  rand::thread_rng().gen_range(low..=high) as f64
}

pub fn command_change_number_variables(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ChangeNumberParams = command.params()?;
  for offset in 0..params.range.max(1) {
    let variable = params.target.offset(offset)?;
    let operand = match &params.source {
      NumberSource::Random { random } => random_between(
        interpreter.number_value_of(rt, &random.min),
        interpreter.number_value_of(rt, &random.max),
      ),
      NumberSource::Value(operand) => interpreter.number_value_of(rt, operand),
    };
    let current = rt.variables.number(&interpreter.context, &variable);
    let value = params.operation.apply(current, operand)?;
    interpreter.set_number_value_to(rt, &variable, value);
  }
  Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum StringOperation {
  #[default]
  Set,
  Add,
  Upper,
  Lower,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringSource {
  Script { script: String },
  Value(Operand),
}

#[derive(Debug, Deserialize)]
struct ChangeStringParams {
  target: VariableRef,
  #[serde(default = "one")]
  range: usize,
  #[serde(default)]
  operation: StringOperation,
  #[serde(default)]
  source: Option<StringSource>,
}

pub fn command_change_string_variables(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ChangeStringParams = command.params()?;
  let operand = match &params.source {
    Some(StringSource::Script { script: source }) => {
      match script::evaluate(source, &interpreter.context, rt) {
        Ok(value) => value,
        Err(err) => {
          warn!("{}: string script failed: {err}", interpreter.context);
          return Ok(());
        }
      }
    }
    Some(StringSource::Value(operand)) => interpreter.string_value_of(rt, operand),
    None => String::new(),
  };
  for offset in 0..params.range.max(1) {
    let variable = params.target.offset(offset)?;
    let current = rt.variables.string(&interpreter.context, &variable);
    let value = match params.operation {
      StringOperation::Set => operand.clone(),
      StringOperation::Add => current + operand.as_str(),
      StringOperation::Upper => current.to_uppercase(),
      StringOperation::Lower => current.to_lowercase(),
    };
    interpreter.set_string_value_to(rt, &variable, value);
  }
  Ok(())
}

#[derive(Debug, Deserialize)]
struct ChangeBooleanParams {
  target: VariableRef,
  #[serde(default = "one")]
  range: usize,
  #[serde(default)]
  toggle: bool,
  #[serde(default)]
  value: Operand,
}

pub fn command_change_boolean_variables(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ChangeBooleanParams = command.params()?;
  let value = interpreter.boolean_value_of(rt, &params.value);
  for offset in 0..params.range.max(1) {
    let variable = params.target.offset(offset)?;
    let value = if params.toggle {
      !rt.variables.boolean(&interpreter.context, &variable)
    } else {
      value
    };
    interpreter.set_boolean_value_to(rt, &variable, value);
  }
  Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ListOperation {
  Push,
  Pop,
  Clear,
  Set,
  RemoveAt,
}

#[derive(Debug, Deserialize)]
struct ChangeListParams {
  target: VariableRef,
  operation: ListOperation,
  #[serde(default)]
  value: Operand,
  #[serde(default)]
  index: Operand,
}

pub fn command_change_list_variables(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ChangeListParams = command.params()?;
  let value: Value = interpreter.value_of(rt, &params.value);
  let index = interpreter.number_value_of(rt, &params.index).max(0.) as usize;
  let mut list = interpreter.list_object_of(rt, &params.target);
  match params.operation {
    ListOperation::Push => list.push(value),
    ListOperation::Pop => {
      list.pop();
    }
    ListOperation::Clear => list.clear(),
    ListOperation::Set => {
      check_slot(index)?;
      if index >= list.len() {
        list.resize(index + 1, Value::default());
      }
      list[index] = value;
    }
    ListOperation::RemoveAt => {
      if index < list.len() {
        list.remove(index);
      }
    }
  }
  interpreter.set_list_object_to(rt, &params.target, list);
  Ok(())
}
