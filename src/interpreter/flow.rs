//! Control-flow commands. These are the only handlers that move `indent`,
//! `loops` and `conditions` directly.

use serde::Deserialize;

use super::{Interpreter, WaitingFor};
use crate::{
  command::{Command, Operand},
  error::Result,
  runtime::Runtime,
  value::Value,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Comparison {
  #[default]
  #[serde(rename = "==")]
  Equal,
  #[serde(rename = "!=")]
  NotEqual,
  #[serde(rename = ">")]
  Greater,
  #[serde(rename = ">=")]
  GreaterOrEqual,
  #[serde(rename = "<")]
  Less,
  #[serde(rename = "<=")]
  LessOrEqual,
}

impl Comparison {
  pub fn holds(self, left: &Value, right: &Value) -> bool {
    let ordering = left.compare(right);
    match self {
      Comparison::Equal => ordering == 0.,
      Comparison::NotEqual => ordering != 0.,
      Comparison::Greater => ordering > 0.,
      Comparison::GreaterOrEqual => ordering >= 0.,
      Comparison::Less => ordering < 0.,
      Comparison::LessOrEqual => ordering <= 0.,
    }
  }
}

#[derive(Debug, Deserialize)]
struct ConditionParams {
  left: Operand,
  #[serde(default)]
  operation: Comparison,
  #[serde(default = "truthy")]
  right: Operand,
}

fn truthy() -> Operand {
  Operand::Literal(Value::Bool(true))
}

#[derive(Debug, Deserialize)]
struct LabelParams {
  name: String,
}

#[derive(Debug, Deserialize)]
struct WaitParams {
  time: Operand,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallCommonEventParams {
  common_event_id: String,
  #[serde(default)]
  parameters: Vec<Value>,
  #[serde(default = "default_true")]
  wait: bool,
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Deserialize)]
struct SceneParams {
  uid: String,
}

pub fn command_loop(interpreter: &mut Interpreter, _: &Command, _: &mut Runtime) -> Result<()> {
  interpreter.set_loop(interpreter.indent, Some(interpreter.pointer));
  interpreter.indent += 1;
  Ok(())
}

pub fn command_break_loop(
  interpreter: &mut Interpreter,
  _: &Command,
  _: &mut Runtime,
) -> Result<()> {
  let mut indent = interpreter.indent;
  while interpreter.loop_start(indent).is_none() && indent > 0 {
    indent -= 1;
  }
  interpreter.set_loop(indent, None);
  interpreter.indent = indent;
  Ok(())
}

pub fn command_condition(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ConditionParams = command.params()?;
  let left = interpreter.value_of(rt, &params.left);
  let right = interpreter.value_of(rt, &params.right);
  let result = params.operation.holds(&left, &right);
  interpreter.set_condition(interpreter.indent, result);
  if result {
    interpreter.indent += 1;
  }
  Ok(())
}

pub fn command_condition_else(
  interpreter: &mut Interpreter,
  _: &Command,
  _: &mut Runtime,
) -> Result<()> {
  if !interpreter.condition(interpreter.indent) {
    interpreter.indent += 1;
  }
  Ok(())
}

pub fn command_condition_else_if(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  if interpreter.condition(interpreter.indent) {
    return Ok(());
  }
  command_condition(interpreter, command, rt)
}

pub fn command_label(_: &mut Interpreter, _: &Command, _: &mut Runtime) -> Result<()> {
  Ok(())
}

pub fn command_jump_to_label(
  interpreter: &mut Interpreter,
  command: &Command,
  _: &mut Runtime,
) -> Result<()> {
  match interpreter.script.jump_target(interpreter.pointer) {
    Some(target) => {
      interpreter.jump_to(target);
      Ok(())
    }
    None => {
      let params: LabelParams = command.params()?;
      interpreter.jump_to_label(&params.name)
    }
  }
}

pub fn command_wait(interpreter: &mut Interpreter, command: &Command, rt: &mut Runtime) -> Result<()> {
  let params: WaitParams = command.params()?;
  if interpreter.is_instant_skip(rt) {
    return Ok(());
  }
  let frames = interpreter.number_value_of(rt, &params.time).max(0.) as u32;
  interpreter.wait(frames);
  Ok(())
}

pub fn command_call_common_event(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: CallCommonEventParams = command.params()?;
  interpreter.call_common_event(
    &params.common_event_id,
    &params.parameters,
    params.wait,
    rt,
  )
}

pub fn command_call_scene(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: SceneParams = command.params()?;
  interpreter.call_scene(&params.uid, rt)
}

/// Asks the frame driver to replace the running scene. The interpreter
/// stays blocked until the transition finishes or the scene is torn down.
pub fn command_change_scene(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: SceneParams = command.params()?;
  rt.request_scene_change(&params.uid);
  interpreter.wait_until(WaitingFor::Transition);
  Ok(())
}

pub fn command_exit_event(
  interpreter: &mut Interpreter,
  _: &Command,
  _: &mut Runtime,
) -> Result<()> {
  interpreter.loops.clear();
  interpreter.pointer = interpreter.script.len().saturating_sub(1);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn comparisons() {
    let three = Value::Integer(3);
    let four = Value::from("4");
    assert!(Comparison::Less.holds(&three, &four));
    assert!(Comparison::NotEqual.holds(&three, &four));
    assert!(Comparison::GreaterOrEqual.holds(&four, &four));
    assert!(!Comparison::Equal.holds(&three, &four));
  }

  #[test]
  fn comparison_symbols() {
    let parsed: Vec<Comparison> = serde_json::from_str(r#"["==", "!=", ">", ">=", "<", "<="]"#).unwrap();
    assert_eq!(
      parsed,
      vec![
        Comparison::Equal,
        Comparison::NotEqual,
        Comparison::Greater,
        Comparison::GreaterOrEqual,
        Comparison::Less,
        Comparison::LessOrEqual
      ]
    );
  }
}
