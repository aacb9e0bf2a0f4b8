//! Embedded scripts. The local variables of the calling context are bound
//! as three arrays, `numbers`, `strings` and `switches`, and whatever a
//! successful script leaves in them is written back afterwards.

use log::warn;
use rhai::{Array, Dynamic, Scope};
use serde::Deserialize;

use crate::{
  command::Command,
  context::InterpreterContext,
  error::{Error, Result},
  interpreter::Interpreter,
  runtime::Runtime,
  variables::{self, VariableSet},
};

#[derive(Debug, Deserialize)]
struct ScriptParams {
  script: String,
}

fn bind(locals: &VariableSet) -> Scope<'static> {
  let mut scope = Scope::new();
  let numbers: Array = locals.numbers.iter().map(|n| Dynamic::from_float(*n)).collect();
  let strings: Array = locals.strings.iter().cloned().map(Dynamic::from).collect();
  let switches: Array = locals.booleans.iter().map(|b| Dynamic::from_bool(*b)).collect();
  scope.push("numbers", numbers);
  scope.push("strings", strings);
  scope.push("switches", switches);
  scope
}

fn unbind(scope: &Scope, locals: &mut VariableSet) {
  if let Some(numbers) = scope.get_value::<Array>("numbers") {
    locals.numbers = numbers
      .iter()
      .map(|n| n.as_float().or_else(|_| n.as_int().map(|i| i as f64)).unwrap_or(0.))
      .collect();
  }
  if let Some(strings) = scope.get_value::<Array>("strings") {
    locals.strings = strings.iter().map(Dynamic::to_string).collect();
  }
  if let Some(switches) = scope.get_value::<Array>("switches") {
    locals.booleans = switches.iter().map(|b| b.as_bool().unwrap_or(false)).collect();
  }
}

fn run(source: &str, context: &InterpreterContext, rt: &mut Runtime) -> Result<Dynamic> {
  let locals = rt.variables.bank_mut(context, variables::Scope::Local);
  let mut scope = bind(locals);
  let result = rt
    .script_engine
    .eval_with_scope::<Dynamic>(&mut scope, source)
    .map_err(|err| Error::Script(err.to_string()))?;
  unbind(&scope, rt.variables.bank_mut(context, variables::Scope::Local));
  Ok(result)
}

/// Runs `source` and renders its final expression as text.
pub fn evaluate(source: &str, context: &InterpreterContext, rt: &mut Runtime) -> Result<String> {
  let value = run(source, context, rt)?;
  Ok(if value.is_unit() {
    String::new()
  } else {
    value.to_string()
  })
}

pub fn command_script(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ScriptParams = command.params()?;
  if let Err(err) = run(&params.script, &interpreter.context, rt) {
    warn!("{}: {err}", interpreter.context);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::variables::{Kind, VariableRef};

  #[test]
  fn scripts_see_and_update_locals() {
    let mut rt = Runtime::default();
    let ctx = InterpreterContext::new("scene", None);
    rt.variables
      .set_number(&ctx, &VariableRef::local(Kind::Number, 0), 2.);

    let result = evaluate(
      r#"numbers[0] = numbers[0] * 21.0; switches.push(true); "done""#,
      &ctx,
      &mut rt,
    )
    .unwrap();

    assert_eq!(result, "done");
    assert_eq!(rt.variables.number(&ctx, &VariableRef::local(Kind::Number, 0)), 42.);
    assert!(rt.variables.boolean(&ctx, &VariableRef::local(Kind::Boolean, 0)));
  }

  #[test]
  fn broken_scripts_report_an_error() {
    let mut rt = Runtime::default();
    let ctx = InterpreterContext::new("scene", None);
    assert!(matches!(evaluate("let = ;", &ctx, &mut rt), Err(Error::Script(_))));
  }
}
