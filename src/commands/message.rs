//! Message box commands. Messages and choices are shown right away unless
//! another context has an input prompt open, in which case the command is
//! retried every frame until the prompt is answered. Input prompts lock the
//! box for the prompting context until the player submits.

use serde::Deserialize;

use crate::{
  command::{Command, Operand},
  error::Result,
  interpreter::{Interpreter, WaitingFor},
  message::{Content, InputKind},
  runtime::Runtime,
  variables::{Kind, VariableRef},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowMessageParams {
  text: Operand,
  #[serde(default)]
  character: Option<String>,
  /// Overrides the `waitAtEnd` setting for this message.
  #[serde(default)]
  wait_for_completion: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ChoiceEntry {
  text: Operand,
  #[serde(default)]
  label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShowChoicesParams {
  choices: Vec<ChoiceEntry>,
  #[serde(default)]
  variable: Option<VariableRef>,
}

#[derive(Debug, Deserialize)]
struct InputNumberParams {
  variable: VariableRef,
  #[serde(default = "default_length")]
  digits: u32,
}

#[derive(Debug, Deserialize)]
struct InputTextParams {
  variable: VariableRef,
  #[serde(default = "default_length")]
  letters: u32,
}

fn default_length() -> u32 {
  8
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageSettingsParams {
  auto_erase: Option<bool>,
  wait_at_end: Option<bool>,
}

/// Parks the interpreter on the current command while an unrelated input
/// prompt holds the box.
fn wait_for_box(interpreter: &mut Interpreter, rt: &Runtime) -> bool {
  if interpreter.is_processing_message_in_other_context(rt) {
    interpreter.wait_for_message();
    return true;
  }
  false
}

pub fn command_show_message(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ShowMessageParams = command.params()?;
  if wait_for_box(interpreter, rt) {
    return Ok(());
  }
  let text = interpreter.string_value_of(rt, &params.text);
  rt.message_box.show(Content::Text {
    character: params.character,
    text,
  });

  if interpreter.is_instant_skip(rt) {
    if interpreter.settings.auto_erase {
      rt.message_box.erase();
    }
    return Ok(());
  }
  if params
    .wait_for_completion
    .unwrap_or(interpreter.settings.wait_at_end)
  {
    interpreter.wait_until(WaitingFor::Message);
  }
  Ok(())
}

pub fn command_show_choices(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ShowChoicesParams = command.params()?;
  if wait_for_box(interpreter, rt) {
    return Ok(());
  }
  let texts = params
    .choices
    .iter()
    .map(|choice| interpreter.string_value_of(rt, &choice.text))
    .collect();
  let labels = params.choices.into_iter().map(|choice| choice.label).collect();
  rt.message_box.show(Content::Choices(texts));
  interpreter.wait_until(WaitingFor::Choice {
    labels,
    variable: params.variable,
  });
  Ok(())
}

fn prompt(
  interpreter: &mut Interpreter,
  rt: &mut Runtime,
  variable: VariableRef,
  input: InputKind,
) {
  if !rt
    .message_box
    .lock(&interpreter.context, interpreter.callers())
  {
    interpreter.wait_for_message();
    return;
  }
  let kind = match input {
    InputKind::Number { .. } => Kind::Number,
    InputKind::Text { .. } => Kind::String,
  };
  rt.message_box.show(Content::Input(input));
  interpreter.wait_until(WaitingFor::Input {
    variable: VariableRef { kind, ..variable },
  });
}

pub fn command_input_number(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: InputNumberParams = command.params()?;
  prompt(
    interpreter,
    rt,
    params.variable,
    InputKind::Number {
      digits: params.digits,
    },
  );
  Ok(())
}

pub fn command_input_text(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: InputTextParams = command.params()?;
  prompt(
    interpreter,
    rt,
    params.variable,
    InputKind::Text {
      letters: params.letters,
    },
  );
  Ok(())
}

pub fn command_message_settings(
  interpreter: &mut Interpreter,
  command: &Command,
  _: &mut Runtime,
) -> Result<()> {
  let params: MessageSettingsParams = command.params()?;
  if let Some(auto_erase) = params.auto_erase {
    interpreter.settings.auto_erase = auto_erase;
  }
  if let Some(wait_at_end) = params.wait_at_end {
    interpreter.settings.wait_at_end = wait_at_end;
  }
  Ok(())
}

pub fn command_erase_message(
  interpreter: &mut Interpreter,
  _: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  rt.message_box.release(&interpreter.context);
  rt.message_box.erase();
  Ok(())
}
