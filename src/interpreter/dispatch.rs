//! Maps command ids to their handlers. The table is built once and never
//! mutated; scripts resolve their handlers against it when compiled.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::{flow, Interpreter};
use crate::{
  command::Command,
  commands::{audio, message, objects, script, variables},
  error::Result,
  runtime::Runtime,
  scene::ObjectKind,
};

pub type Handler = fn(&mut Interpreter, &Command, &mut Runtime) -> Result<()>;

/// Registers the generic animation commands for one kind of object, e.g.
/// `ShowPicture`, `MovePicture`, ..., `PictureEffect`.
macro_rules! object_commands {
  ($table:ident, $kind:expr, $name:literal) => {
    $table.insert(
      concat!("Show", $name),
      |i: &mut Interpreter, c: &Command, r: &mut Runtime| objects::show_object($kind, i, c, r),
    );
    $table.insert(
      concat!("Erase", $name),
      |i: &mut Interpreter, c: &Command, r: &mut Runtime| objects::erase_object($kind, i, c, r),
    );
    $table.insert(
      concat!("Move", $name),
      |i: &mut Interpreter, c: &Command, r: &mut Runtime| objects::move_object($kind, i, c, r),
    );
    $table.insert(
      concat!("Zoom", $name),
      |i: &mut Interpreter, c: &Command, r: &mut Runtime| objects::zoom_object($kind, i, c, r),
    );
    $table.insert(
      concat!("Tint", $name),
      |i: &mut Interpreter, c: &Command, r: &mut Runtime| objects::tint_object($kind, i, c, r),
    );
    $table.insert(
      concat!("Blend", $name),
      |i: &mut Interpreter, c: &Command, r: &mut Runtime| objects::blend_object($kind, i, c, r),
    );
    $table.insert(
      concat!("Shake", $name),
      |i: &mut Interpreter, c: &Command, r: &mut Runtime| objects::shake_object($kind, i, c, r),
    );
    $table.insert(
      concat!("Mask", $name),
      |i: &mut Interpreter, c: &Command, r: &mut Runtime| objects::mask_object($kind, i, c, r),
    );
    $table.insert(
      concat!($name, "Effect"),
      |i: &mut Interpreter, c: &Command, r: &mut Runtime| objects::object_effect($kind, i, c, r),
    );
  };
}

fn build() -> HashMap<&'static str, Handler> {
  let mut table: HashMap<&'static str, Handler> = HashMap::new();

  table.insert("Loop", flow::command_loop);
  table.insert("BreakLoop", flow::command_break_loop);
  table.insert("Condition", flow::command_condition);
  table.insert("ConditionElse", flow::command_condition_else);
  table.insert("ConditionElseIf", flow::command_condition_else_if);
  table.insert("Label", flow::command_label);
  table.insert("JumpToLabel", flow::command_jump_to_label);
  table.insert("WaitCommand", flow::command_wait);
  table.insert("CallCommonEvent", flow::command_call_common_event);
  table.insert("CallScene", flow::command_call_scene);
  table.insert("ChangeScene", flow::command_change_scene);
  table.insert("ExitEvent", flow::command_exit_event);

  table.insert("ChangeNumberVariables", variables::command_change_number_variables);
  table.insert("ChangeStringVariables", variables::command_change_string_variables);
  table.insert("ChangeBooleanVariables", variables::command_change_boolean_variables);
  table.insert("ChangeListVariables", variables::command_change_list_variables);

  table.insert("ShowMessage", message::command_show_message);
  table.insert("ShowChoices", message::command_show_choices);
  table.insert("Choice", message::command_show_choices);
  table.insert("InputNumber", message::command_input_number);
  table.insert("InputText", message::command_input_text);
  table.insert("MessageSettings", message::command_message_settings);
  table.insert("EraseMessage", message::command_erase_message);

  table.insert("PlayMusic", audio::command_play_music);
  table.insert("StopMusic", audio::command_stop_music);
  table.insert("PlaySound", audio::command_play_sound);

  table.insert("Script", script::command_script);

  object_commands!(table, ObjectKind::Picture, "Picture");
  object_commands!(table, ObjectKind::Character, "Character");
  object_commands!(table, ObjectKind::Background, "Background");
  object_commands!(table, ObjectKind::Video, "Video");
  object_commands!(table, ObjectKind::Text, "Text");
  object_commands!(table, ObjectKind::Hotspot, "Hotspot");
  table.insert("ShakeScreen", objects::command_shake_screen);

  table
}

pub fn lookup(id: &str) -> Option<Handler> {
  static TABLE: OnceLock<HashMap<&'static str, Handler>> = OnceLock::new();
  TABLE.get_or_init(build).get(id).copied()
}
