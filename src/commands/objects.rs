//! Generic animation triggers shared by every kind of scene object.
//!
//! All of them read a `number` (the object's slot) plus `duration`,
//! `easing` and `waitForCompletion`, fire the animation, and block the
//! interpreter for its duration when asked to. Commands addressing an empty
//! slot do nothing, except `Show*` which creates the object.

use log::debug;
use serde::Deserialize;

use crate::{
  command::{Command, Operand},
  error::Result,
  interpreter::Interpreter,
  runtime::Runtime,
  scene::{Animator, BlendMode, Easing, ObjectKind, SceneObject},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
  #[serde(default)]
  pub duration: u32,
  #[serde(default)]
  pub easing: Easing,
  #[serde(default)]
  pub wait_for_completion: bool,
}

#[derive(Debug, Deserialize)]
struct TargetParams {
  #[serde(default)]
  number: Operand,
  #[serde(flatten)]
  timing: Timing,
}

#[derive(Debug, Deserialize)]
struct ShowParams {
  #[serde(default)]
  number: Operand,
  graphic: Option<String>,
  x: Option<Operand>,
  y: Option<Operand>,
  #[serde(flatten)]
  timing: Timing,
}

#[derive(Debug, Deserialize)]
struct MoveParams {
  #[serde(default)]
  number: Operand,
  x: Operand,
  y: Operand,
  #[serde(flatten)]
  timing: Timing,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoomParams {
  #[serde(default)]
  number: Operand,
  #[serde(default = "full_zoom")]
  zoom_x: f64,
  #[serde(default = "full_zoom")]
  zoom_y: f64,
  #[serde(flatten)]
  timing: Timing,
}

fn full_zoom() -> f64 {
  100.
}

#[derive(Debug, Deserialize)]
struct TintParams {
  #[serde(default)]
  number: Operand,
  tone: [i32; 4],
  #[serde(flatten)]
  timing: Timing,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlendParams {
  #[serde(default)]
  number: Operand,
  opacity: Operand,
  #[serde(default)]
  blend_mode: BlendMode,
  #[serde(flatten)]
  timing: Timing,
}

#[derive(Debug, Deserialize)]
struct ShakeParams {
  #[serde(default)]
  number: Operand,
  #[serde(default = "default_range")]
  range: f64,
  #[serde(default = "default_speed")]
  speed: f64,
  #[serde(flatten)]
  timing: Timing,
}

fn default_range() -> f64 {
  6.
}

fn default_speed() -> f64 {
  5.
}

#[derive(Debug, Deserialize)]
struct MaskParams {
  #[serde(default)]
  number: Operand,
  mask: Option<String>,
  #[serde(flatten)]
  timing: Timing,
}

#[derive(Debug, Deserialize)]
struct EffectParams {
  #[serde(default)]
  number: Operand,
  effect: String,
  #[serde(flatten)]
  timing: Timing,
}

fn slot(interpreter: &Interpreter, rt: &Runtime, number: &Operand) -> usize {
  interpreter.number_value_of(rt, number).max(0.) as usize
}

/// Runs `animate` on an existing object and waits for the duration it
/// reports.
fn animate_object(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  rt: &mut Runtime,
  number: usize,
  timing: &Timing,
  animate: impl FnOnce(&mut SceneObject) -> u32,
) -> Result<()> {
  let Some(object) = rt.scene.container_mut(kind).get_mut(number) else {
    debug!("{}: no {kind:?} in slot {number}", interpreter.context);
    return Ok(());
  };
  let duration = animate(object);
  interpreter.wait_for_completion(duration, timing.wait_for_completion, rt);
  Ok(())
}

pub fn show_object(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ShowParams = command.params()?;
  let number = slot(interpreter, rt, &params.number);
  let x = params.x.as_ref().map(|x| interpreter.number_value_of(rt, x));
  let y = params.y.as_ref().map(|y| interpreter.number_value_of(rt, y));

  let object = rt.scene.container_mut(kind).get_or_create(number);
  if params.graphic.is_some() {
    object.graphic = params.graphic;
  }
  object.x = x.unwrap_or(object.x);
  object.y = y.unwrap_or(object.y);
  let duration = object.appear(params.timing.duration, params.timing.easing);
  interpreter.wait_for_completion(duration, params.timing.wait_for_completion, rt);
  Ok(())
}

pub fn erase_object(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: TargetParams = command.params()?;
  let number = slot(interpreter, rt, &params.number);
  let timing = params.timing;
  animate_object(kind, interpreter, rt, number, &timing, |object| {
    object.disappear(timing.duration, timing.easing)
  })?;
  if timing.duration == 0 {
    rt.scene.container_mut(kind).remove(number);
  }
  Ok(())
}

pub fn move_object(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: MoveParams = command.params()?;
  let number = slot(interpreter, rt, &params.number);
  let x = interpreter.number_value_of(rt, &params.x);
  let y = interpreter.number_value_of(rt, &params.y);
  let timing = params.timing;
  animate_object(kind, interpreter, rt, number, &timing, |object| {
    object.move_to(x, y, timing.duration, timing.easing)
  })
}

pub fn zoom_object(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ZoomParams = command.params()?;
  let number = slot(interpreter, rt, &params.number);
  let timing = params.timing;
  animate_object(kind, interpreter, rt, number, &timing, |object| {
    object.zoom_to(params.zoom_x, params.zoom_y, timing.duration, timing.easing)
  })
}

pub fn tint_object(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: TintParams = command.params()?;
  let number = slot(interpreter, rt, &params.number);
  let timing = params.timing;
  animate_object(kind, interpreter, rt, number, &timing, |object| {
    object.tint_to(params.tone, timing.duration, timing.easing)
  })
}

pub fn blend_object(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: BlendParams = command.params()?;
  let number = slot(interpreter, rt, &params.number);
  let opacity = interpreter.number_value_of(rt, &params.opacity);
  let timing = params.timing;
  animate_object(kind, interpreter, rt, number, &timing, |object| {
    object.blend_to(opacity, params.blend_mode, timing.duration, timing.easing)
  })
}

pub fn shake_object(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ShakeParams = command.params()?;
  let number = slot(interpreter, rt, &params.number);
  let timing = params.timing;
  animate_object(kind, interpreter, rt, number, &timing, |object| {
    object.shake(params.range, params.speed, timing.duration)
  })
}

pub fn mask_object(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: MaskParams = command.params()?;
  let number = slot(interpreter, rt, &params.number);
  let timing = params.timing;
  animate_object(kind, interpreter, rt, number, &timing, |object| {
    object.mask_to(params.mask, timing.duration)
  })
}

pub fn object_effect(
  kind: ObjectKind,
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: EffectParams = command.params()?;
  let number = slot(interpreter, rt, &params.number);
  let timing = params.timing;
  animate_object(kind, interpreter, rt, number, &timing, |object| {
    object.effect(&params.effect, timing.duration)
  })
}

pub fn command_shake_screen(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: ShakeParams = command.params()?;
  let duration = rt
    .scene
    .screen
    .shake(params.range, params.speed, params.timing.duration);
  interpreter.wait_for_completion(duration, params.timing.wait_for_completion, rt);
  Ok(())
}
