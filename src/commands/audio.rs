use serde::Deserialize;

use crate::{
  audio::Track,
  command::{Command, Operand},
  error::Result,
  interpreter::Interpreter,
  runtime::Runtime,
};

fn full_volume() -> u32 {
  100
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayMusicParams {
  #[serde(default)]
  channel: usize,
  name: Operand,
  #[serde(default = "full_volume")]
  volume: u32,
  #[serde(default)]
  fade_in_duration: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopMusicParams {
  #[serde(default)]
  channel: usize,
  #[serde(default)]
  fade_out_duration: u32,
  #[serde(default)]
  wait_for_completion: bool,
}

#[derive(Debug, Deserialize)]
struct PlaySoundParams {
  name: Operand,
}

pub fn command_play_music(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: PlayMusicParams = command.params()?;
  let name = interpreter.string_value_of(rt, &params.name);
  rt.audio.play_music(
    params.channel,
    Track {
      name,
      volume: params.volume.min(100),
      fade_in: params.fade_in_duration,
    },
  );
  Ok(())
}

pub fn command_stop_music(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: StopMusicParams = command.params()?;
  let duration = rt
    .audio
    .stop_music(params.channel, params.fade_out_duration);
  interpreter.wait_for_completion(duration, params.wait_for_completion, rt);
  Ok(())
}

pub fn command_play_sound(
  interpreter: &mut Interpreter,
  command: &Command,
  rt: &mut Runtime,
) -> Result<()> {
  let params: PlaySoundParams = command.params()?;
  let name = interpreter.string_value_of(rt, &params.name);
  rt.audio.play_sound(&name);
  Ok(())
}
