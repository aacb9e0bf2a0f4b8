use std::time::Duration;

use log::{debug, info};
use vn_interpreter::{
  error::Result,
  interpreter::{ExternalEvent, WaitingFor},
  message::Content,
  project::{Game, Project},
  value::Value,
};

/// Answers whatever the game is blocked on the way an impatient player
/// would: dismiss every message, take the first choice, submit empty input.
fn auto_answer(game: &mut Game) {
  let event = match game.pending_wait() {
    Some(WaitingFor::Message) => {
      if let Some(Content::Text { character, text }) = game.runtime.message_box.content() {
        match character {
          Some(character) => println!("{character}: {text}"),
          None => println!("{text}"),
        }
      }
      ExternalEvent::MessageDismissed
    }
    Some(WaitingFor::Choice { .. }) => {
      if let Some(Content::Choices(choices)) = game.runtime.message_box.content() {
        println!("> {}", choices.first().map(String::as_str).unwrap_or(""));
      }
      ExternalEvent::ChoiceSelected(0)
    }
    Some(WaitingFor::Input { .. }) => ExternalEvent::InputSubmitted(Value::default()),
    Some(WaitingFor::Transition) => ExternalEvent::TransitionFinished,
    Some(WaitingFor::SubInterpreter) | None => return,
  };
  game.notify(event);
}

fn main() -> Result<()> {
  pretty_env_logger::init();
  let path = std::env::args()
    .nth(1)
    .unwrap_or_else(|| "project.json".to_string());
  let project = Project::load(&path)?;
  let frame_rate = project.config.frame_rate.max(1);
  let mut game = Game::new(project)?;

  let mut frames: u64 = 0;
  while !game.is_finished() {
    game.tick();
    for sound in game.runtime.audio.take_sounds() {
      debug!("sound: {sound}");
    }
    auto_answer(&mut game);
    frames += 1;
    std::thread::sleep(Duration::new(0, 1_000_000_000u32 / frame_rate));
  }
  info!("{path} finished after {frames} frames");
  Ok(())
}
