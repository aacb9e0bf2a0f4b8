use pretty_assertions::assert_eq;
use serde_json::json;
use vn_interpreter::{
  interpreter::{ExternalEvent, WaitingFor},
  project::{Game, Project},
};

fn game(project: serde_json::Value) -> Game {
  let project: Project = project.to_string().parse().unwrap();
  Game::new(project).unwrap()
}

fn global_counter(index: usize) -> serde_json::Value {
  json!({
    "id": "ChangeNumberVariables",
    "params": { "target": { "scope": "global", "index": index }, "operation": "add", "source": 1 }
  })
}

#[test]
fn a_short_story() {
  let mut game = game(json!({
    "scenes": [{
      "uid": "intro",
      "name": "Intro",
      "commands": [
        { "id": "ShowMessage", "params": { "text": "Welcome", "character": "Guide" } },
        { "id": "ShowChoices", "params": { "choices": [
          { "text": "Stay", "label": "stay" },
          { "text": "Leave", "label": "leave" }
        ] } },
        { "id": "Label", "params": { "name": "stay" } },
        { "id": "ChangeStringVariables", "params": { "target": { "scope": "global", "kind": "string", "index": 0 }, "source": "stayed" } },
        { "id": "ExitEvent" },
        { "id": "Label", "params": { "name": "leave" } },
        { "id": "ChangeStringVariables", "params": { "target": { "scope": "global", "kind": "string", "index": 0 }, "source": "left" } }
      ]
    }]
  }));

  game.tick();
  assert_eq!(game.pending_wait(), Some(&WaitingFor::Message));
  assert!(game.notify(ExternalEvent::MessageDismissed));

  game.tick();
  assert!(matches!(game.pending_wait(), Some(WaitingFor::Choice { .. })));
  assert!(game.notify(ExternalEvent::ChoiceSelected(1)));

  game.tick();
  assert!(game.is_finished());
  assert_eq!(game.runtime.variables.global.string(0), "left");
  assert_eq!(game.runtime.message_box.backlog, vec!["Guide: Welcome".to_string()]);
}

#[test]
fn parallel_events_run_every_frame() {
  let mut game = game(json!({
    "scenes": [{ "uid": "main", "commands": [{ "id": "WaitCommand", "params": { "time": 10 } }] }],
    "commonEvents": [{ "id": "clock", "parallel": true, "commands": [global_counter(0)] }]
  }));
  assert!(game.runtime.common_events.is_active("clock"));

  for _ in 0..3 {
    game.tick();
  }
  assert_eq!(game.runtime.variables.global.number(0), 3.);
  assert_eq!(game.parallel.len(), 1);
}

#[test]
fn spawned_events_start_on_the_next_frame() {
  let mut game = game(json!({
    "scenes": [{ "uid": "main", "commands": [
      { "id": "CallCommonEvent", "params": { "commonEventId": "chime", "wait": false } },
      { "id": "WaitCommand", "params": { "time": 10 } }
    ] }],
    "commonEvents": [{ "id": "chime", "commands": [global_counter(0)] }]
  }));

  game.tick();
  assert_eq!(game.runtime.variables.global.number(0), 0.);
  assert_eq!(game.parallel.len(), 1);

  game.tick();
  assert_eq!(game.runtime.variables.global.number(0), 1.);
  assert!(game.parallel.is_empty());
  assert!(!game.runtime.common_events.is_active("chime"));
}

#[test]
fn changing_scenes_replaces_the_main_interpreter() {
  let mut game = game(json!({
    "startScene": "a",
    "scenes": [
      { "uid": "a", "commands": [
        { "id": "ShowPicture", "params": { "number": 0 } },
        { "id": "ChangeScene", "params": { "uid": "b" } },
        global_counter(1)
      ] },
      { "uid": "b", "commands": [global_counter(0)] }
    ]
  }));

  game.tick();
  assert_eq!(game.main.context.id, "b");
  assert!(game.runtime.scene.pictures.is_empty());

  game.tick();
  assert!(game.is_finished());
  assert_eq!(game.runtime.variables.global.number(0), 1.);
  assert_eq!(game.runtime.variables.global.number(1), 0.);
}

#[test]
fn changing_to_a_missing_scene_continues() {
  let mut game = game(json!({
    "scenes": [{ "uid": "a", "commands": [
      { "id": "ChangeScene", "params": { "uid": "nowhere" } },
      global_counter(0)
    ] }]
  }));

  game.tick();
  assert_eq!(game.main.context.id, "a");
  assert_eq!(game.pending_wait(), None);

  game.tick();
  assert!(game.is_finished());
  assert_eq!(game.runtime.variables.global.number(0), 1.);
}

#[test]
fn malformed_scripts_are_rejected_on_load() {
  let project: Project = json!({
    "scenes": [{ "uid": "a", "commands": [
      { "id": "Loop" },
      { "id": "WaitCommand", "indent": 2, "params": { "time": 1 } }
    ] }]
  })
  .to_string()
  .parse()
  .unwrap();

  assert!(Game::new(project).is_err());
}

/// Ticks until the game ends, dismissing every message on the way.
fn play_through(game: &mut Game) {
  for _ in 0..200 {
    game.tick();
    if game.is_finished() {
      return;
    }
    game.notify(ExternalEvent::MessageDismissed);
  }
}

#[test]
fn called_events_can_talk_after_the_scene_did() {
  for settings in [json!({ "waitAtEnd": false }), json!({ "autoErase": false })] {
    let mut game = game(json!({
      "scenes": [{ "uid": "main", "commands": [
        { "id": "MessageSettings", "params": settings },
        { "id": "ShowMessage", "params": { "text": "narration" } },
        { "id": "CallCommonEvent", "params": { "commonEventId": "talk" } },
        global_counter(0)
      ] }],
      "commonEvents": [{ "id": "talk", "commands": [
        { "id": "ShowMessage", "params": { "text": "from event" } }
      ] }]
    }));

    play_through(&mut game);
    assert!(game.is_finished());
    assert_eq!(game.runtime.variables.global.number(0), 1.);
    assert_eq!(
      game.runtime.message_box.backlog,
      vec!["narration".to_string(), "from event".to_string()]
    );
  }
}

#[test]
fn huge_object_numbers_do_not_take_the_game_down() {
  let mut game = game(json!({
    "scenes": [{ "uid": "main", "commands": [
      { "id": "ShowPicture", "params": { "number": 1e15 } },
      { "id": "ChangeNumberVariables", "params": {
        "target": { "scope": "global", "index": 1_000_000_000_000u64 }, "source": 1
      } },
      global_counter(0)
    ] }]
  }));

  play_through(&mut game);
  assert!(game.is_finished());
  assert_eq!(game.runtime.scene.pictures.len(), 1);
  assert_eq!(game.runtime.variables.global.number(0), 1.);
}

#[test]
fn calling_a_parallel_event_leaves_it_running() {
  let mut game = game(json!({
    "scenes": [{ "uid": "main", "commands": [
      { "id": "CallCommonEvent", "params": { "commonEventId": "clock" } },
      { "id": "WaitCommand", "params": { "time": 10 } }
    ] }],
    "commonEvents": [{ "id": "clock", "parallel": true, "commands": [global_counter(0)] }]
  }));

  game.tick();
  assert_eq!(game.runtime.variables.global.number(0), 2.);
  assert!(game.runtime.common_events.is_active("clock"));
  assert_eq!(game.parallel.len(), 1);
}
