use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value as Json};
use vn_interpreter::{
  audio::Track,
  command::{Command, Script},
  context::InterpreterContext,
  interpreter::{Interpreter, Progress},
  message::{Content, InputKind},
  runtime::Runtime,
  scene::{Animation, BlendMode},
  value::Value,
  variables::{Kind, VariableRef},
};

fn run(commands: Json) -> (Interpreter, Runtime) {
  let commands: Vec<Command> = serde_json::from_value(commands).unwrap();
  let script = Rc::new(Script::compile(commands).unwrap());
  let mut interpreter = Interpreter::new(InterpreterContext::new("scene", None), script);
  let mut rt = Runtime::default();
  interpreter.start();
  interpreter.update(&mut rt);
  (interpreter, rt)
}

fn number(rt: &Runtime, interpreter: &Interpreter, index: usize) -> f64 {
  rt.variables
    .number(&interpreter.context, &VariableRef::local(Kind::Number, index))
}

#[test]
fn number_operations() {
  let (scene, rt) = run(json!([
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 0 }, "source": -7 } },
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 0 }, "operation": "mod", "source": 3 } },
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 1 }, "range": 3, "source": 4 } },
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 2 }, "operation": "mul", "source": { "index": 1 } } },
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 3 }, "operation": "div", "source": 8 } },
  ]));

  assert_eq!(number(&rt, &scene, 0), 2.);
  assert_eq!(number(&rt, &scene, 1), 4.);
  assert_eq!(number(&rt, &scene, 2), 16.);
  assert_eq!(number(&rt, &scene, 3), 0.5);
}

#[test]
fn random_numbers_stay_in_range() {
  let (scene, rt) = run(json!([
    { "id": "ChangeNumberVariables", "params": {
      "target": { "index": 0 },
      "range": 20,
      "source": { "random": { "min": 1, "max": 6 } }
    } },
  ]));

  for index in 0..20 {
    let value = number(&rt, &scene, index);
    assert!((1. ..=6.).contains(&value), "{value} out of range");
    assert_eq!(value.fract(), 0.);
  }
}

#[test]
fn string_operations() {
  let (scene, rt) = run(json!([
    { "id": "ChangeStringVariables", "params": { "target": { "kind": "string", "index": 0 }, "source": "Hello" } },
    { "id": "ChangeStringVariables", "params": { "target": { "kind": "string", "index": 0 }, "operation": "add", "source": ", world" } },
    { "id": "ChangeStringVariables", "params": { "target": { "kind": "string", "index": 0 }, "operation": "upper" } },
  ]));

  assert_eq!(
    rt.variables
      .string(&scene.context, &VariableRef::local(Kind::String, 0)),
    "HELLO, WORLD"
  );
}

#[test]
fn boolean_values_and_toggles() {
  let (scene, rt) = run(json!([
    { "id": "ChangeBooleanVariables", "params": { "target": { "kind": "boolean", "index": 0 }, "value": true } },
    { "id": "ChangeBooleanVariables", "params": { "target": { "kind": "boolean", "index": 0 }, "toggle": true } },
    { "id": "ChangeBooleanVariables", "params": { "target": { "kind": "boolean", "index": 1 }, "toggle": true } },
  ]));

  let boolean = |index| {
    rt.variables
      .boolean(&scene.context, &VariableRef::local(Kind::Boolean, index))
  };
  assert!(!boolean(0));
  assert!(boolean(1));
}

#[test]
fn list_operations() {
  let list = json!({ "kind": "list", "index": 0 });
  let (scene, rt) = run(json!([
    { "id": "ChangeListVariables", "params": { "target": list.clone(), "operation": "push", "value": "a" } },
    { "id": "ChangeListVariables", "params": { "target": list.clone(), "operation": "push", "value": "b" } },
    { "id": "ChangeListVariables", "params": { "target": list.clone(), "operation": "set", "index": 3, "value": "d" } },
    { "id": "ChangeListVariables", "params": { "target": list.clone(), "operation": "removeAt", "index": 0 } },
    { "id": "ChangeListVariables", "params": { "target": list.clone(), "operation": "pop" } },
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 0 }, "source": list.clone() } },
  ]));

  assert_eq!(
    rt.variables
      .list(&scene.context, &VariableRef::local(Kind::List, 0)),
    vec![Value::from("b"), Value::Integer(0)]
  );
  // A list read as a number is its length.
  assert_eq!(number(&rt, &scene, 0), 2.);
}

#[test]
fn out_of_range_slots_are_rejected() {
  let list = json!({ "kind": "list", "index": 0 });
  let (scene, rt) = run(json!([
    { "id": "ChangeListVariables", "params": { "target": list.clone(), "operation": "push", "value": "a" } },
    { "id": "ChangeListVariables", "params": { "target": list.clone(), "operation": "set", "index": 1e12, "value": "z" } },
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 9_998 }, "range": 1_000_000_000_000u64, "source": 1 } },
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 1 }, "source": 5 } },
  ]));

  assert_eq!(
    rt.variables
      .list(&scene.context, &VariableRef::local(Kind::List, 0)),
    vec![Value::from("a")]
  );
  assert_eq!(number(&rt, &scene, 9_998), 1.);
  assert_eq!(number(&rt, &scene, 9_999), 1.);
  assert_eq!(number(&rt, &scene, 1), 5.);
}

#[test]
fn scripts_read_and_write_locals() {
  let (scene, rt) = run(json!([
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 0 }, "source": 20 } },
    { "id": "Script", "params": { "script": "numbers[0] += 1.0; numbers.push(5); strings.push(\"Ayla\");" } },
    { "id": "ChangeStringVariables", "params": {
      "target": { "scope": "global", "kind": "string", "index": 0 },
      "source": { "script": "\"Hi \" + strings[0]" }
    } },
    { "id": "Script", "params": { "script": "let = ;" } },
    { "id": "ChangeNumberVariables", "params": { "target": { "index": 2 }, "source": 1 } },
  ]));

  assert_eq!(number(&rt, &scene, 0), 21.);
  assert_eq!(number(&rt, &scene, 1), 5.);
  assert_eq!(rt.variables.global.string(0), "Hi Ayla");
  assert_eq!(number(&rt, &scene, 2), 1.);
}

#[test]
fn objects_are_created_and_animated() {
  let (scene, rt) = run(json!([
    { "id": "ShowPicture", "params": { "number": 1, "graphic": "bg.png", "x": 10, "y": 20 } },
    { "id": "MovePicture", "params": { "number": 1, "x": 50, "y": { "index": 0 }, "duration": 15, "easing": "easeOut" } },
    { "id": "BlendPicture", "params": { "number": 1, "opacity": 300, "blendMode": "add" } },
    { "id": "MovePicture", "params": { "number": 4, "x": 1, "y": 1, "duration": 10, "waitForCompletion": true } },
    { "id": "ShowCharacter", "params": { "number": 0 } },
    { "id": "EraseCharacter", "params": { "number": 0 } },
    { "id": "ZoomBackground", "params": { "number": 0, "zoomX": 50 } },
  ]));

  let picture = rt.scene.pictures.get(1).unwrap();
  assert!(picture.visible);
  assert_eq!(picture.graphic.as_deref(), Some("bg.png"));
  assert_eq!((picture.x, picture.y), (50., 0.));
  assert_eq!(picture.opacity, 255.);
  assert_eq!(
    picture.animation,
    Some(Animation::Blend {
      opacity: 255.,
      mode: BlendMode::Add
    })
  );
  assert!(rt.scene.characters.is_empty());
  assert!(rt.scene.backgrounds.is_empty());
  assert!(!scene.is_running);
}

#[test]
fn waiting_for_an_animation() {
  let (mut scene, mut rt) = run(json!([
    { "id": "ShowPicture", "params": { "number": 0, "duration": 2, "waitForCompletion": true } },
    { "id": "ErasePicture", "params": { "number": 0 } },
  ]));

  assert_eq!(scene.wait_counter, 2);
  assert!(rt.scene.pictures.get(0).is_some());
  scene.update(&mut rt);
  scene.update(&mut rt);
  assert_eq!(scene.update(&mut rt), Progress::Finished);
  assert!(rt.scene.pictures.is_empty());
}

#[test]
fn audio_commands() {
  let (scene, mut rt) = run(json!([
    { "id": "PlayMusic", "params": { "name": "theme", "volume": 80 } },
    { "id": "PlayMusic", "params": { "channel": 1, "name": "rain", "fadeInDuration": 30 } },
    { "id": "PlaySound", "params": { "name": "click" } },
    { "id": "StopMusic", "params": { "channel": 1, "fadeOutDuration": 20, "waitForCompletion": true } },
  ]));

  assert_eq!(
    rt.audio.channel(0),
    Some(&Track {
      name: "theme".to_string(),
      volume: 80,
      fade_in: 0
    })
  );
  assert_eq!(rt.audio.channel(1), None);
  assert_eq!(rt.audio.take_sounds(), vec!["click".to_string()]);
  assert_eq!(scene.wait_counter, 20);
}

#[test]
fn input_prompts_use_their_own_length_fields() {
  let (_, rt) = run(json!([
    { "id": "InputNumber", "params": { "variable": { "index": 0 }, "digits": 3 } },
  ]));
  assert_eq!(
    rt.message_box.content(),
    Some(&Content::Input(InputKind::Number { digits: 3 }))
  );

  let (_, rt) = run(json!([
    { "id": "InputText", "params": { "variable": { "index": 0 }, "letters": 12 } },
  ]));
  assert_eq!(
    rt.message_box.content(),
    Some(&Content::Input(InputKind::Text { letters: 12 }))
  );

  let (_, rt) = run(json!([{ "id": "InputText", "params": { "variable": { "index": 0 } } }]));
  assert_eq!(
    rt.message_box.content(),
    Some(&Content::Input(InputKind::Text { letters: 8 }))
  );
}
