use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
  command::{Command, Script},
  context::InterpreterContext,
  error::{Error, Result},
  interpreter::{ExternalEvent, Interpreter, Progress, WaitingFor},
  runtime::{CommonEvent, Runtime, SceneDocument},
  scene::SceneGraph,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
  pub frame_rate: u32,
  /// Commands one interpreter may run in a single tick before it is forced
  /// to yield. `None` disables the limit.
  pub command_budget: Option<usize>,
  pub preview: bool,
  pub preview_command_limit: usize,
  pub skip: bool,
  /// Frames a skipped wait still takes. Zero skips waits outright.
  pub skip_time: u32,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      frame_rate: 60,
      command_budget: Some(10_000),
      preview: false,
      preview_command_limit: 500,
      skip: false,
      skip_time: 0,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct SceneSource {
  pub uid: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub commands: Vec<Command>,
}

#[derive(Debug, Deserialize)]
pub struct CommonEventSource {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub parallel: bool,
  #[serde(default)]
  pub commands: Vec<Command>,
}

/// A project file: configuration, scenes and common events.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
  pub config: Config,
  pub scenes: Vec<SceneSource>,
  pub common_events: Vec<CommonEventSource>,
  /// Scene to start with, the first scene when missing.
  pub start_scene: Option<String>,
}

impl FromStr for Project {
  type Err = Error;

  fn from_str(json: &str) -> Result<Project> {
    Ok(serde_json::from_str(json)?)
  }
}

impl Project {
  pub fn load(path: impl AsRef<Path>) -> Result<Project> {
    std::fs::read_to_string(path)?.parse()
  }
}

/// Frame driver. Owns the runtime, the interpreter of the current scene
/// and every common event running in parallel with it.
#[derive(Debug)]
pub struct Game {
  pub runtime: Runtime,
  pub main: Interpreter,
  pub parallel: Vec<Interpreter>,
}

impl Game {
  pub fn new(project: Project) -> Result<Game> {
    let mut runtime = Runtime::new(project.config);

    let start = match project.start_scene {
      Some(uid) => uid,
      None => project
        .scenes
        .first()
        .map(|scene| scene.uid.clone())
        .ok_or(Error::EmptyProject)?,
    };
    for scene in project.scenes {
      runtime.add_scene(SceneDocument {
        uid: scene.uid,
        name: scene.name,
        script: Rc::new(Script::compile(scene.commands)?),
      });
    }
    for event in project.common_events {
      runtime.common_events.insert(CommonEvent {
        id: event.id,
        name: event.name,
        parallel: event.parallel,
        script: Rc::new(Script::compile(event.commands)?),
      });
    }

    let main = scene_interpreter(&runtime, &start)?;
    let mut parallel = Vec::new();
    let events: Vec<CommonEvent> = runtime
      .common_events
      .iter()
      .filter(|event| event.parallel)
      .cloned()
      .collect();
    for event in events {
      let mut interpreter = Interpreter::new(
        InterpreterContext::new(event.id.clone(), None),
        event.script,
      );
      interpreter.repeat = true;
      interpreter.start();
      runtime.common_events.activate(&event.id);
      parallel.push(interpreter);
    }

    info!("starting scene '{start}'");
    Ok(Game {
      runtime,
      main,
      parallel,
    })
  }

  /// Runs one frame: the scene first, then every parallel interpreter.
  /// Interpreters spawned during the frame start running on the next one.
  pub fn tick(&mut self) -> Progress {
    let progress = self.main.update(&mut self.runtime);

    let runtime = &mut self.runtime;
    self.parallel.retain_mut(|interpreter| {
      if interpreter.update(runtime) == Progress::Finished {
        runtime.common_events.deactivate(&interpreter.context.id);
        debug!("{}: parallel event done", interpreter.context);
        return false;
      }
      true
    });
    self.parallel.extend(self.runtime.take_spawned());

    if let Some(uid) = self.runtime.take_scene_change() {
      self.change_scene(&uid);
    }
    progress
  }

  fn change_scene(&mut self, uid: &str) {
    match scene_interpreter(&self.runtime, uid) {
      Ok(main) => {
        info!("changing scene to '{uid}'");
        self.runtime.message_box.release(&self.main.context);
        self.runtime.message_box.erase();
        self.runtime.variables.clear_local_variables(&self.main.context);
        self.runtime.scene = SceneGraph::default();
        self.main = main;
        for interpreter in &mut self.parallel {
          interpreter.notify(ExternalEvent::TransitionFinished, &mut self.runtime);
        }
      }
      Err(err) => {
        warn!("{err}");
        self.notify(ExternalEvent::TransitionFinished);
      }
    }
  }

  /// Delivers a host event to the scene, then to parallel interpreters,
  /// until one of them accepts it.
  pub fn notify(&mut self, event: ExternalEvent) -> bool {
    if self.main.notify(event.clone(), &mut self.runtime) {
      return true;
    }
    for interpreter in &mut self.parallel {
      if interpreter.notify(event.clone(), &mut self.runtime) {
        return true;
      }
    }
    false
  }

  pub fn pending_wait(&self) -> Option<&WaitingFor> {
    self
      .main
      .pending_wait()
      .or_else(|| self.parallel.iter().find_map(Interpreter::pending_wait))
  }

  pub fn is_finished(&self) -> bool {
    !self.main.is_running && self.main.sub_interpreter.is_none()
  }
}

fn scene_interpreter(runtime: &Runtime, uid: &str) -> Result<Interpreter> {
  let scene = runtime
    .scenes
    .get(uid)
    .ok_or_else(|| Error::MissingScene(uid.to_string()))?;
  let mut interpreter = Interpreter::new(
    InterpreterContext::new(scene.uid.clone(), None),
    Rc::clone(&scene.script),
  );
  interpreter.start();
  Ok(interpreter)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn config_defaults() {
    let project: Project = r#"{ "config": { "frameRate": 30, "commandBudget": null } }"#
      .parse()
      .unwrap();
    assert_eq!(
      project.config,
      Config {
        frame_rate: 30,
        command_budget: None,
        ..Config::default()
      }
    );
  }

  #[test]
  fn empty_projects_are_rejected() {
    let project: Project = "{}".parse().unwrap();
    assert!(matches!(Game::new(project), Err(Error::EmptyProject)));
  }

  #[test]
  fn unknown_start_scene_is_rejected() {
    let project: Project = r#"{ "scenes": [{ "uid": "a" }], "startScene": "b" }"#
      .parse()
      .unwrap();
    assert!(matches!(Game::new(project), Err(Error::MissingScene(uid)) if uid == "b"));
  }
}
