use std::collections::HashMap;
use std::rc::Rc;

use derivative::Derivative;

use crate::{
  audio::Audio, command::Script, interpreter::Interpreter, message::MessageBox,
  project::Config, scene::SceneGraph, variables::Variables,
};

/// Operations an embedded script may run before it is aborted.
const SCRIPT_OPERATION_LIMIT: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct CommonEvent {
  pub id: String,
  pub name: String,
  /// Parallel events run alongside the scene instead of being called.
  pub parallel: bool,
  pub script: Rc<Script>,
}

#[derive(Debug, Clone)]
pub struct SceneDocument {
  pub uid: String,
  pub name: String,
  pub script: Rc<Script>,
}

/// Common events by id, with a count of the interpreters currently running
/// each one. An event stays active until its last interpreter finishes.
#[derive(Debug, Default)]
pub struct CommonEvents {
  events: HashMap<String, CommonEvent>,
  active: HashMap<String, usize>,
}

impl CommonEvents {
  pub fn insert(&mut self, event: CommonEvent) {
    self.events.insert(event.id.clone(), event);
  }

  pub fn get(&self, id: &str) -> Option<&CommonEvent> {
    self.events.get(id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &CommonEvent> {
    self.events.values()
  }

  pub fn is_active(&self, id: &str) -> bool {
    self.active.contains_key(id)
  }

  pub fn activate(&mut self, id: &str) {
    *self.active.entry(id.to_string()).or_default() += 1;
  }

  pub fn deactivate(&mut self, id: &str) {
    if let Some(count) = self.active.get_mut(id) {
      *count -= 1;
      if *count == 0 {
        self.active.remove(id);
      }
    }
  }
}

/// Fast-forward state. Zero skip time means waits are skipped outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Skip {
  pub enabled: bool,
  pub time: u32,
}

/// Everything outside the interpreter that commands read or mutate.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Runtime {
  pub config: Config,
  pub skip: Skip,
  pub variables: Variables,
  pub scene: SceneGraph,
  pub audio: Audio,
  pub message_box: MessageBox,
  pub common_events: CommonEvents,
  pub scenes: HashMap<String, SceneDocument>,
  #[derivative(Debug = "ignore")]
  pub script_engine: rhai::Engine,
  spawned: Vec<Interpreter>,
  scene_change: Option<String>,
}

impl Runtime {
  pub fn new(config: Config) -> Self {
    let mut script_engine = rhai::Engine::new();
    script_engine.set_max_operations(SCRIPT_OPERATION_LIMIT);
    Runtime {
      skip: Skip {
        enabled: config.skip,
        time: config.skip_time,
      },
      config,
      variables: Variables::default(),
      scene: SceneGraph::default(),
      audio: Audio::default(),
      message_box: MessageBox::default(),
      common_events: CommonEvents::default(),
      scenes: HashMap::new(),
      script_engine,
      spawned: Vec::new(),
      scene_change: None,
    }
  }

  pub fn add_scene(&mut self, scene: SceneDocument) {
    self.scenes.insert(scene.uid.clone(), scene);
  }

  /// Hands a started interpreter to the frame driver, which runs it in
  /// parallel with the scene.
  pub fn spawn(&mut self, interpreter: Interpreter) {
    self.spawned.push(interpreter);
  }

  pub fn take_spawned(&mut self) -> Vec<Interpreter> {
    std::mem::take(&mut self.spawned)
  }

  pub fn request_scene_change(&mut self, uid: &str) {
    self.scene_change = Some(uid.to_string());
  }

  pub fn take_scene_change(&mut self) -> Option<String> {
    self.scene_change.take()
  }
}

impl Default for Runtime {
  fn default() -> Self {
    Runtime::new(Config::default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn events_stay_active_until_every_run_ends() {
    let mut events = CommonEvents::default();
    events.activate("rain");
    events.activate("rain");
    events.deactivate("rain");
    assert!(events.is_active("rain"));
    events.deactivate("rain");
    assert!(!events.is_active("rain"));
    events.deactivate("rain");
    assert!(!events.is_active("rain"));
  }
}
