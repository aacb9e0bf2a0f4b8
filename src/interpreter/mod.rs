//! The command interpreter.
//!
//! An `Interpreter` walks a compiled `Script` one command at a time. Block
//! structure comes from each command's indent: commands whose indent does
//! not match the interpreter's current indent are stepped over without
//! running, and falling back to a lower indent that has a registered loop
//! jumps back to the loop's first command.
//!
//! `update` is called once per frame and runs commands back to back until
//! one of them suspends the interpreter, the script ends or the interpreter
//! is stopped. Suspension takes one of four forms: a frame countdown
//! (`wait_counter`), an indefinite wait for an `ExternalEvent`
//! (`waiting_for`), a running sub-interpreter, or a message box locked by
//! an input prompt of another context.

pub mod dispatch;
mod flow;

use std::collections::BTreeMap;
use std::rc::Rc;

use derivative::Derivative;
use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};

use crate::{
  command::{Command, Operand, Script},
  context::InterpreterContext,
  error::{Error, Result},
  runtime::Runtime,
  value::Value,
  variables::VariableRef,
};

/// Synchronous calls one interpreter may have stacked above it. Each level
/// nests the callee's `update` inside the caller's.
pub const MAX_CALL_DEPTH: usize = 64;

/// Result of a single `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
  /// The interpreter has not finished, it may be running, waiting or stopped.
  Running,
  /// The script reached its end during this update.
  Finished,
}

/// What an indefinitely waiting interpreter is blocked on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WaitingFor {
  Message,
  Choice {
    labels: Vec<Option<String>>,
    variable: Option<VariableRef>,
  },
  Input {
    variable: VariableRef,
  },
  Transition,
  SubInterpreter,
}

/// Host events that release an indefinite wait.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalEvent {
  MessageDismissed,
  ChoiceSelected(usize),
  InputSubmitted(Value),
  TransitionFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSettings {
  /// Release the message box once the player dismisses a message.
  pub auto_erase: bool,
  /// Block on every message until it is dismissed.
  pub wait_at_end: bool,
}

impl Default for MessageSettings {
  fn default() -> Self {
    MessageSettings {
      auto_erase: true,
      wait_at_end: true,
    }
  }
}

/// Live-preview state, only consulted when `Config::preview` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
  /// Command to pause at. Everything before it runs as if instant skip
  /// were on.
  pub cursor: Option<usize>,
  pub waiting: bool,
  /// Commands executed since the last wait.
  pub executed_commands: usize,
}

/// Snapshot of an interpreter for save games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBundle {
  pub pointer: usize,
  pub conditions: Vec<bool>,
  pub loops: Vec<Option<usize>>,
  pub labels: BTreeMap<String, usize>,
  pub is_waiting: bool,
  pub is_running: bool,
  pub wait_counter: u32,
  pub waiting_for: Option<WaitingFor>,
  pub indent: usize,
  pub settings: MessageSettings,
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Interpreter {
  pub pointer: usize,
  pub indent: usize,
  /// Whether the if/else-if chain at each indent has matched.
  pub conditions: Vec<bool>,
  /// Pointer of the `Loop` command registered at each indent.
  pub loops: Vec<Option<usize>>,
  /// Label positions found by `jump_to_label`.
  pub labels: BTreeMap<String, usize>,
  pub is_running: bool,
  pub is_waiting: bool,
  pub wait_counter: u32,
  pub waiting_for: Option<WaitingFor>,
  pub is_waiting_for_message: bool,
  pub sub_interpreter: Option<Box<Interpreter>>,
  pub context: InterpreterContext,
  /// Contexts suspended on this interpreter, outermost first.
  callers: Vec<InterpreterContext>,
  /// Restart from the top instead of finishing.
  pub repeat: bool,
  pub settings: MessageSettings,
  pub preview: Preview,
  script: Rc<Script>,
  hold_pointer: bool,
  #[derivative(Debug = "ignore")]
  on_finish: Option<Box<dyn FnMut(&Interpreter)>>,
}

impl Interpreter {
  pub fn new(context: InterpreterContext, script: Rc<Script>) -> Self {
    Interpreter {
      pointer: 0,
      indent: 0,
      conditions: Vec::new(),
      loops: Vec::new(),
      labels: BTreeMap::new(),
      is_running: false,
      is_waiting: false,
      wait_counter: 0,
      waiting_for: None,
      is_waiting_for_message: false,
      sub_interpreter: None,
      context,
      callers: Vec::new(),
      repeat: false,
      settings: MessageSettings::default(),
      preview: Preview::default(),
      script,
      hold_pointer: false,
      on_finish: None,
    }
  }

  pub fn script(&self) -> &Rc<Script> {
    &self.script
  }

  pub fn callers(&self) -> &[InterpreterContext] {
    &self.callers
  }

  /// Called once each time the script runs to its end. Not called on `stop`.
  pub fn set_on_finish(&mut self, on_finish: impl FnMut(&Interpreter) + 'static) {
    self.on_finish = Some(Box::new(on_finish));
  }

  pub fn start(&mut self) {
    self.pointer = 0;
    self.indent = 0;
    self.conditions.clear();
    self.loops.clear();
    self.is_waiting = false;
    self.wait_counter = 0;
    self.waiting_for = None;
    self.is_waiting_for_message = false;
    self.sub_interpreter = None;
    self.hold_pointer = false;
    self.preview.executed_commands = 0;
    self.is_running = true;
  }

  pub fn stop(&mut self) {
    self.is_running = false;
  }

  pub fn resume(&mut self) {
    self.is_running = true;
  }

  /// Advances the interpreter by one frame.
  pub fn update(&mut self, rt: &mut Runtime) -> Progress {
    if self.sub_interpreter.is_some() {
      self.update_sub_interpreter(rt);
      return Progress::Running;
    }

    rt.variables.setup_temp_variables(&self.context);

    if let Some(progress) = self.check_end(rt) {
      return progress;
    }
    if !self.is_running {
      return Progress::Running;
    }

    if self.wait_counter > 0 {
      self.wait_counter -= 1;
      self.is_waiting = self.wait_counter > 0;
      return Progress::Running;
    }

    if self.is_waiting_for_message {
      if self.is_processing_message_in_other_context(rt) {
        return Progress::Running;
      }
      self.is_waiting_for_message = false;
      self.is_waiting = false;
    }

    self.run_commands(rt);
    self.check_end(rt).unwrap_or(Progress::Running)
  }

  fn run_commands(&mut self, rt: &mut Runtime) {
    let mut executed = 0;
    while !(self.is_waiting || self.preview.waiting)
      && self.pointer < self.script.len()
      && self.is_running
    {
      self.execute_command(self.pointer, rt);
      executed += 1;

      if self.is_waiting {
        self.preview.executed_commands = 0;
        continue;
      }
      if rt.config.preview {
        self.preview.executed_commands += 1;
        if self.preview.executed_commands > rt.config.preview_command_limit {
          trace!("{}: pausing preview for a frame", self.context);
          self.preview.executed_commands = 0;
          self.wait(1);
        }
      } else if rt
        .config
        .command_budget
        .is_some_and(|budget| executed >= budget)
      {
        warn!(
          "{}: {executed} commands ran without waiting, yielding until the next frame",
          self.context
        );
        self.wait(1);
      }
    }
  }

  /// Runs the command at `index` if its indent matches, then advances the
  /// pointer and settles the indent for whatever comes next.
  pub fn execute_command(&mut self, index: usize, rt: &mut Runtime) {
    let script = Rc::clone(&self.script);
    let Some(command) = script.get(index) else {
      return;
    };

    if rt.config.preview && self.preview.cursor == Some(index) {
      self.preview.cursor = None;
      self.preview.waiting = true;
      return;
    }

    if command.indent == self.indent {
      if let Some(handler) = script.handler(index) {
        if let Err(err) = handler(self, command, rt) {
          error!("{}: {} at {index} failed: {err}", self.context, command.id);
        }
      }
    }

    if std::mem::take(&mut self.hold_pointer) {
      return;
    }
    self.pointer += 1;
    self.settle_indent();
  }

  fn settle_indent(&mut self) {
    let indent = match self.script.get(self.pointer) {
      Some(next) => next.indent,
      None => {
        let mut indent = self.indent;
        while indent > 0 && self.loop_start(indent).is_none() {
          indent -= 1;
        }
        indent
      }
    };
    if indent < self.indent {
      self.indent = indent;
      if let Some(start) = self.loop_start(indent) {
        self.pointer = start;
      }
    }
  }

  fn check_end(&mut self, rt: &mut Runtime) -> Option<Progress> {
    if self.pointer < self.script.len() || self.is_waiting || !self.is_running {
      return None;
    }
    if self.repeat {
      self.start();
      return None;
    }
    Some(self.finish(rt))
  }

  fn finish(&mut self, rt: &mut Runtime) -> Progress {
    self.is_running = false;
    rt.message_box.release(&self.context);
    debug!("{}: finished", self.context);
    if let Some(mut on_finish) = self.on_finish.take() {
      on_finish(self);
      self.on_finish = Some(on_finish);
    }
    Progress::Finished
  }

  pub(crate) fn condition(&self, indent: usize) -> bool {
    self.conditions.get(indent).copied().unwrap_or(false)
  }

  pub(crate) fn set_condition(&mut self, indent: usize, value: bool) {
    if indent >= self.conditions.len() {
      self.conditions.resize(indent + 1, false);
    }
    self.conditions[indent] = value;
  }

  pub(crate) fn loop_start(&self, indent: usize) -> Option<usize> {
    self.loops.get(indent).copied().flatten()
  }

  pub(crate) fn set_loop(&mut self, indent: usize, start: Option<usize>) {
    if indent >= self.loops.len() {
      self.loops.resize(indent + 1, None);
    }
    self.loops[indent] = start;
  }

  // ---------------------------------------------------------------------
  // Waiting
  // ---------------------------------------------------------------------

  /// Suspends for `frames` updates.
  pub fn wait(&mut self, frames: u32) {
    self.wait_counter = frames;
    self.is_waiting = frames > 0;
  }

  /// Suspends until the matching `ExternalEvent` arrives through `notify`.
  pub fn wait_until(&mut self, reason: WaitingFor) {
    self.is_waiting = true;
    self.waiting_for = Some(reason);
  }

  /// Blocks for an animation's `duration` when the command asked to wait
  /// for it, unless instant skip is active.
  pub fn wait_for_completion(&mut self, duration: u32, wait_for_completion: bool, rt: &Runtime) {
    if wait_for_completion && duration != 0 && !self.is_instant_skip(rt) {
      self.is_waiting = true;
      self.wait_counter = duration;
    }
  }

  pub fn is_instant_skip(&self, rt: &Runtime) -> bool {
    let previewing = rt.config.preview
      && self
        .preview
        .cursor
        .is_some_and(|cursor| self.pointer < cursor);
    (rt.skip.enabled && rt.skip.time == 0) || previewing
  }

  pub fn is_processing_message_in_other_context(&self, rt: &Runtime) -> bool {
    rt.message_box.is_locked_against(&self.context, &self.callers)
  }

  /// Blocks until no unrelated input prompt holds the message box. The
  /// current command runs again once it is free.
  pub fn wait_for_message(&mut self) {
    self.is_waiting_for_message = true;
    self.is_waiting = true;
    self.hold_pointer = true;
  }

  pub fn clear_wait(&mut self) {
    self.is_waiting = false;
    self.wait_counter = 0;
    self.waiting_for = None;
  }

  /// The wait that blocks the innermost active interpreter, if any.
  pub fn pending_wait(&self) -> Option<&WaitingFor> {
    match &self.sub_interpreter {
      Some(child) => child.pending_wait(),
      None => self.waiting_for.as_ref(),
    }
  }

  /// Delivers a host event to the innermost active interpreter. Returns
  /// false when nothing was waiting for it.
  pub fn notify(&mut self, event: ExternalEvent, rt: &mut Runtime) -> bool {
    if let Some(child) = self.sub_interpreter.as_mut() {
      return child.notify(event, rt);
    }
    let Some(waiting_for) = self.waiting_for.clone() else {
      return false;
    };
    match (waiting_for, event) {
      (WaitingFor::Message, ExternalEvent::MessageDismissed) => {
        if self.settings.auto_erase {
          rt.message_box.erase();
        }
        self.clear_wait();
      }
      (WaitingFor::Choice { labels, variable }, ExternalEvent::ChoiceSelected(index)) => {
        if index >= labels.len() {
          return false;
        }
        if self.settings.auto_erase {
          rt.message_box.erase();
        }
        self.clear_wait();
        if let Some(variable) = &variable {
          rt.variables.set_number(&self.context, variable, index as f64);
        }
        if let Some(label) = &labels[index] {
          if let Err(err) = self.jump_to_label(label) {
            warn!("{}: choice {index}: {err}", self.context);
          }
        }
      }
      (WaitingFor::Input { variable }, ExternalEvent::InputSubmitted(value)) => {
        rt.variables.assign(&self.context, &variable, &value);
        rt.message_box.release(&self.context);
        self.clear_wait();
      }
      (WaitingFor::Transition, ExternalEvent::TransitionFinished) => self.clear_wait(),
      _ => return false,
    }
    true
  }

  // ---------------------------------------------------------------------
  // Jumps
  // ---------------------------------------------------------------------

  /// Moves the pointer to `index`, takes over that command's indent and
  /// cancels any pending wait.
  pub fn jump_to(&mut self, index: usize) {
    self.pointer = index;
    if let Some(command) = self.script.get(index) {
      self.indent = command.indent;
    }
    self.clear_wait();
  }

  pub fn jump_to_label(&mut self, name: &str) -> Result<()> {
    let index = match self.labels.get(name) {
      Some(index) => *index,
      None => {
        let index = self
          .script
          .commands()
          .iter()
          .position(|command| command.id == "Label" && command.label_name() == Some(name))
          .ok_or_else(|| Error::UnknownLabel(name.to_string()))?;
        self.labels.insert(name.to_string(), index);
        index
      }
    };
    self.jump_to(index);
    Ok(())
  }

  // ---------------------------------------------------------------------
  // Sub-interpreters
  // ---------------------------------------------------------------------

  /// Calls a common event. With `wait` the event runs as a sub-interpreter
  /// and this interpreter is suspended until it finishes; otherwise it is
  /// handed to the frame driver to run in parallel.
  pub fn call_common_event(
    &mut self,
    id: &str,
    parameters: &[Value],
    wait: bool,
    rt: &mut Runtime,
  ) -> Result<()> {
    let Some(event) = rt.common_events.get(id).cloned() else {
      warn!("{}: no common event '{id}'", self.context);
      return Ok(());
    };
    if wait {
      self.check_call_depth()?;
    }
    let context = InterpreterContext::new(event.id.clone(), Some(self.context.id.clone()));
    rt.variables.clear_local_variables(&context);
    rt.variables.set_parameters(&context, parameters);
    rt.common_events.activate(id);

    let mut child = Interpreter::new(context, event.script);
    child.start();
    if wait {
      debug!("{}: calling common event '{}'", self.context, event.name);
      self.run_sub_interpreter(child, rt);
    } else {
      debug!("{}: spawning common event '{}'", self.context, event.name);
      rt.spawn(child);
    }
    Ok(())
  }

  /// Runs another scene's script to completion before continuing.
  pub fn call_scene(&mut self, uid: &str, rt: &mut Runtime) -> Result<()> {
    let Some(scene) = rt.scenes.get(uid).cloned() else {
      warn!("{}: no scene '{uid}'", self.context);
      return Ok(());
    };
    self.check_call_depth()?;
    let mut child = Interpreter::new(
      InterpreterContext::new(scene.uid, Some(self.context.id.clone())),
      scene.script,
    );
    child.repeat = false;
    child.start();
    debug!("{}: calling scene '{}'", self.context, scene.name);
    self.run_sub_interpreter(child, rt);
    Ok(())
  }

  fn check_call_depth(&self) -> Result<()> {
    if self.callers.len() + 1 >= MAX_CALL_DEPTH {
      return Err(Error::CallDepth(MAX_CALL_DEPTH));
    }
    Ok(())
  }

  fn run_sub_interpreter(&mut self, mut child: Interpreter, rt: &mut Runtime) {
    child.callers = self.callers.clone();
    child.callers.push(self.context.clone());
    self.wait_until(WaitingFor::SubInterpreter);
    self.sub_interpreter = Some(Box::new(child));
    self.update_sub_interpreter(rt);
  }

  fn update_sub_interpreter(&mut self, rt: &mut Runtime) {
    let finished = match self.sub_interpreter.as_mut() {
      Some(child) => child.update(rt) == Progress::Finished,
      None => return,
    };
    if finished {
      if let Some(child) = self.sub_interpreter.take() {
        rt.common_events.deactivate(&child.context.id);
        debug!("{}: {} returned", self.context, child.context);
      }
      self.clear_wait();
    }
  }

  // ---------------------------------------------------------------------
  // Variables
  // ---------------------------------------------------------------------

  pub fn value_of(&self, rt: &Runtime, operand: &Operand) -> Value {
    match operand {
      Operand::Literal(value) => value.clone(),
      Operand::Variable(variable) => rt.variables.get(&self.context, variable),
    }
  }

  pub fn number_value_of(&self, rt: &Runtime, operand: &Operand) -> f64 {
    self.value_of(rt, operand).to_f64()
  }

  pub fn string_value_of(&self, rt: &Runtime, operand: &Operand) -> String {
    self.value_of(rt, operand).to_string()
  }

  pub fn boolean_value_of(&self, rt: &Runtime, operand: &Operand) -> bool {
    self.value_of(rt, operand).to_bool()
  }

  pub fn list_object_of(&self, rt: &Runtime, variable: &VariableRef) -> Vec<Value> {
    rt.variables.list(&self.context, variable)
  }

  pub fn set_number_value_to(&self, rt: &mut Runtime, variable: &VariableRef, value: f64) {
    rt.variables.set_number(&self.context, variable, value);
  }

  pub fn set_string_value_to(&self, rt: &mut Runtime, variable: &VariableRef, value: String) {
    rt.variables.set_string(&self.context, variable, value);
  }

  pub fn set_boolean_value_to(&self, rt: &mut Runtime, variable: &VariableRef, value: bool) {
    rt.variables.set_boolean(&self.context, variable, value);
  }

  pub fn set_list_object_to(&self, rt: &mut Runtime, variable: &VariableRef, value: Vec<Value>) {
    *rt.variables.list_mut(&self.context, variable) = value;
  }

  // ---------------------------------------------------------------------
  // Save games
  // ---------------------------------------------------------------------

  /// Snapshot for a save game. When the last executed command is an input
  /// prompt, the snapshot points back at it and is not waiting, so loading
  /// shows the prompt again.
  pub fn to_data_bundle(&self) -> DataBundle {
    let previous = self.pointer.saturating_sub(1);
    let rewind = self.script.get(previous).is_some_and(Command::is_input_prompt);
    let (pointer, is_waiting, waiting_for) = if rewind {
      (previous, false, None)
    } else if self.is_waiting_for_message {
      (self.pointer, false, None)
    } else {
      (self.pointer, self.is_waiting, self.waiting_for.clone())
    };
    DataBundle {
      pointer,
      conditions: self.conditions.clone(),
      loops: self.loops.clone(),
      labels: self.labels.clone(),
      is_waiting,
      is_running: self.is_running,
      wait_counter: self.wait_counter,
      waiting_for,
      indent: self.indent,
      settings: self.settings,
    }
  }

  /// Applies a snapshot taken by `to_data_bundle`. A sub-interpreter that
  /// was running at save time is not part of the snapshot, so a wait on it
  /// is dropped.
  pub fn restore(&mut self, bundle: DataBundle) {
    self.pointer = bundle.pointer;
    self.conditions = bundle.conditions;
    self.loops = bundle.loops;
    self.labels = bundle.labels;
    self.is_waiting = bundle.is_waiting;
    self.is_running = bundle.is_running;
    self.wait_counter = bundle.wait_counter;
    self.waiting_for = bundle.waiting_for;
    self.indent = bundle.indent;
    self.settings = bundle.settings;
    self.is_waiting_for_message = false;
    self.hold_pointer = false;
    self.sub_interpreter = None;
    if self.waiting_for == Some(WaitingFor::SubInterpreter) {
      self.clear_wait();
    }
  }
}
