//! Scene-graph collaborators the interpreter drives.
//!
//! Objects do not tween here; each animator call applies its end state and
//! reports how many frames the animation takes, which is all a script needs
//! to decide whether to wait.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
  #[default]
  Linear,
  EaseIn,
  EaseOut,
  EaseInOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlendMode {
  #[default]
  Normal,
  Add,
  Subtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
  Picture,
  Character,
  Background,
  Video,
  Text,
  Hotspot,
}

/// The last animation started on an object.
#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
  Appear,
  Disappear,
  Move { x: f64, y: f64 },
  Zoom { x: f64, y: f64 },
  Tint([i32; 4]),
  Blend { opacity: f64, mode: BlendMode },
  Shake { range: f64, speed: f64 },
  Mask(Option<String>),
  Effect(String),
}

/// Anything a content command can animate. Every method returns the
/// animation's duration in frames.
pub trait Animator {
  fn appear(&mut self, duration: u32, easing: Easing) -> u32;
  fn disappear(&mut self, duration: u32, easing: Easing) -> u32;
  fn move_to(&mut self, x: f64, y: f64, duration: u32, easing: Easing) -> u32;
  fn zoom_to(&mut self, x: f64, y: f64, duration: u32, easing: Easing) -> u32;
  fn tint_to(&mut self, tone: [i32; 4], duration: u32, easing: Easing) -> u32;
  fn blend_to(&mut self, opacity: f64, mode: BlendMode, duration: u32, easing: Easing) -> u32;
  fn shake(&mut self, range: f64, speed: f64, duration: u32) -> u32;
  fn mask_to(&mut self, mask: Option<String>, duration: u32) -> u32;
  fn effect(&mut self, name: &str, duration: u32) -> u32;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
  pub graphic: Option<String>,
  pub visible: bool,
  pub x: f64,
  pub y: f64,
  pub zoom_x: f64,
  pub zoom_y: f64,
  pub opacity: f64,
  pub blend_mode: BlendMode,
  pub tone: [i32; 4],
  pub mask: Option<String>,
  pub easing: Easing,
  pub animation: Option<Animation>,
}

impl Default for SceneObject {
  fn default() -> Self {
    SceneObject {
      graphic: None,
      visible: false,
      x: 0.,
      y: 0.,
      zoom_x: 100.,
      zoom_y: 100.,
      opacity: 255.,
      blend_mode: BlendMode::Normal,
      tone: [0; 4],
      mask: None,
      easing: Easing::Linear,
      animation: None,
    }
  }
}

impl SceneObject {
  fn animate(&mut self, animation: Animation, duration: u32, easing: Easing) -> u32 {
    self.animation = Some(animation);
    self.easing = easing;
    duration
  }
}

impl Animator for SceneObject {
  fn appear(&mut self, duration: u32, easing: Easing) -> u32 {
    self.visible = true;
    self.animate(Animation::Appear, duration, easing)
  }

  fn disappear(&mut self, duration: u32, easing: Easing) -> u32 {
    self.visible = false;
    self.animate(Animation::Disappear, duration, easing)
  }

  fn move_to(&mut self, x: f64, y: f64, duration: u32, easing: Easing) -> u32 {
    self.x = x;
    self.y = y;
    self.animate(Animation::Move { x, y }, duration, easing)
  }

  fn zoom_to(&mut self, x: f64, y: f64, duration: u32, easing: Easing) -> u32 {
    self.zoom_x = x;
    self.zoom_y = y;
    self.animate(Animation::Zoom { x, y }, duration, easing)
  }

  fn tint_to(&mut self, tone: [i32; 4], duration: u32, easing: Easing) -> u32 {
    self.tone = tone;
    self.animate(Animation::Tint(tone), duration, easing)
  }

  fn blend_to(&mut self, opacity: f64, mode: BlendMode, duration: u32, easing: Easing) -> u32 {
    self.opacity = opacity.clamp(0., 255.);
    self.blend_mode = mode;
    self.animate(
      Animation::Blend {
        opacity: self.opacity,
        mode,
      },
      duration,
      easing,
    )
  }

  fn shake(&mut self, range: f64, speed: f64, duration: u32) -> u32 {
    self.animate(Animation::Shake { range, speed }, duration, Easing::Linear)
  }

  fn mask_to(&mut self, mask: Option<String>, duration: u32) -> u32 {
    self.mask = mask.clone();
    self.animate(Animation::Mask(mask), duration, Easing::Linear)
  }

  fn effect(&mut self, name: &str, duration: u32) -> u32 {
    self.animate(Animation::Effect(name.to_string()), duration, Easing::Linear)
  }
}

/// Objects of one kind, addressed by numeric slot. Slots are sparse, any
/// number is valid.
#[derive(Debug, Default)]
pub struct ObjectContainer {
  slots: BTreeMap<usize, SceneObject>,
}

impl ObjectContainer {
  pub fn get(&self, number: usize) -> Option<&SceneObject> {
    self.slots.get(&number)
  }

  pub fn get_mut(&mut self, number: usize) -> Option<&mut SceneObject> {
    self.slots.get_mut(&number)
  }

  pub fn get_or_create(&mut self, number: usize) -> &mut SceneObject {
    self.slots.entry(number).or_default()
  }

  pub fn remove(&mut self, number: usize) -> Option<SceneObject> {
    self.slots.remove(&number)
  }

  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }
}

#[derive(Debug, Default)]
pub struct SceneGraph {
  pub pictures: ObjectContainer,
  pub characters: ObjectContainer,
  pub backgrounds: ObjectContainer,
  pub videos: ObjectContainer,
  pub texts: ObjectContainer,
  pub hotspots: ObjectContainer,
  /// Screen-level shake, used by `ShakeScreen`.
  pub screen: SceneObject,
}

impl SceneGraph {
  pub fn container(&self, kind: ObjectKind) -> &ObjectContainer {
    match kind {
      ObjectKind::Picture => &self.pictures,
      ObjectKind::Character => &self.characters,
      ObjectKind::Background => &self.backgrounds,
      ObjectKind::Video => &self.videos,
      ObjectKind::Text => &self.texts,
      ObjectKind::Hotspot => &self.hotspots,
    }
  }

  pub fn container_mut(&mut self, kind: ObjectKind) -> &mut ObjectContainer {
    match kind {
      ObjectKind::Picture => &mut self.pictures,
      ObjectKind::Character => &mut self.characters,
      ObjectKind::Background => &mut self.backgrounds,
      ObjectKind::Video => &mut self.videos,
      ObjectKind::Text => &mut self.texts,
      ObjectKind::Hotspot => &mut self.hotspots,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn containers_grow_on_demand() {
    let mut graph = SceneGraph::default();
    let picture = graph.container_mut(ObjectKind::Picture).get_or_create(3);
    assert_eq!(picture.appear(20, Easing::EaseIn), 20);
    assert!(graph.pictures.get(3).is_some_and(|picture| picture.visible));
    assert!(graph.pictures.get(0).is_none());
    assert_eq!(graph.pictures.len(), 1);
  }

  #[test]
  fn distant_slots_do_not_allocate_the_gap() {
    let mut container = ObjectContainer::default();
    container.get_or_create(usize::MAX).appear(0, Easing::Linear);
    assert_eq!(container.len(), 1);
    assert!(container.remove(usize::MAX).is_some());
    assert!(container.is_empty());
  }

  #[test]
  fn blend_clamps_opacity() {
    let mut object = SceneObject::default();
    object.blend_to(400., BlendMode::Add, 0, Easing::Linear);
    assert_eq!(object.opacity, 255.);
    assert_eq!(object.blend_mode, BlendMode::Add);
  }
}
