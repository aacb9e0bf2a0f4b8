use std::collections::{BTreeMap, VecDeque};

/// Sound effects kept for the host before the oldest are dropped.
pub const SOUND_QUEUE_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
  pub name: String,
  pub volume: u32,
  pub fade_in: u32,
}

/// Music channels and the sound effects the host has yet to play. Playback
/// itself belongs to the host.
#[derive(Debug, Default)]
pub struct Audio {
  channels: BTreeMap<usize, Track>,
  sounds: VecDeque<String>,
}

impl Audio {
  pub fn channel(&self, channel: usize) -> Option<&Track> {
    self.channels.get(&channel)
  }

  pub fn play_music(&mut self, channel: usize, track: Track) {
    self.channels.insert(channel, track);
  }

  /// Stops a channel and returns the fade-out duration, zero if the channel
  /// was silent.
  pub fn stop_music(&mut self, channel: usize, fade_out: u32) -> u32 {
    match self.channels.remove(&channel) {
      Some(_) => fade_out,
      None => 0,
    }
  }

  pub fn play_sound(&mut self, name: &str) {
    if self.sounds.len() == SOUND_QUEUE_LIMIT {
      self.sounds.pop_front();
    }
    self.sounds.push_back(name.to_string());
  }

  /// Hands the queued sound effects to the host, oldest first.
  pub fn take_sounds(&mut self) -> Vec<String> {
    self.sounds.drain(..).collect()
  }
}
