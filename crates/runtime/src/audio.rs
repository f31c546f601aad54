use serde::{Deserialize, Serialize};

/// Clips the controller asks the audio source to play.
///
/// The host maps each cue to an actual asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Looping tone while charging.
    Charge,
    /// One-shot sound on release.
    Fire,
}

/// A single positional audio source.
///
/// Setting the clip does not start playback; call [`AudioSink::play`].
pub trait AudioSink {
    fn set_clip(&mut self, cue: SoundCue);
    /// Volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    /// Start the current clip from the beginning.
    fn play(&mut self);
    fn is_playing(&self) -> bool;
}
