use tracing::debug;

use super::MediaHandle;
use crate::synthesize::AudioBuffer;

/// Result of the mixing stage: the synthesized buffer behind a playable handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedAudio {
    pub buffer: AudioBuffer,
    pub media_type: &'static str,
    pub handle: MediaHandle,
}

impl MixedAudio {
    pub fn new(buffer: AudioBuffer) -> Self {
        Self {
            buffer,
            media_type: "audio/wav",
            handle: MediaHandle::mint(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Original,
    Translated,
}

/// Mix levels, 0-100. Recorded but never applied to any signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixSettings {
    pub original_volume: u8,
    pub translated_volume: u8,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            original_volume: 50,
            translated_volume: 50,
        }
    }
}

impl MixSettings {
    pub fn set_volume(&mut self, track: Track, value: u8) {
        let value = value.min(100);
        match track {
            Track::Original => self.original_volume = value,
            Track::Translated => self.translated_volume = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Transport controls over a [`MixedAudio`].
#[derive(Debug, Clone)]
pub struct Playback {
    audio: MixedAudio,
    state: PlaybackState,
}

impl Playback {
    pub fn new(audio: MixedAudio) -> Self {
        Self {
            audio,
            state: PlaybackState::Stopped,
        }
    }

    pub fn audio(&self) -> &MixedAudio {
        &self.audio
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Play when stopped or paused, pause when playing.
    pub fn toggle(&mut self) -> PlaybackState {
        self.state = match self.state {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Stopped | PlaybackState::Paused => PlaybackState::Playing,
        };
        debug!("Playback of {} is now {:?}", self.audio.handle, self.state);
        self.state
    }

    /// Rewind to the start and stop.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Stopped;
    }
}
