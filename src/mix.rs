use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::StageTiming;
use crate::error::Result;
use crate::media::{MixSettings, MixedAudio, VideoFile};
use crate::synthesize::AudioBuffer;

/// Blends synthesized speech with the original soundtrack
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mixer: Send + Sync {
    async fn mix(
        &self,
        synthesized: &AudioBuffer,
        original: &VideoFile,
        settings: MixSettings,
    ) -> Result<MixedAudio>;
}

/// Republishes the synthesized buffer unchanged. The original track is never
/// decoded and the volume settings are ignored.
pub struct PassthroughMixer {
    latency: Duration,
}

impl PassthroughMixer {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
        }
    }
}

#[async_trait]
impl Mixer for PassthroughMixer {
    async fn mix(
        &self,
        synthesized: &AudioBuffer,
        original: &VideoFile,
        settings: MixSettings,
    ) -> Result<MixedAudio> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        info!(
            "Mixed {} bytes over {} (levels {}/{} not applied)",
            synthesized.len(),
            original.name,
            settings.original_volume,
            settings.translated_volume
        );
        Ok(MixedAudio::new(synthesized.clone()))
    }
}

pub struct MixerFactory;

impl MixerFactory {
    pub fn create_default(timing: &StageTiming) -> Arc<dyn Mixer> {
        Arc::new(PassthroughMixer::new(timing.latency_ms))
    }
}
