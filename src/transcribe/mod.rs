// Transcription providers
//
// The pipeline only talks to the Transcriber trait. The canned implementation
// returns a fixed transcript; a real speech recognizer would plug in here
// without touching the orchestrator.

pub mod canned;

use async_trait::async_trait;
use std::sync::Arc;

pub use canned::*;
use crate::config::StageTiming;
use crate::error::Result;
use crate::media::VideoFile;

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Produce the spoken text of a video
    async fn transcribe(&self, video: &VideoFile) -> Result<String>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_default(timing: &StageTiming) -> Arc<dyn Transcriber> {
        Arc::new(CannedTranscriber::new(timing.latency_ms))
    }
}
