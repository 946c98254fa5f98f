use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::error::Result;
use crate::media::VideoFile;
use super::Transcriber;

pub const CANNED_TRANSCRIPT: &str = "This is a mock transcript of the video file. It simulates the result of speech recognition processing on the uploaded video.";

/// Returns [`CANNED_TRANSCRIPT`] for every video
pub struct CannedTranscriber {
    latency: Duration,
}

impl CannedTranscriber {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
        }
    }
}

#[async_trait]
impl Transcriber for CannedTranscriber {
    async fn transcribe(&self, video: &VideoFile) -> Result<String> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        info!("Transcribed {} ({} chars)", video.name, CANNED_TRANSCRIPT.len());
        Ok(CANNED_TRANSCRIPT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[tokio::test]
    async fn test_transcript_is_fixed() {
        let dir = assert_fs::TempDir::new().unwrap();
        let a = dir.child("a.mp4");
        let b = dir.child("b.webm");
        a.touch().unwrap();
        b.touch().unwrap();

        let transcriber = CannedTranscriber::new(0);
        let first = transcriber.transcribe(&VideoFile::open(a.path()).unwrap()).await.unwrap();
        let second = transcriber.transcribe(&VideoFile::open(b.path()).unwrap()).await.unwrap();

        assert_eq!(first, CANNED_TRANSCRIPT);
        assert_eq!(first, second);
    }
}
