use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::StageTiming;
use crate::error::Result;

/// Bytes standing in for synthesized speech.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioBuffer(Vec<u8>);

impl AudioBuffer {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Widen every UTF-16 code unit of `text` into two little-endian bytes.
    pub fn from_code_units(text: &str) -> Self {
        Self(text.encode_utf16().flat_map(u16::to_le_bytes).collect())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, target_language: &str) -> Result<AudioBuffer>;
}

/// Deterministic placeholder: the text's code units as bytes, no audio.
pub struct CodeUnitSynthesizer {
    latency: Duration,
}

impl CodeUnitSynthesizer {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
        }
    }
}

#[async_trait]
impl Synthesizer for CodeUnitSynthesizer {
    async fn synthesize(&self, text: &str, target_language: &str) -> Result<AudioBuffer> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let buffer = AudioBuffer::from_code_units(text);
        info!("Synthesized {} bytes of {} voice", buffer.len(), target_language);
        Ok(buffer)
    }
}

pub struct SynthesizerFactory;

impl SynthesizerFactory {
    pub fn create_default(timing: &StageTiming) -> Arc<dyn Synthesizer> {
        Arc::new(CodeUnitSynthesizer::new(timing.latency_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffer_is_two_bytes_per_code_unit() {
        let synth = CodeUnitSynthesizer::new(0);
        for text in ["", "abc", "Este es un texto traducido al español.", "これは日本語"] {
            let buffer = synth.synthesize(text, "es").await.unwrap();
            assert_eq!(buffer.len(), 2 * text.encode_utf16().count());
        }
    }

    #[tokio::test]
    async fn test_synthesis_is_deterministic() {
        let synth = CodeUnitSynthesizer::new(0);
        let a = synth.synthesize("Ceci est un texte", "fr").await.unwrap();
        let b = synth.synthesize("Ceci est un texte", "fr").await.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_code_units_are_little_endian_in_order() {
        let buffer = AudioBuffer::from_code_units("Aé");
        assert_eq!(buffer.as_bytes(), &[0x41, 0x00, 0xE9, 0x00]);

        // Outside the BMP: one char, two code units
        let buffer = AudioBuffer::from_code_units("😀");
        assert_eq!(buffer.as_bytes(), &[0x3D, 0xD8, 0x00, 0xDE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let synth = CodeUnitSynthesizer::new(1500);
        let started = tokio::time::Instant::now();
        synth.synthesize("hi", "es").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }
}
