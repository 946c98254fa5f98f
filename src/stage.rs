//! Stage identities, checkpoint progress and the simulated work ticker.
//!
//! Every stage "works" by advancing a 0-100 counter on a fixed timer. The
//! [`Ticker`] drives that counter and stops early when its run is cancelled.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::StageTiming;
use crate::error::{RedubError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Transcription,
    Translation,
    Synthesis,
    Mixing,
    Export,
}

impl Stage {
    /// Stages in pipeline order.
    pub const ALL: [Stage; 5] = [
        Stage::Transcription,
        Stage::Translation,
        Stage::Synthesis,
        Stage::Mixing,
        Stage::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Transcription => "transcription",
            Stage::Translation => "translation",
            Stage::Synthesis => "synthesis",
            Stage::Mixing => "mixing",
            Stage::Export => "export",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Stage::Transcription => "Failed to process video file. Please try again.",
            Stage::Translation => "Translation failed. Please try again.",
            Stage::Synthesis => "Voice synthesis failed. Please try again.",
            Stage::Mixing => "Failed to mix audio. Please try again.",
            Stage::Export => "Failed to process download. Please try again.",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline-wide completion, distinct from a stage's own 0-100 counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Checkpoint {
    #[default]
    Start,
    Transcribed,
    Translated,
    Synthesized,
    Mixed,
}

impl Checkpoint {
    pub fn percent(&self) -> u8 {
        match self {
            Checkpoint::Start => 0,
            Checkpoint::Transcribed => 25,
            Checkpoint::Translated => 50,
            Checkpoint::Synthesized => 75,
            Checkpoint::Mixed => 100,
        }
    }
}

/// Progress notification re-broadcast to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started(Stage),
    Advanced { stage: Stage, percent: u8 },
    Finished(Stage),
    Failed { stage: Stage, message: &'static str },
    Overall(u8),
}

/// Stage-local view: running flag, 0-100 counter, last stage error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageStatus {
    pub running: bool,
    pub progress: u8,
    pub error: Option<&'static str>,
}

/// Fixed-step simulated work.
#[derive(Debug, Clone)]
pub struct Ticker {
    stage: Stage,
    timing: StageTiming,
}

impl Ticker {
    pub fn new(stage: Stage, timing: StageTiming) -> Self {
        Self { stage, timing }
    }

    /// Percent values visited by one run, e.g. `0, 10, ..., 100`.
    /// A step that does not divide 100 still finishes on 100.
    pub fn steps(&self) -> impl Iterator<Item = u8> {
        let step = self.timing.step.clamp(1, 100);
        let tail = (100 % step != 0).then_some(100);
        (0..=100u8).step_by(step as usize).chain(tail)
    }

    /// Sleep one tick per step and report each percent.
    ///
    /// Returns `RedubError::Cancelled` as soon as `token` fires.
    pub async fn run<F>(&self, token: &CancellationToken, mut on_progress: F) -> Result<()>
    where
        F: FnMut(u8),
    {
        let tick = Duration::from_millis(self.timing.tick_ms);
        for percent in self.steps() {
            tokio::select! {
                _ = token.cancelled() => return Err(RedubError::Cancelled(self.stage)),
                _ = tokio::time::sleep(tick) => {}
            }
            debug!("{} progress {}%", self.stage, percent);
            on_progress(percent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(step: u8, tick_ms: u64) -> StageTiming {
        StageTiming {
            step,
            tick_ms,
            latency_ms: 0,
        }
    }

    #[test]
    fn test_checkpoint_percentages() {
        let percents: Vec<u8> = [
            Checkpoint::Start,
            Checkpoint::Transcribed,
            Checkpoint::Translated,
            Checkpoint::Synthesized,
            Checkpoint::Mixed,
        ]
        .iter()
        .map(Checkpoint::percent)
        .collect();
        assert_eq!(percents, vec![0, 25, 50, 75, 100]);
        assert!(Checkpoint::Translated > Checkpoint::Transcribed);
    }

    #[test]
    fn test_ticker_steps() {
        let ticker = Ticker::new(Stage::Transcription, timing(10, 500));
        let steps: Vec<u8> = ticker.steps().collect();
        assert_eq!(steps.len(), 11);
        assert_eq!(steps.first(), Some(&0));
        assert_eq!(steps.last(), Some(&100));

        let ticker = Ticker::new(Stage::Synthesis, timing(5, 100));
        assert_eq!(ticker.steps().count(), 21);
    }

    #[test]
    fn test_uneven_step_still_reaches_100() {
        let ticker = Ticker::new(Stage::Export, timing(30, 100));
        let steps: Vec<u8> = ticker.steps().collect();
        assert_eq!(steps, vec![0, 30, 60, 90, 100]);

        let ticker = Ticker::new(Stage::Export, timing(0, 100));
        assert_eq!(ticker.steps().count(), 101);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_reports_every_step() {
        let ticker = Ticker::new(Stage::Translation, timing(10, 200));
        let token = CancellationToken::new();
        let mut seen = Vec::new();
        let started = tokio::time::Instant::now();

        ticker.run(&token, |p| seen.push(p)).await.unwrap();

        assert_eq!(seen, (0..=100).step_by(10).collect::<Vec<u8>>());
        assert!(started.elapsed() >= Duration::from_millis(2200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_when_cancelled() {
        let ticker = Ticker::new(Stage::Mixing, timing(5, 100));
        let token = CancellationToken::new();
        token.cancel();

        let mut seen = Vec::new();
        let result = ticker.run(&token, |p| seen.push(p)).await;

        assert!(matches!(result, Err(RedubError::Cancelled(Stage::Mixing))));
        assert!(seen.is_empty());
    }
}
