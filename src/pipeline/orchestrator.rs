//! Pipeline orchestrator: drives video → transcript → translation → synthesis → mix.
//!
//! [`Orchestrator`] owns the [`PipelineState`]. Every stage run is a spawned
//! tokio task that ticks its own 0-100 counter, calls its provider and reports
//! back over one `mpsc` channel. The orchestrator applies the result and
//! starts whatever stage depends on it.
//!
//! # Pipeline flow
//!
//! ```text
//! select_video ──▶ Transcription ──▶ Translation ──▶ Synthesis ──▶ Mixing
//!                       25%              50%            75%         100%
//! set_target_language ──────────────▶ Translation
//! export / save / load: manual only
//! ```
//!
//! Each run is tagged with a sequence number. Starting a stage again cancels
//! the previous run, and any result whose sequence number is no longer current
//! is dropped, so a slow stale run can never overwrite a newer one.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{RedubError, Result};
use crate::export::{ExportArtifact, Exporter};
use crate::media::{MixedAudio, Playback, PlaybackState, Track, VideoFile};
use crate::mix::{Mixer, MixerFactory};
use crate::project::{Project, ProjectStore};
use crate::stage::{ProgressEvent, Stage, StageStatus, Ticker};
use crate::synthesize::{AudioBuffer, Synthesizer, SynthesizerFactory};
use crate::transcribe::{Transcriber, TranscriberFactory};
use crate::translate::{Translator, TranslatorFactory};

use super::state::PipelineState;

/// The implementations behind each processing stage.
#[derive(Clone)]
pub struct Providers {
    pub transcriber: Arc<dyn Transcriber>,
    pub translator: Arc<dyn Translator>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub mixer: Arc<dyn Mixer>,
}

impl Providers {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            transcriber: TranscriberFactory::create_default(&config.stages.transcription),
            translator: TranslatorFactory::create_translator(
                &config.translate,
                &config.stages.translation,
            )?,
            synthesizer: SynthesizerFactory::create_default(&config.stages.synthesis),
            mixer: MixerFactory::create_default(&config.stages.mixing),
        })
    }
}

#[derive(Debug)]
enum StageOutput {
    Transcript(String),
    Translation(String),
    Synthesized(AudioBuffer),
    Mixed(MixedAudio),
}

#[derive(Debug)]
enum StageEvent {
    Progress { stage: Stage, seq: u64, percent: u8 },
    Finished { stage: Stage, seq: u64, result: Result<StageOutput> },
}

type StageJob = Pin<Box<dyn Future<Output = Result<StageOutput>> + Send>>;

struct Run {
    seq: u64,
    token: CancellationToken,
}

pub struct Orchestrator {
    config: Config,
    providers: Providers,
    exporter: Exporter,
    state: PipelineState,
    board: BTreeMap<Stage, StageStatus>,
    runs: HashMap<Stage, Run>,
    next_seq: u64,
    events_tx: mpsc::UnboundedSender<StageEvent>,
    events_rx: mpsc::UnboundedReceiver<StageEvent>,
    progress_tx: broadcast::Sender<ProgressEvent>,
}

impl Orchestrator {
    pub fn new(config: Config, providers: Providers) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (progress_tx, _) = broadcast::channel(256);
        let exporter = Exporter::new(&config.export, &config.stages.export);
        let state = PipelineState::new(&config.pipeline.default_target_language);

        Self {
            config,
            providers,
            exporter,
            state,
            board: BTreeMap::new(),
            runs: HashMap::new(),
            next_seq: 0,
            events_tx,
            events_rx,
            progress_tx,
        }
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let providers = Providers::from_config(&config)?;
        Ok(Self::new(config, providers))
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn stage_status(&self, stage: Stage) -> StageStatus {
        self.board.get(&stage).cloned().unwrap_or_default()
    }

    /// Progress notifications for every stage and the overall checkpoint.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress_tx.subscribe()
    }

    /// `true` when no stage run is in flight.
    pub fn is_idle(&self) -> bool {
        self.runs.is_empty()
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    /// Ingest a video. On rejection only the error message changes.
    pub fn select_video<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let video = match VideoFile::open(path) {
            Ok(video) => video,
            Err(e) => {
                warn!("Rejected video: {}", e);
                self.state.fail(e.user_message());
                return Err(e);
            }
        };

        self.cancel_all();
        self.state.select_video(video);
        self.broadcast(ProgressEvent::Overall(self.state.progress()));
        self.start(Stage::Transcription);
        Ok(())
    }

    /// Change the target language and re-run translation, or synthesis when
    /// there is translated text but no transcript to translate.
    pub fn set_target_language(&mut self, code: &str) {
        info!("Target language set to {}", code);
        self.state.target_language = code.to_string();
        if !self.start(Stage::Translation) {
            self.start(Stage::Synthesis);
        }
    }

    pub fn set_volume(&mut self, track: Track, value: u8) {
        self.state.mix_settings.set_volume(track, value);
    }

    /// Manually re-run a processing stage. Returns `false` when its input is
    /// missing. Export has its own entry point, [`Orchestrator::export`].
    pub fn rerun(&mut self, stage: Stage) -> bool {
        if stage == Stage::Export {
            return false;
        }
        self.start(stage)
    }

    pub fn playback(&self) -> Option<&Playback> {
        self.state.playback.as_ref()
    }

    /// Play or pause the current mix. `None` until mixing has finished.
    pub fn toggle_playback(&mut self) -> Option<PlaybackState> {
        self.state.playback.as_mut().map(Playback::toggle)
    }

    pub fn reset_playback(&mut self) -> bool {
        match self.state.playback.as_mut() {
            Some(playback) => {
                playback.reset();
                true
            }
            None => false,
        }
    }

    pub fn can_export(&self) -> bool {
        Exporter::is_available(self.state.synthesized.as_ref(), self.state.video.as_ref())
    }

    pub async fn export(&mut self, out_dir: &Path) -> Result<ExportArtifact> {
        let stage = Stage::Export;
        self.board.insert(stage, StageStatus { running: true, ..Default::default() });
        self.broadcast(ProgressEvent::Started(stage));

        let progress_tx = self.progress_tx.clone();
        let token = CancellationToken::new();
        let result = self
            .exporter
            .export(
                &self.state.translated_text,
                self.state.synthesized.as_ref(),
                self.state.video.as_ref(),
                out_dir,
                &token,
                |percent| {
                    let _ = progress_tx.send(ProgressEvent::Advanced { stage, percent });
                },
            )
            .await;

        match result {
            Ok(artifact) => {
                self.board.insert(stage, StageStatus::default());
                self.broadcast(ProgressEvent::Finished(stage));
                Ok(artifact)
            }
            Err(e) => {
                self.fail_stage(stage, &e);
                Err(e)
            }
        }
    }

    pub async fn save_project(&mut self, store: &mut ProjectStore, name: &str) -> Result<String> {
        let project = self.state.to_project(name);
        match store.save(&project).await {
            Ok(key) => {
                self.state.error = None;
                Ok(key)
            }
            Err(e) => {
                warn!("Failed to save project: {}", e);
                self.state.fail(e.user_message());
                Err(e)
            }
        }
    }

    pub async fn load_project_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        match Project::load_file(path).await {
            Ok(project) => {
                self.load_project(project);
                Ok(())
            }
            Err(e) => {
                self.state.fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Replace all pipeline state with a loaded project and carry on from
    /// its transcript, or from its translation when there is no transcript.
    /// The video reference is re-attached only if it still names a readable
    /// video.
    pub fn load_project(&mut self, project: Project) {
        let video = project.video_file.as_deref().and_then(|reference| {
            VideoFile::open(reference)
                .map_err(|e| warn!("Project video '{}' not attached: {}", reference, e))
                .ok()
        });

        self.cancel_all();
        info!("Loading project '{}'", project.name);
        self.state.load_project(project, video);
        self.broadcast(ProgressEvent::Overall(self.state.progress()));
        if !self.start(Stage::Translation) {
            self.start(Stage::Synthesis);
        }
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    /// Apply stage events until nothing is in flight.
    pub async fn settle(&mut self) {
        while !self.runs.is_empty() {
            if !self.step().await {
                break;
            }
        }
    }

    /// Wait for and apply one stage event.
    pub async fn step(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, event: StageEvent) {
        match event {
            StageEvent::Progress { stage, seq, percent } => {
                if self.is_current(stage, seq) {
                    self.board.entry(stage).or_default().progress = percent;
                    self.broadcast(ProgressEvent::Advanced { stage, percent });
                }
            }
            StageEvent::Finished { stage, seq, result } => {
                if !self.is_current(stage, seq) {
                    warn!("Discarding stale {} result from run #{}", stage, seq);
                    return;
                }
                self.runs.remove(&stage);

                match result {
                    Ok(output) => {
                        info!("{} run #{} finished", stage, seq);
                        self.board.insert(stage, StageStatus::default());
                        self.broadcast(ProgressEvent::Finished(stage));
                        self.apply_output(output);
                        self.broadcast(ProgressEvent::Overall(self.state.progress()));
                    }
                    Err(e) => self.fail_stage(stage, &e),
                }
            }
        }
    }

    fn apply_output(&mut self, output: StageOutput) {
        match output {
            StageOutput::Transcript(transcript) => {
                let changed = transcript != self.state.transcript;
                self.state.set_transcript(transcript);
                if changed || self.state.translated_text.is_empty() {
                    self.start(Stage::Translation);
                }
            }
            StageOutput::Translation(text) => {
                let changed = text != self.state.translated_text;
                self.state.set_translation(text);
                if changed || self.state.synthesized.is_none() {
                    self.start(Stage::Synthesis);
                }
            }
            StageOutput::Synthesized(buffer) => {
                let changed = self.state.synthesized.as_ref() != Some(&buffer);
                self.state.set_synthesized(buffer);
                if changed || self.state.mixed.is_none() {
                    self.start(Stage::Mixing);
                }
            }
            StageOutput::Mixed(mixed) => self.state.set_mixed(mixed),
        }
    }

    fn fail_stage(&mut self, stage: Stage, error: &RedubError) {
        let message = error.user_message();
        warn!("{} failed: {}", stage, error);
        self.state.fail(message);
        self.board.insert(stage, StageStatus { running: false, progress: 0, error: Some(message) });
        self.broadcast(ProgressEvent::Failed { stage, message });
    }

    // -----------------------------------------------------------------------
    // Runs
    // -----------------------------------------------------------------------

    fn is_current(&self, stage: Stage, seq: u64) -> bool {
        self.runs.get(&stage).is_some_and(|run| run.seq == seq)
    }

    fn cancel(&mut self, stage: Stage) {
        if let Some(run) = self.runs.remove(&stage) {
            debug!("Cancelling {} run #{}", stage, run.seq);
            run.token.cancel();
        }
    }

    fn cancel_all(&mut self) {
        for stage in Stage::ALL {
            self.cancel(stage);
        }
        self.board.clear();
    }

    /// Build the provider call for `stage` from current state, or `None` when
    /// its input is not there yet.
    fn job(&self, stage: Stage) -> Option<StageJob> {
        let state = &self.state;
        let job: StageJob = match stage {
            Stage::Transcription => {
                let video = state.video.clone()?;
                let transcriber = Arc::clone(&self.providers.transcriber);
                Box::pin(async move {
                    transcriber.transcribe(&video).await.map(StageOutput::Transcript)
                })
            }
            Stage::Translation => {
                if state.transcript.is_empty() {
                    return None;
                }
                let translator = Arc::clone(&self.providers.translator);
                let text = state.transcript.clone();
                let language = state.target_language.clone();
                Box::pin(async move {
                    translator.translate(&text, &language).await.map(StageOutput::Translation)
                })
            }
            Stage::Synthesis => {
                if state.translated_text.is_empty() {
                    return None;
                }
                let synthesizer = Arc::clone(&self.providers.synthesizer);
                let text = state.translated_text.clone();
                let language = state.target_language.clone();
                Box::pin(async move {
                    synthesizer.synthesize(&text, &language).await.map(StageOutput::Synthesized)
                })
            }
            Stage::Mixing => {
                let synthesized = state.synthesized.clone()?;
                let video = state.video.clone()?;
                let settings = state.mix_settings;
                let mixer = Arc::clone(&self.providers.mixer);
                Box::pin(async move {
                    mixer.mix(&synthesized, &video, settings).await.map(StageOutput::Mixed)
                })
            }
            Stage::Export => return None,
        };
        Some(job)
    }

    /// Start a fresh run of `stage`, superseding any run in flight.
    fn start(&mut self, stage: Stage) -> bool {
        let Some(job) = self.job(stage) else {
            debug!("{} has no input yet", stage);
            return false;
        };

        self.cancel(stage);
        self.next_seq += 1;
        let seq = self.next_seq;
        let token = CancellationToken::new();
        self.runs.insert(stage, Run { seq, token: token.clone() });
        self.board.insert(stage, StageStatus { running: true, progress: 0, error: None });
        self.broadcast(ProgressEvent::Started(stage));
        info!("Starting {} run #{}", stage, seq);

        let ticker = Ticker::new(stage, self.config.stages.timing(stage).clone());
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let progress = tx.clone();
            let result: Result<StageOutput> = async {
                ticker
                    .run(&token, |percent| {
                        let _ = progress.send(StageEvent::Progress { stage, seq, percent });
                    })
                    .await?;
                tokio::select! {
                    _ = token.cancelled() => Err(RedubError::Cancelled(stage)),
                    output = job => output,
                }
            }
            .await;

            if let Err(RedubError::Cancelled(_)) = result {
                debug!("{} run #{} stopped", stage, seq);
                return;
            }
            let _ = tx.send(StageEvent::Finished { stage, seq, result });
        });
        true
    }

    fn broadcast(&self, event: ProgressEvent) {
        // No subscribers is fine
        let _ = self.progress_tx.send(event);
    }
}
