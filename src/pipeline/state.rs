//! Pipeline state and its transition functions.
//!
//! [`PipelineState`] is the single source of truth for everything a stage
//! produces. It is owned by the orchestrator and only changes through the
//! methods below, so the clearing and checkpoint rules live in one place.

use crate::media::{MixSettings, MixedAudio, Playback, VideoFile};
use crate::project::Project;
use crate::stage::Checkpoint;
use crate::synthesize::AudioBuffer;

#[derive(Debug, Clone)]
pub struct PipelineState {
    pub video: Option<VideoFile>,
    pub transcript: String,
    pub translated_text: String,
    pub synthesized: Option<AudioBuffer>,
    pub mixed: Option<MixedAudio>,
    /// Transport over the current mix; replaced whenever a new mix lands.
    pub playback: Option<Playback>,
    pub target_language: String,
    pub mix_settings: MixSettings,
    pub checkpoint: Checkpoint,
    pub error: Option<&'static str>,
}

impl PipelineState {
    pub fn new(target_language: &str) -> Self {
        Self {
            video: None,
            transcript: String::new(),
            translated_text: String::new(),
            synthesized: None,
            mixed: None,
            playback: None,
            target_language: target_language.to_string(),
            mix_settings: MixSettings::default(),
            checkpoint: Checkpoint::Start,
            error: None,
        }
    }

    pub fn progress(&self) -> u8 {
        self.checkpoint.percent()
    }

    /// A new video invalidates everything derived from the old one.
    /// The target language survives.
    pub fn select_video(&mut self, video: VideoFile) {
        self.video = Some(video);
        self.transcript.clear();
        self.translated_text.clear();
        self.synthesized = None;
        self.mixed = None;
        self.playback = None;
        self.checkpoint = Checkpoint::Start;
        self.error = None;
    }

    pub fn set_transcript(&mut self, transcript: String) {
        self.transcript = transcript;
        self.advance(Checkpoint::Transcribed);
    }

    pub fn set_translation(&mut self, translated_text: String) {
        self.translated_text = translated_text;
        self.advance(Checkpoint::Translated);
    }

    pub fn set_synthesized(&mut self, buffer: AudioBuffer) {
        self.synthesized = Some(buffer);
        self.advance(Checkpoint::Synthesized);
    }

    pub fn set_mixed(&mut self, mixed: MixedAudio) {
        self.playback = Some(Playback::new(mixed.clone()));
        self.mixed = Some(mixed);
        self.advance(Checkpoint::Mixed);
    }

    pub fn fail(&mut self, message: &'static str) {
        self.error = Some(message);
    }

    /// Replace state with a loaded project. Progress is forced to the
    /// translation checkpoint whatever the project contains.
    pub fn load_project(&mut self, project: Project, video: Option<VideoFile>) {
        self.video = video;
        self.transcript = project.transcript;
        self.translated_text = project.translated_text;
        self.target_language = project.target_language;
        self.synthesized = None;
        self.mixed = None;
        self.playback = None;
        self.checkpoint = Checkpoint::Translated;
        self.error = None;
    }

    pub fn to_project(&self, name: &str) -> Project {
        Project {
            name: name.to_string(),
            video_file: self.video.as_ref().map(VideoFile::reference),
            transcript: self.transcript.clone(),
            translated_text: self.translated_text.clone(),
            target_language: self.target_language.clone(),
        }
    }

    /// Checkpoints only move forward between video selections.
    fn advance(&mut self, checkpoint: Checkpoint) {
        self.checkpoint = self.checkpoint.max(checkpoint);
    }
}
