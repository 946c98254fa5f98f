use thiserror::Error;

use crate::stage::Stage;

#[derive(Error, Debug)]
pub enum RedubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("{stage} failed: {reason}")]
    StageFailed { stage: Stage, reason: String },

    #[error("{0} run was cancelled")]
    Cancelled(Stage),

    #[error("Export requires both synthesized audio and the original video")]
    MissingExportInput,

    #[error("Project name must not be empty")]
    EmptyProjectName,

    #[error("Malformed project file: {0}")]
    MalformedProject(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl RedubError {
    pub fn stage<S: Into<String>>(stage: Stage, reason: S) -> Self {
        Self::StageFailed {
            stage,
            reason: reason.into(),
        }
    }

    /// Static message shown to the user for this error.
    ///
    /// Errors carry no structured detail past this boundary; the underlying
    /// cause only goes to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidFileType(_) | Self::FileNotFound(_) => "Please select a valid video file.",
            Self::StageFailed { stage, .. } | Self::Cancelled(stage) => stage.failure_message(),
            Self::MissingExportInput => "No audio or video file available for download.",
            Self::EmptyProjectName => "Please enter a project name.",
            Self::MalformedProject(_) | Self::Json(_) => {
                "Failed to load project. Invalid file format."
            }
            Self::ProjectNotFound(_) => "Project not found.",
            Self::Config(_) | Self::Toml(_) => "Invalid configuration.",
            Self::Io(_) | Self::Http(_) => "Something went wrong. Please try again.",
        }
    }
}

pub type Result<T> = std::result::Result<T, RedubError>;
