use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{ExportConfig, StageTiming};
use crate::error::{Result, RedubError};
use crate::media::VideoFile;
use crate::stage::{Stage, Ticker};
use crate::synthesize::AudioBuffer;

/// A file written by [`Exporter::export`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub media_type: &'static str,
    pub bytes: usize,
}

/// Saves the translated text as a flat file. No video is muxed.
pub struct Exporter {
    ticker: Ticker,
    file_name: String,
}

impl Exporter {
    pub fn new(config: &ExportConfig, timing: &StageTiming) -> Self {
        Self {
            ticker: Ticker::new(Stage::Export, timing.clone()),
            file_name: config.file_name.clone(),
        }
    }

    /// Export is only available once both inputs exist.
    pub fn is_available(synthesized: Option<&AudioBuffer>, video: Option<&VideoFile>) -> bool {
        synthesized.is_some() && video.is_some()
    }

    pub async fn export<F>(
        &self,
        translated_text: &str,
        synthesized: Option<&AudioBuffer>,
        video: Option<&VideoFile>,
        out_dir: &Path,
        token: &CancellationToken,
        on_progress: F,
    ) -> Result<ExportArtifact>
    where
        F: FnMut(u8),
    {
        if !Self::is_available(synthesized, video) {
            return Err(RedubError::MissingExportInput);
        }

        self.ticker.run(token, on_progress).await?;

        let path = out_dir.join(&self.file_name);
        let dir = out_dir.to_path_buf();
        let target = path.clone();
        let contents = translated_text.as_bytes().to_vec();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &contents))
            .await
            .map_err(std::io::Error::other)
            .and_then(|written| written)
            .map_err(|e| RedubError::stage(Stage::Export, e.to_string()))?;

        info!("Exported {} bytes to {}", translated_text.len(), path.display());
        Ok(ExportArtifact {
            path,
            media_type: "text/plain",
            bytes: translated_text.len(),
        })
    }
}

/// Write through a sibling temp file so readers never see a partial file.
pub(crate) fn write_atomically(dir: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use crate::config::Config;

    fn exporter() -> Exporter {
        let config = Config::default().instant();
        Exporter::new(&config.export, &config.stages.export)
    }

    #[tokio::test]
    async fn test_export_requires_both_inputs() {
        let dir = assert_fs::TempDir::new().unwrap();
        let token = CancellationToken::new();
        let buffer = AudioBuffer::from_code_units("x");

        let err = exporter()
            .export("x", Some(&buffer), None, dir.path(), &token, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, RedubError::MissingExportInput));
        assert!(!dir.child("translated_output.txt").path().exists());
    }

    #[tokio::test]
    async fn test_export_writes_exactly_the_translated_text() {
        let dir = assert_fs::TempDir::new().unwrap();
        let movie = dir.child("movie.mp4");
        movie.touch().unwrap();
        let video = VideoFile::open(movie.path()).unwrap();
        let buffer = AudioBuffer::from_code_units("Ceci est un texte traduit en français.");
        let token = CancellationToken::new();

        let mut ticks = Vec::new();
        let artifact = exporter()
            .export(
                "Ceci est un texte traduit en français.",
                Some(&buffer),
                Some(&video),
                dir.path(),
                &token,
                |p| ticks.push(p),
            )
            .await
            .unwrap();

        assert_eq!(artifact.media_type, "text/plain");
        assert_eq!(artifact.path, dir.path().join("translated_output.txt"));
        dir.child("translated_output.txt").assert("Ceci est un texte traduit en français.");
        assert_eq!(ticks.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_export_overwrites_previous_artifact() {
        let dir = assert_fs::TempDir::new().unwrap();
        let movie = dir.child("movie.mp4");
        movie.touch().unwrap();
        dir.child("translated_output.txt").write_str("stale").unwrap();
        let video = VideoFile::open(movie.path()).unwrap();
        let buffer = AudioBuffer::from_code_units("fresh");

        exporter()
            .export("fresh", Some(&buffer), Some(&video), dir.path(), &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        dir.child("translated_output.txt").assert("fresh");
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_an_export_failure() {
        let dir = assert_fs::TempDir::new().unwrap();
        let movie = dir.child("movie.mp4");
        movie.touch().unwrap();
        let blocked = dir.child("blocked");
        blocked.write_str("a file, not a directory").unwrap();
        let video = VideoFile::open(movie.path()).unwrap();
        let buffer = AudioBuffer::from_code_units("x");

        let err = exporter()
            .export("x", Some(&buffer), Some(&video), blocked.path(), &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, RedubError::StageFailed { stage: Stage::Export, .. }));
        assert_eq!(err.user_message(), "Failed to process download. Please try again.");
    }
}
