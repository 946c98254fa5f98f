use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, RedubError};
use super::{media_type_for, MediaHandle};

/// A user-selected video, accepted by [`VideoFile::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub path: PathBuf,
    pub name: String,
    pub media_type: &'static str,
    pub handle: MediaHandle,
}

impl VideoFile {
    /// Accept a file as the pipeline's source video.
    ///
    /// The check is by media type only: anything not under `video/` is
    /// rejected. The file must exist but its contents are never read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let media_type = media_type_for(path);
        debug!("Selected {} ({})", path.display(), media_type);

        if !media_type.starts_with("video/") {
            return Err(RedubError::InvalidFileType(media_type.to_string()));
        }
        if !path.is_file() {
            return Err(RedubError::FileNotFound(path.display().to_string()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let video = Self {
            path: path.to_path_buf(),
            name,
            media_type,
            handle: MediaHandle::mint(),
        };
        info!("Accepted video {} as {}", video.name, video.handle);
        Ok(video)
    }

    /// Reference persisted in project files in place of the file bytes.
    pub fn reference(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_open_accepts_video() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("trailer.mp4");
        file.touch().unwrap();

        let video = VideoFile::open(file.path()).unwrap();
        assert_eq!(video.name, "trailer.mp4");
        assert_eq!(video.media_type, "video/mp4");
        assert_eq!(video.reference(), file.path().display().to_string());
    }

    #[test]
    fn test_open_rejects_non_video() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("notes.txt");
        file.write_str("hello").unwrap();

        let err = VideoFile::open(file.path()).unwrap_err();
        assert!(matches!(err, RedubError::InvalidFileType(ref t) if t == "text/plain"));
    }

    #[test]
    fn test_open_rejects_missing_file() {
        let err = VideoFile::open("/no/such/movie.mp4").unwrap_err();
        assert!(matches!(err, RedubError::FileNotFound(_)));
    }
}
