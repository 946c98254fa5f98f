// Media handling for the simulated pipeline
//
// Nothing here decodes audio or video. This module covers:
// - Video: ingestion of a user-selected file and its media type check
// - Playback: the "playable" mixed result with its transport controls
// - MediaHandle: opaque references standing in for playable object URLs

pub mod playback;
pub mod video;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

pub use playback::*;
pub use video::*;

/// Opaque playable reference for a video or audio payload.
///
/// Minted fresh for every ingested file or mixed result; it never encodes the
/// payload itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaHandle(String);

impl MediaHandle {
    pub fn mint() -> Self {
        Self(format!("blob:redub/{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Media type for a path, derived from its extension.
pub fn media_type_for<P: AsRef<Path>>(path: P) -> &'static str {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "mpeg" | "mpg" => "video/mpeg",
        "ogv" => "video/ogg",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "json" => "application/json",
        "txt" | "srt" => "text/plain",
        _ => "application/octet-stream",
    }
}
