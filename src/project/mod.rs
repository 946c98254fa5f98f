// Project persistence
//
// A project is a named snapshot of pipeline state minus raw file bytes.
// - Project: the JSON document users save and load
// - LocalStorage: the key/value store projects are saved into

pub mod storage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

pub use storage::*;
use crate::config::StorageConfig;
use crate::error::{Result, RedubError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    /// Opaque reference to the source video; never the file contents
    #[serde(deserialize_with = "opaque_reference")]
    pub video_file: Option<String>,
    pub transcript: String,
    pub translated_text: String,
    pub target_language: String,
}

/// Keeps string references and drops anything else (a serialized browser
/// `File` comes through as `{}`).
fn opaque_reference<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

impl Project {
    /// Parse a project document. Anything that is not a JSON object of the
    /// expected shape is malformed; missing keys are empty.
    pub fn parse(content: &[u8]) -> Result<Self> {
        serde_json::from_slice(content).map_err(|e| RedubError::MalformedProject(e.to_string()))
    }

    pub async fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read(path).await.map_err(|e| {
            warn!("Failed to read project file {}: {}", path.display(), e);
            RedubError::MalformedProject(e.to_string())
        })?;
        let project = Self::parse(&content)?;
        info!("Loaded project '{}' from {}", project.name, path.display());
        Ok(project)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub name: String,
    pub key: String,
    pub updated_at: DateTime<Utc>,
}

/// Projects saved in [`LocalStorage`] under `<prefix><name>`
pub struct ProjectStore {
    storage: LocalStorage,
    key_prefix: String,
}

impl ProjectStore {
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        Ok(Self {
            storage: LocalStorage::open(&config.dir).await?,
            key_prefix: config.key_prefix.clone(),
        })
    }

    pub fn key_for(&self, name: &str) -> String {
        format!("{}{}", self.key_prefix, name)
    }

    /// Save under the project's name, replacing any earlier save.
    pub async fn save(&mut self, project: &Project) -> Result<String> {
        if project.name.is_empty() {
            return Err(RedubError::EmptyProjectName);
        }
        let key = self.key_for(&project.name);
        self.storage.set_item(&key, project.to_json()?).await?;
        info!("Saved project '{}'", project.name);
        Ok(key)
    }

    pub fn get(&self, name: &str) -> Result<Project> {
        let key = self.key_for(name);
        let value = self
            .storage
            .get_item(&key)
            .ok_or_else(|| RedubError::ProjectNotFound(name.to_string()))?;
        Project::parse(value.as_bytes())
    }

    pub fn list(&self) -> Vec<ProjectSummary> {
        self.storage
            .keys()
            .filter_map(|key| {
                let name = key.strip_prefix(&self.key_prefix)?;
                let entry = self.storage.entry(key)?;
                Some(ProjectSummary {
                    name: name.to_string(),
                    key: key.to_string(),
                    updated_at: entry.updated_at,
                })
            })
            .collect()
    }
}
