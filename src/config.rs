use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Result, RedubError};
use crate::stage::Stage;

fn default_key_prefix() -> String {
    "project_".to_string()
}

fn default_export_file_name() -> String {
    "translated_output.txt".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub stages: StagesConfig,
    pub translate: TranslateConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Target language selected before the user picks one
    pub default_target_language: String,
}

/// Simulated timing for one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Percent advanced per tick (10 gives 0, 10, ..., 100)
    pub step: u8,
    /// Delay before each tick, in milliseconds
    pub tick_ms: u64,
    /// Extra provider latency after the ticks, in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagesConfig {
    pub transcription: StageTiming,
    pub translation: StageTiming,
    pub synthesis: StageTiming,
    pub mixing: StageTiming,
    pub export: StageTiming,
}

impl StagesConfig {
    pub fn timing(&self, stage: Stage) -> &StageTiming {
        match stage {
            Stage::Transcription => &self.transcription,
            Stage::Translation => &self.translation,
            Stage::Synthesis => &self.synthesis,
            Stage::Mixing => &self.mixing,
            Stage::Export => &self.export,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Which translation provider backs the translation stage
    pub provider: TranslationProvider,
    /// Base URL of the translation endpoint (Http provider only)
    pub endpoint: String,
    /// Request timeout in seconds (Http provider only)
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationProvider {
    /// Canned: one fixed sentence per supported language
    Canned,
    /// Http: POST to the placeholder translation endpoint
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the local storage file
    pub dir: PathBuf,
    /// Prefix prepended to the project name to form the storage key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Fixed name of the exported artifact
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the placeholder endpoint listens on
    pub bind: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig {
                default_target_language: "es".to_string(),
            },
            stages: StagesConfig {
                transcription: StageTiming { step: 10, tick_ms: 500, latency_ms: 0 },
                translation: StageTiming { step: 10, tick_ms: 200, latency_ms: 0 },
                synthesis: StageTiming { step: 5, tick_ms: 100, latency_ms: 1500 },
                mixing: StageTiming { step: 5, tick_ms: 100, latency_ms: 0 },
                export: StageTiming { step: 10, tick_ms: 200, latency_ms: 0 },
            },
            translate: TranslateConfig {
                provider: TranslationProvider::Canned,
                endpoint: "http://127.0.0.1:3000".to_string(),
                timeout_secs: 30,
            },
            storage: StorageConfig {
                dir: PathBuf::from(".redub/storage"),
                key_prefix: default_key_prefix(),
            },
            export: ExportConfig {
                file_name: default_export_file_name(),
            },
            server: ServerConfig {
                bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RedubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| RedubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RedubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| RedubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Same config with every simulated delay removed.
    pub fn instant(mut self) -> Self {
        for timing in [
            &mut self.stages.transcription,
            &mut self.stages.translation,
            &mut self.stages.synthesis,
            &mut self.stages.mixing,
            &mut self.stages.export,
        ] {
            timing.tick_ms = 0;
            timing.latency_ms = 0;
        }
        self
    }
}
