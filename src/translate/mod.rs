// Translation providers
//
// This module provides translation implementations through a factory pattern:
// - Canned: one fixed sentence per supported language
// - Http: POST to the placeholder translation endpoint

pub mod canned;
pub mod http;

use async_trait::async_trait;
use std::sync::Arc;

pub use canned::*;
pub use http::HttpTranslator;
use crate::config::{StageTiming, TranslateConfig, TranslationProvider};
use crate::error::Result;

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate text into the language identified by `target_language`
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator based on the configured provider
    pub fn create_translator(config: &TranslateConfig, timing: &StageTiming) -> Result<Arc<dyn Translator>> {
        match config.provider {
            TranslationProvider::Canned => Ok(Arc::new(CannedTranslator::new(timing.latency_ms))),
            TranslationProvider::Http => Ok(Arc::new(HttpTranslator::new(config)?)),
        }
    }
}
