use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::Result;
use super::Translator;

/// A language the canned translator knows a sentence for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub sample: &'static str,
}

pub static LANGUAGES: [Language; 12] = [
    Language { code: "es", name: "Spanish", sample: "Este es un texto traducido al español." },
    Language { code: "fr", name: "French", sample: "Ceci est un texte traduit en français." },
    Language { code: "de", name: "German", sample: "Dies ist ein ins Deutsche übersetzter Text." },
    Language { code: "it", name: "Italian", sample: "Questo è un testo tradotto in italiano." },
    Language { code: "ja", name: "Japanese", sample: "これは日本語に翻訳されたテキストです。" },
    Language { code: "ko", name: "Korean", sample: "이것은 한국어로 번역된 텍스트입니다." },
    Language { code: "zh", name: "Chinese (Simplified)", sample: "这是翻译成中文的文本。" },
    Language { code: "sw", name: "Kiswahili", sample: "Huu ni mfano wa maandishi yaliyotafsiriwa kwa Kiswahili." },
    Language { code: "ar", name: "Arabic", sample: "هذا نص مترجم إلى اللغة العربية." },
    Language { code: "hi", name: "Hindi", sample: "यह हिंदी में अनुवादित पाठ है।" },
    Language { code: "pt", name: "Portuguese", sample: "Este é um texto traduzido para o português." },
    Language { code: "ru", name: "Russian", sample: "Это текст, переведенный на русский язык." },
];

pub const TRANSLATION_UNAVAILABLE: &str = "Translation not available for this language.";

pub fn find_language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Canned translation: the same sentence for any input text, keyed by language
pub struct CannedTranslator {
    latency: Duration,
}

impl CannedTranslator {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
        }
    }

    pub fn lookup(target_language: &str) -> &'static str {
        find_language(target_language)
            .map(|l| l.sample)
            .unwrap_or(TRANSLATION_UNAVAILABLE)
    }
}

#[async_trait]
impl Translator for CannedTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if find_language(target_language).is_none() {
            warn!("No canned translation for '{}'", target_language);
        }
        let translation = Self::lookup(target_language);
        info!("Translated {} chars to {}", text.chars().count(), target_language);
        Ok(translation.to_string())
    }
}
