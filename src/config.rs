use std::fmt::{Display, Formatter};

use frame_bus::PoolConfig;
use serde::Deserialize;

/// Script profile the detector is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognitionLanguage {
    #[default]
    Latin,
    Chinese,
    Devanagari,
    Japanese,
    Korean,
}

impl RecognitionLanguage {
    /// Unknown names fall back to latin.
    pub fn from_option(name: &str) -> Self {
        match name {
            "chinese" => RecognitionLanguage::Chinese,
            "devanagari" => RecognitionLanguage::Devanagari,
            "japanese" => RecognitionLanguage::Japanese,
            "korean" => RecognitionLanguage::Korean,
            _ => RecognitionLanguage::Latin,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionLanguage::Latin => "latin",
            RecognitionLanguage::Chinese => "chinese",
            RecognitionLanguage::Devanagari => "devanagari",
            RecognitionLanguage::Japanese => "japanese",
            RecognitionLanguage::Korean => "korean",
        }
    }
}

impl Display for RecognitionLanguage {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

/// Construction options as passed by the host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    min_buffer_count: Option<usize>,
    #[serde(default)]
    max_buffer_count: Option<usize>,
}

impl PluginOptions {
    /// Reads options from the host's dictionary. Unknown keys are ignored.
    pub fn from_map(options: &serde_json::Map<String, serde_json::Value>) -> anyhow::Result<Self> {
        let options = serde_json::from_value(serde_json::Value::Object(options.clone()))?;
        Ok(options)
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn language(&self) -> RecognitionLanguage {
        self.language
            .as_deref()
            .map(RecognitionLanguage::from_option)
            .unwrap_or_default()
    }

    /// Pool sizing, if the host overrode the defaults.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        if self.min_buffer_count.is_none() && self.max_buffer_count.is_none() {
            return None;
        }
        let mut config = PoolConfig::default();
        if let Some(min) = self.min_buffer_count {
            config = config.with_min_buffer_count(min);
        }
        if let Some(max) = self.max_buffer_count {
            config = config.with_max_buffer_count(max);
        }
        Some(config)
    }
}
