//! Configuration loading, validation, and management for EduMind.
//!
//! Loads configuration from `~/.edumind/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use edumind_core::model::{Capability, ModelDescriptor, ModelRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// PDFs whose trimmed text has fewer characters than this are treated as scans.
pub const DEFAULT_SCAN_THRESHOLD_CHARS: usize = 20;

/// Pages rasterized from a scanned PDF.
pub const DEFAULT_MAX_PDF_PAGES: usize = 3;

/// Rasterization resolution. Low on purpose to keep payloads small.
pub const DEFAULT_RENDER_DPI: u32 = 100;

/// The root configuration structure.
///
/// Maps directly to `~/.edumind/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bearer key for the chat-completion backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Backend base URL (without `/chat/completions`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model selected at startup
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Vision model used when a scanned PDF reaches a text-only model
    #[serde(default = "default_vision_fallback_model")]
    pub vision_fallback_model: String,

    /// Max tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP timeout for one completion request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Language vision models are asked to answer in
    #[serde(default = "default_response_language")]
    pub response_language: String,

    /// Selectable models and their capabilities
    #[serde(default = "default_models")]
    pub models: Vec<ModelEntry>,

    /// Attachment extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

fn default_base_url() -> String {
    "https://api.siliconflow.cn/v1".into()
}
fn default_model() -> String {
    "deepseek-ai/DeepSeek-V3.2".into()
}
fn default_vision_fallback_model() -> String {
    "deepseek-ai/deepseek-vl2".into()
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_response_language() -> String {
    "English".into()
}

fn default_models() -> Vec<ModelEntry> {
    vec![
        ModelEntry::new("deepseek-ai/DeepSeek-V3.2", "DeepSeek-V3.2 (latest)", Capability::Text),
        ModelEntry::new("deepseek-ai/DeepSeek-V3", "DeepSeek-V3", Capability::Text),
        ModelEntry::new("deepseek-ai/DeepSeek-R1", "DeepSeek-R1 (reasoning)", Capability::Text),
        ModelEntry::new("deepseek-ai/deepseek-vl2", "DeepSeek-VL2 (vision)", Capability::Vision),
        ModelEntry::new("deepseek-ai/DeepSeek-OCR", "DeepSeek-OCR", Capability::Vision),
    ]
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("vision_fallback_model", &self.vision_fallback_model)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("response_language", &self.response_language)
            .field("models", &self.models)
            .field("extraction", &self.extraction)
            .finish()
    }
}

/// One `[[models]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,

    /// Display name; defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub capability: Capability,
}

impl ModelEntry {
    fn new(id: &str, label: &str, capability: Capability) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
            capability,
        }
    }

    pub fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new(
            self.id.clone(),
            self.label.clone().unwrap_or_else(|| self.id.clone()),
            self.capability,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Minimum trimmed character count for a PDF to count as text-bearing
    #[serde(default = "default_scan_threshold_chars")]
    pub scan_threshold_chars: usize,

    /// Pages rasterized from a scanned PDF
    #[serde(default = "default_max_pdf_pages")]
    pub max_pdf_pages: usize,

    #[serde(default = "default_render_dpi")]
    pub render_dpi: u32,

    /// JPEG quality (1-100) for rasterized pages
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Decoding attempts for text files, in order (WHATWG labels)
    #[serde(default = "default_text_encodings")]
    pub text_encodings: Vec<String>,

    /// Path to the pdfium shared library; the system library is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdfium_library: Option<PathBuf>,
}

fn default_scan_threshold_chars() -> usize {
    DEFAULT_SCAN_THRESHOLD_CHARS
}
fn default_max_pdf_pages() -> usize {
    DEFAULT_MAX_PDF_PAGES
}
fn default_render_dpi() -> u32 {
    DEFAULT_RENDER_DPI
}
fn default_jpeg_quality() -> u8 {
    80
}
fn default_text_encodings() -> Vec<String> {
    vec![
        "utf-8".into(),
        "gbk".into(),
        "gb18030".into(),
        "windows-1252".into(),
    ]
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            scan_threshold_chars: default_scan_threshold_chars(),
            max_pdf_pages: default_max_pdf_pages(),
            render_dpi: default_render_dpi(),
            jpeg_quality: default_jpeg_quality(),
            text_encodings: default_text_encodings(),
            pdfium_library: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.edumind/config.toml).
    ///
    /// Also checks environment variables:
    /// - `EDUMIND_API_KEY` (highest priority), then `SILICONFLOW_API_KEY`
    /// - `EDUMIND_MODEL`
    /// - `EDUMIND_BASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("EDUMIND_API_KEY")
                .ok()
                .or_else(|| std::env::var("SILICONFLOW_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("EDUMIND_MODEL") {
            config.default_model = model;
        }

        if let Ok(url) = std::env::var("EDUMIND_BASE_URL") {
            config.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".edumind")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.models {
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "model '{}' is listed more than once",
                    entry.id
                )));
            }
        }

        let registry = self.model_registry();
        if registry.get(&self.default_model).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "default_model '{}' is not in [[models]]",
                self.default_model
            )));
        }
        match registry.capability_of(&self.vision_fallback_model) {
            Some(Capability::Vision) => {}
            Some(Capability::Text) => {
                return Err(ConfigError::ValidationError(format!(
                    "vision_fallback_model '{}' is not vision-capable",
                    self.vision_fallback_model
                )));
            }
            None => {
                return Err(ConfigError::ValidationError(format!(
                    "vision_fallback_model '{}' is not in [[models]]",
                    self.vision_fallback_model
                )));
            }
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError("max_tokens must be > 0".into()));
        }

        let ex = &self.extraction;
        if ex.max_pdf_pages == 0 {
            return Err(ConfigError::ValidationError(
                "extraction.max_pdf_pages must be > 0".into(),
            ));
        }
        if ex.render_dpi == 0 {
            return Err(ConfigError::ValidationError(
                "extraction.render_dpi must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&ex.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "extraction.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if ex.text_encodings.is_empty() {
            return Err(ConfigError::ValidationError(
                "extraction.text_encodings must list at least one encoding".into(),
            ));
        }
        for label in &ex.text_encodings {
            if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "unknown text encoding '{label}'"
                )));
            }
        }

        Ok(())
    }

    /// Build the model capability registry from `[[models]]`.
    pub fn model_registry(&self) -> ModelRegistry {
        self.models.iter().map(ModelEntry::descriptor).collect()
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            vision_fallback_model: default_vision_fallback_model(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            response_language: default_response_language(),
            models: default_models(),
            extraction: ExtractionConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {}: {reason}", path.display())]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {}: {reason}", path.display())]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
