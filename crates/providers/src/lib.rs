//! Chat-completion backends for EduMind.
//!
//! All providers implement the `edumind_core::Provider` trait.

pub mod openai_compat;

use std::sync::Arc;
use std::time::Duration;

use edumind_config::AppConfig;
use edumind_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the configured backend.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Provider> {
    let api_key = config.api_key.clone().unwrap_or_default();
    let name = provider_name(&config.base_url);
    let provider = OpenAiCompatProvider::new(name, &config.base_url, api_key)
        .with_timeout(Duration::from_secs(config.request_timeout_secs));
    Arc::new(provider)
}

/// A short provider name for logs, derived from well-known base URLs.
fn provider_name(base_url: &str) -> &'static str {
    if base_url.contains("siliconflow") {
        "siliconflow"
    } else if base_url.contains("openrouter.ai") {
        "openrouter"
    } else if base_url.contains("api.openai.com") {
        "openai"
    } else if base_url.contains("localhost") || base_url.contains("127.0.0.1") {
        "local"
    } else {
        "custom"
    }
}
