pub mod chat;
pub mod config_cmd;
pub mod inspect;
pub mod models;
pub mod onboard;
pub mod send;

use edumind_config::AppConfig;
use edumind_session::{ChatSession, SendOutcome};
use tracing::{info, warn};

/// Load config and build a session, failing early without an API key.
pub(crate) fn open_session(
    model: Option<String>,
) -> Result<(AppConfig, ChatSession), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        warn!("No API key configured");
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    EDUMIND_API_KEY=sk-...");
        eprintln!("    SILICONFLOW_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = edumind_providers::build_from_config(&config);
    let mut session = ChatSession::from_config(&config, provider);
    if let Some(model) = model {
        session.select_model(model);
    }
    info!(
        endpoint = %config.base_url,
        model = %session.selected_model(),
        "Session ready"
    );
    Ok((config, session))
}

pub(crate) fn print_outcome(outcome: &SendOutcome) {
    if let Some(notice) = &outcome.notice {
        println!("  {notice}");
    }
    for line in outcome.reply.lines() {
        println!("  Assistant > {line}");
    }
}
