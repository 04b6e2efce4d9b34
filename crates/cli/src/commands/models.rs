//! `edumind models` - List configured models.

use edumind_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = config.model_registry();

    println!("  Configured models");
    println!();
    println!("  {:<36} {:<8} Label", "Id", "Kind");
    for model in registry.list() {
        let mut notes = Vec::new();
        if model.id == config.default_model {
            notes.push("default");
        }
        if model.id == config.vision_fallback_model {
            notes.push("scan fallback");
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!("  ({})", notes.join(", "))
        };
        println!("  {:<36} {:<8} {}{notes}", model.id, model.capability, model.label);
    }
    println!();
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("  Add models with [[models]] entries in {}", config_path.display());

    Ok(())
}
