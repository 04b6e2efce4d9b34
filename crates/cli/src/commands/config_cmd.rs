//! `edumind config` - Configuration management commands.

use edumind_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   Config parsed and validated");

            if !config.has_api_key() {
                println!();
                println!("   Warning: no API key set (set EDUMIND_API_KEY or SILICONFLOW_API_KEY)");
            }

            println!();
            println!("   Endpoint:  {}", config.base_url);
            println!("   Model:     {}", config.default_model);
            println!("   Fallback:  {}", config.vision_fallback_model);
            println!("   Models:    {}", config.models.len());
            println!(
                "   Scans:     < {} chars, up to {} pages at {} DPI",
                config.extraction.scan_threshold_chars,
                config.extraction.max_pdf_pages,
                config.extraction.render_dpi
            );
        }
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", redacted_toml(config)?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

fn redacted_toml(mut config: AppConfig) -> Result<String, toml::ser::Error> {
    if config.api_key.is_some() {
        config.api_key = Some("[REDACTED]".into());
    }
    toml::to_string_pretty(&config)
}
