//! `edumind onboard` - First-time setup.

use edumind_config::AppConfig;
use tracing::info;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("EduMind — First-Time Setup");
    println!("==========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("  Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        info!(path = %config_path.display(), "Wrote default config");
        println!("  Created config.toml at: {}", config_path.display());
        println!("\n  Next steps:");
        println!("   1. Add your API key to {} (or set EDUMIND_API_KEY)", config_path.display());
        println!("   2. Run: edumind chat");
        println!("   3. Attach notes with /attach <file>\n");
    }

    println!("Setup complete! Run `edumind chat` to start.\n");
    Ok(())
}
