//! `rustedguard onboard` writes a default config file.

use std::path::Path;

use rustedguard_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();

    println!("🦀 RustedGuard: First-Time Setup");
    println!("================================\n");

    for line in setup(&config_dir)? {
        println!("{line}");
    }

    println!("🎉 Setup complete! Run `rustedguard assess -m \"...\"` to govern a message.\n");

    Ok(())
}

/// Create the config directory and file under `config_dir`, returning the
/// status lines to print. An existing config file is never overwritten.
fn setup(config_dir: &Path) -> std::io::Result<Vec<String>> {
    let config_path = config_dir.join("config.toml");
    let mut lines = Vec::new();

    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir)?;
        lines.push(format!("✅ Created config directory: {}", config_dir.display()));
    }

    if config_path.exists() {
        lines.push(format!("\n⚠️  Config already exists at: {}", config_path.display()));
        lines.push("   Edit it manually or delete and re-run onboard.\n".to_string());
        return Ok(lines);
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    lines.push(format!("✅ Created config.toml at: {}", config_path.display()));
    lines.push("\n📝 Next steps:".to_string());
    lines.push(format!("   1. Review the input limits in {}", config_path.display()));
    lines.push("   2. Run: rustedguard assess -m \"your message\"".to_string());
    lines.push("   3. Run: rustedguard rules to list every rule id\n".to_string());

    Ok(lines)
}
