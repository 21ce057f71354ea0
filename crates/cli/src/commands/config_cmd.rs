//! `rustedguard config` shows, validates and locates the configuration.

use rustedguard_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Max message chars:  {}", config.input.max_chars);
            println!("   Max trace id bytes: {}", config.input.max_trace_id_len);
            println!("   Log level:          {}", config.logging.level);
            println!("   Audit entries:      {}", config.audit.max_entries);
            println!("   Batch parallelism:  {}", config.batch.max_parallel);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Settings that load fine but are probably not what the operator wants.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if !config.audit.enabled {
        warnings.push("Audit trail is disabled");
    }

    if config.batch.max_parallel == 1 {
        warnings.push("Batch parallelism is 1, messages are governed one at a time");
    }

    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}
