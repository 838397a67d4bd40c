//! `minuta config`: configuration management commands.

use minuta_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if config.service.base_url.starts_with("http://")
                && !is_local(&config.service.base_url)
            {
                warnings.push("Backend reached over plain HTTP on a non-local host");
            }

            if !config
                .generation
                .fallback_models
                .iter()
                .any(|m| m.id == config.generation.default_model)
            {
                warnings.push("Default model is not among the fallback models");
            }

            if config.service.fetch_timeout_secs > config.generation.timeout_secs {
                warnings.push("Fetch timeout exceeds the generation timeout");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Backend:     {}", config.service.base_url);
            println!("   System:      {}", config.eproc.system_id);
            println!("   Model:       {}", config.generation.default_model);
            println!("   Page size:   {}", config.candidates.page_size);
            println!(
                "   Timeouts:    fetch {}s, generation {}s",
                config.service.fetch_timeout_secs, config.generation.timeout_secs
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
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

fn is_local(url: &str) -> bool {
    let host = url
        .trim_start_matches("http://")
        .split(['/', ':'])
        .next()
        .unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1")
}
