//! Configuration loader: merges env vars, .env file, and config.toml.

use common::{AppConfig, Error};
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.polling_interval_ms == 0 {
        issues.push("polling_interval_ms must be > 0".into());
    }
    if config.max_age_ms == 0 {
        issues.push("max_age_ms must be > 0".into());
    }
    if config.store_sweep_interval_ms == 0 {
        issues.push("store_sweep_interval_ms must be > 0".into());
    }
    if config.max_age_ms < config.polling_interval_ms {
        issues.push("max_age_ms must be >= polling_interval_ms".into());
    }
    if config.mappings_api.trim().is_empty() {
        issues.push("mappings_api must not be empty".into());
    }
    if config.sports_events_api.trim().is_empty() {
        issues.push("sports_events_api must not be empty".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply environment overrides through `lookup` so tests need not touch
/// the process environment.
fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    if let Some(raw) = lookup("POLLING_INTERVAL_MS") {
        config.polling_interval_ms = parse_positive_u64(&raw, "POLLING_INTERVAL_MS")?;
    }
    if let Some(raw) = lookup("MAX_AGE_MS") {
        config.max_age_ms = parse_positive_u64(&raw, "MAX_AGE_MS")?;
    }
    if let Some(raw) = lookup("STORE_SWEEP_INTERVAL_MS") {
        config.store_sweep_interval_ms = parse_positive_u64(&raw, "STORE_SWEEP_INTERVAL_MS")?;
    }
    if let Some(url) = lookup("MAPPINGS_API") {
        config.mappings_api = url.trim().to_string();
    }
    if let Some(url) = lookup("SPORTS_EVENTS_API") {
        config.sports_events_api = url.trim().to_string();
    }
    Ok(())
}

/// Load configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_env_overrides_applied() {
        let mut cfg = AppConfig::default();
        apply_env_overrides(
            &mut cfg,
            env(&[
                ("POLLING_INTERVAL_MS", "250"),
                ("MAX_AGE_MS", " 60000 "),
                ("MAPPINGS_API", "http://feed.local/mappings"),
            ]),
        )
        .expect("overrides are valid");

        assert_eq!(cfg.polling_interval_ms, 250);
        assert_eq!(cfg.max_age_ms, 60_000);
        assert_eq!(cfg.store_sweep_interval_ms, 5000);
        assert_eq!(cfg.mappings_api, "http://feed.local/mappings");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut cfg = AppConfig::default();
        let err = apply_env_overrides(&mut cfg, env(&[("STORE_SWEEP_INTERVAL_MS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("STORE_SWEEP_INTERVAL_MS"));
    }

    #[test]
    fn test_validation_collects_all_issues() {
        let cfg = AppConfig {
            polling_interval_ms: 10_000,
            max_age_ms: 5_000,
            mappings_api: " ".into(),
            ..AppConfig::default()
        };

        let message = validate_config(&cfg).unwrap_err().to_string();
        assert!(message.contains("max_age_ms must be >= polling_interval_ms"));
        assert!(message.contains("mappings_api must not be empty"));
    }

    #[test]
    fn test_toml_config_parses() {
        let cfg: AppConfig = toml::from_str(
            r#"
            polling_interval_ms = 2000
            mappings_api = "http://feed.local/mappings"
            "#,
        )
        .expect("valid toml");
        assert_eq!(cfg.polling_interval_ms, 2000);
        assert_eq!(cfg.max_age_ms, 30_000);
    }
}
