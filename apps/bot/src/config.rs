//! Configuration loading for the bot binary.

use heli_alerts::MonitorConfig;
use std::path::Path;
use tracing::info;

/// Load the monitor configuration from a JSON file, falling back to the
/// built-in defaults when the file is absent. Environment variables
/// override individual fields afterwards.
pub fn load(path: &str) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let mut config = if Path::new(path).exists() {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str::<MonitorConfig>(&raw)?
    } else {
        info!(path = path, "config file absent, using defaults");
        MonitorConfig::default()
    };

    if let Ok(admin) = std::env::var("HELI_ADMIN_ID") {
        config.admin_id = admin.trim().parse()?;
    }
    if let Ok(lcd) = std::env::var("HELI_LCD_BASE") {
        config.lcd_base = lcd;
    }
    if let Ok(auth_path) = std::env::var("HELI_AUTH_PATH") {
        config.auth_path = auth_path.into();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = load("/nonexistent/heli-config.json").unwrap();
        assert_eq!(config.symbol, "HELIUSDT");
        assert_eq!(config.denom, "uheli");
        assert_eq!(config.scan_ttl_secs, 30);
        assert_eq!(config.core_wallets.len(), 4);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let raw = r#"{"symbol": "HELIUSDC", "admin_id": 99}"#;
        let config: MonitorConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.symbol, "HELIUSDC");
        assert_eq!(config.admin_id, 99);
        assert_eq!(config.denom, "uheli");
    }
}
