use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// ISO 4217 code printed in front of every amount.
    pub currency: String,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("INVENTORY_API_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                self.api.base_url = trimmed.to_string();
            }
        }
        // Zero would time out every request, so it counts as invalid.
        if let Some(secs) = lookup("INVENTORY_API_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            self.api.timeout_secs = secs;
        }
        if let Some(v) = lookup("INVENTORY_CURRENCY") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                self.display.currency = trimmed.to_ascii_uppercase();
            }
        }
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                timeout_secs: 30,
            },
            display: DisplayConfig {
                currency: "LKR".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api".to_string(),
                timeout_secs: 15,
            },
            display: DisplayConfig {
                currency: "LKR".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.example.com/api".to_string(),
                timeout_secs: 10,
            },
            display: DisplayConfig {
                currency: "LKR".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.display.currency, "LKR");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.api.base_url.starts_with("https://"));
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_overrides_apply_and_bad_values_are_ignored() {
        let vars: HashMap<&str, &str> = [
            ("INVENTORY_API_URL", " http://127.0.0.1:9000/api "),
            ("INVENTORY_API_TIMEOUT_SECS", "soon"),
            ("INVENTORY_CURRENCY", "usd"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::development()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.display.currency, "USD");
    }

    #[test]
    fn test_timeout_override_rejects_zero() {
        let lookup = |value: &'static str| {
            move |key: &str| (key == "INVENTORY_API_TIMEOUT_SECS").then(|| value.to_string())
        };

        assert_eq!(AppConfig::development().with_overrides(lookup("0")).api.timeout_secs, 30);
        assert_eq!(AppConfig::development().with_overrides(lookup(" 5 ")).api.timeout_secs, 5);
    }
}
