//! Application configuration
//!
//! Built-in TOML defaults are layered with an optional TOML override through
//! the `config` crate, then validated.

use crate::error::CoreResult;
use crate::validation::{ValidateConfig, validators};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

const DEFAULTS: &str = r#"
supabase_url = "http://localhost:54321"
supabase_anon_key = ""

[guard]
failure_threshold = 2
escape_delay_ms = 8000
login_route = "/login"
root_route = "/"
"#;

/// Session watchdog settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Consecutive empty-session refreshes treated as a corrupted session
    pub failure_threshold: u32,
    /// How long a page may look stuck before the escape control appears
    pub escape_delay_ms: u32,
    /// Client route used after an automatic wipe
    pub login_route: String,
    /// Document reloaded after a manual wipe
    pub root_route: String,
}

impl GuardConfig {
    pub const DEFAULT_FAILURE_THRESHOLD: u32 = 2;
    pub const DEFAULT_ESCAPE_DELAY_MS: u32 = 8_000;
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            failure_threshold: Self::DEFAULT_FAILURE_THRESHOLD,
            escape_delay_ms: Self::DEFAULT_ESCAPE_DELAY_MS,
            login_route: "/login".to_string(),
            root_route: "/".to_string(),
        }
    }
}

impl ValidateConfig for GuardConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validators::validate_range(self.failure_threshold, 1, 100, "guard.failure_threshold")?;
        validators::validate_range(
            self.escape_delay_ms,
            1,
            600_000,
            "guard.escape_delay_ms",
        )?;
        validators::validate_route(&self.login_route, "guard.login_route")?;
        validators::validate_route(&self.root_route, "guard.root_route")
    }
}

/// Frontend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the hosted auth/database project
    pub supabase_url: String,
    /// Public anon key sent as `apikey`
    pub supabase_anon_key: String,
    #[serde(default)]
    pub guard: GuardConfig,
}

impl AppConfig {
    /// Defaults overlaid with `overrides` (TOML), validated
    pub fn load(overrides: Option<&str>) -> CoreResult<Self> {
        Self::load_layers(overrides, &[])
    }

    /// Like [`AppConfig::load`], then individual keys (`guard.login_route`) on top
    pub fn load_layers(overrides: Option<&str>, settings: &[(&str, &str)]) -> CoreResult<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULTS, FileFormat::Toml));
        if let Some(overrides) = overrides.filter(|o| !o.trim().is_empty()) {
            builder = builder.add_source(File::from_str(overrides, FileFormat::Toml));
        }
        for (key, value) in settings {
            builder = builder.set_override(*key, *value)?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Auth endpoint base (`<project>/auth/v1`)
    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url.trim_end_matches('/'))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: String::new(),
            guard: GuardConfig::default(),
        }
    }
}

impl ValidateConfig for AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validators::validate_url(&self.supabase_url, "supabase_url")?;
        self.guard.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn defaults_match_watchdog_constants() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.guard, GuardConfig::default());
        assert_eq!(config.guard.failure_threshold, 2);
        assert_eq!(config.guard.escape_delay_ms, 8_000);
    }

    #[test]
    fn overrides_replace_individual_keys() {
        let config = AppConfig::load(Some(
            r#"
            supabase_url = "https://abc.supabase.co/"
            supabase_anon_key = "anon"

            [guard]
            escape_delay_ms = 12000
            "#,
        ))
        .unwrap();

        assert_eq!(config.guard.escape_delay_ms, 12_000);
        assert_eq!(config.guard.failure_threshold, 2);
        assert_eq!(config.auth_url(), "https://abc.supabase.co/auth/v1");
    }

    #[test]
    fn explicit_settings_win_over_overrides() {
        let config = AppConfig::load_layers(
            Some("supabase_url = \"https://from-file.supabase.co\""),
            &[
                ("supabase_url", "https://explicit.supabase.co"),
                ("supabase_anon_key", "anon-key"),
            ],
        )
        .unwrap();
        assert_eq!(config.supabase_url, "https://explicit.supabase.co");
        assert_eq!(config.supabase_anon_key, "anon-key");
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let err = AppConfig::load(Some("[guard]\nfailure_threshold = 0")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn relative_login_route_is_rejected() {
        let err = AppConfig::load(Some("[guard]\nlogin_route = \"login\"")).unwrap_err();
        assert!(err.to_string().contains("guard.login_route"));
    }
}
