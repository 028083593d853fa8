//! Frontend configuration
//!
//! Values are baked in at build time: `CARENEST_CONFIG` holds a TOML
//! override, `CARENEST_SUPABASE_URL` and `CARENEST_SUPABASE_ANON_KEY` win
//! over it.

use carenest_core::AppConfig;
use tracing::error;

const OVERRIDES: Option<&str> = option_env!("CARENEST_CONFIG");
const SUPABASE_URL: Option<&str> = option_env!("CARENEST_SUPABASE_URL");
const SUPABASE_ANON_KEY: Option<&str> = option_env!("CARENEST_SUPABASE_ANON_KEY");

/// Build-time configuration, falling back to the defaults when it is invalid
pub fn load() -> AppConfig {
    load_from(OVERRIDES, SUPABASE_URL, SUPABASE_ANON_KEY)
}

fn load_from(overrides: Option<&str>, url: Option<&str>, anon_key: Option<&str>) -> AppConfig {
    let settings: Vec<(&str, &str)> = [("supabase_url", url), ("supabase_anon_key", anon_key)]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

    AppConfig::load_layers(overrides, &settings).unwrap_or_else(|e| {
        error!(error = %e, "Invalid build configuration, using defaults");
        AppConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_settings_override_toml() {
        let config = load_from(
            Some("supabase_url = \"https://toml.supabase.co\"\n[guard]\nescape_delay_ms = 5000"),
            Some("https://env.supabase.co"),
            Some("anon"),
        );
        assert_eq!(config.supabase_url, "https://env.supabase.co");
        assert_eq!(config.supabase_anon_key, "anon");
        assert_eq!(config.guard.escape_delay_ms, 5_000);
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let config = load_from(Some("[guard]\nfailure_threshold = 0"), None, None);
        assert_eq!(config, AppConfig::default());
    }
}
