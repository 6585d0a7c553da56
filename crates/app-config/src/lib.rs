// In crates/app-config/src/lib.rs

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{
    ApiSettings, AppSettings, FilterSettings, RealtimeSettings, Settings, StalenessSettings,
};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let builder = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        // e.g. `APP_API__BASE_URL=...`
        .add_source(Environment::with_prefix("APP").separator("__"));

    finish(builder)
}

/// Builds settings from a single TOML document. Used by tests and embedders
/// that ship their configuration inline.
pub fn settings_from_toml(content: &str) -> Result<Settings> {
    finish(Config::builder().add_source(File::from_str(content, FileFormat::Toml)))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<()> {
    let filters = &settings.filters;
    if filters.page_size_options.is_empty() {
        return Err(Error::Invalid("filters.page_size_options must not be empty".into()));
    }
    if !filters.page_size_options.contains(&filters.default_page_size) {
        return Err(Error::Invalid(format!(
            "filters.default_page_size ({}) is not one of {:?}",
            filters.default_page_size, filters.page_size_options
        )));
    }
    if settings.realtime.recent_decisions_cap == 0 {
        return Err(Error::Invalid("realtime.recent_decisions_cap must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [app]
        environment = "test"
        log_level = "debug"

        [api]
        base_url = "http://localhost:3000/api/v1"
        cable_url = "ws://localhost:3000/cable"
    "#;

    #[test]
    fn minimal_file_gets_dashboard_defaults() {
        let settings = settings_from_toml(MINIMAL).unwrap();
        assert_eq!(settings.api.retry_count, 2);
        assert_eq!(settings.realtime.recent_decisions_cap, 5);
        assert_eq!(settings.realtime.dashboard_refetch_secs, 30);
        assert_eq!(settings.filters.debounce_ms, 300);
        assert_eq!(settings.filters.default_page_size, 25);
        assert_eq!(settings.filters.page_size_options, vec![10, 25, 50, 100]);
    }

    #[test]
    fn default_page_size_must_be_an_option() {
        let content = format!("{MINIMAL}\n[filters]\ndefault_page_size = 30\n");
        assert!(matches!(settings_from_toml(&content), Err(Error::Invalid(_))));
    }

    #[test]
    fn overrides_are_respected() {
        let content = format!("{MINIMAL}\n[realtime]\nrecent_decisions_cap = 10\n");
        let settings = settings_from_toml(&content).unwrap();
        assert_eq!(settings.realtime.recent_decisions_cap, 10);
    }
}
