use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod fixtures;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use fixtures::{
    AnnualizationCase, ColumnOrder, ConversionMnemonics, CustomAggregateEntry, Dataset, DatasetEntry, Fixtures, GroupingCase,
    RealRebasingMnemonics, SequenceMnemonics, TargetCurrency, TreeOrderEntry, WmmFixtures,
};
pub use logging::init_tracing;
pub use settings::{Config, LoggingConfig, ServiceConfig, VerificationConfig};

/// Environment variables prefixed with this override file values,
/// e.g. `GRIDCHECK__SERVICE__TOKEN`.
const ENV_PREFIX: &str = "GRIDCHECK";

/// Loads the application configuration from a `config.toml` file.
///
/// Values from the environment take precedence over the file, which keeps the
/// bearer token out of version control.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    tracing::debug!(path = %path.display(), "Loading configuration");
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate_config(&config)?;

    Ok(config)
}

/// Loads the scenario test data from a `fixtures.toml` file.
pub fn load_fixtures(path: &Path) -> Result<Fixtures, ConfigError> {
    tracing::debug!(path = %path.display(), "Loading fixtures");
    let fixtures = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?
        .try_deserialize::<Fixtures>()?;
    validate_fixtures(&fixtures)?;

    Ok(fixtures)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.service.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "service.base_url must not be empty".to_string(),
        ));
    }

    let verification = &config.verification;
    if verification.decimal_places > 28 {
        return Err(ConfigError::ValidationError(format!(
            "verification.decimal_places must be at most 28, got {}",
            verification.decimal_places
        )));
    }
    if let Some(bad) = verification
        .page_sizes
        .iter()
        .find(|&&size| size == 0 || size > verification.max_page_size)
    {
        return Err(ConfigError::ValidationError(format!(
            "page size {} must be between 1 and max_page_size ({})",
            bad, verification.max_page_size
        )));
    }

    Ok(())
}

fn validate_fixtures(fixtures: &Fixtures) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for entry in &fixtures.datasets {
        if !seen.insert(entry.name) {
            return Err(ConfigError::ValidationError(format!(
                "dataset '{}' is declared more than once",
                entry.name
            )));
        }
    }

    for wmm in &fixtures.wmm {
        if !seen.contains(&wmm.dataset) {
            return Err(ConfigError::ValidationError(format!(
                "wmm fixtures reference undeclared dataset '{}'",
                wmm.dataset
            )));
        }
        if let Some(rates) = wmm.rates_dataset.filter(|d| !seen.contains(d)) {
            return Err(ConfigError::ValidationError(format!(
                "wmm fixtures for '{}' take rates from undeclared dataset '{}'",
                wmm.dataset, rates
            )));
        }
        if wmm.start_date > wmm.end_date {
            return Err(ConfigError::ValidationError(format!(
                "wmm date range for '{}' starts after it ends",
                wmm.dataset
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("gridcheck-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_config_with_defaults() {
        let path = write_temp(
            "config.toml",
            r#"
            [service]
            base_url = "https://application.example.com"
            user = "settings-user"
            "#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.service.timeout_secs, 60);
        assert_eq!(config.verification.decimal_places, 9);
        assert_eq!(config.verification.page_sizes, vec![5, 10, 20, 25, 50, 75]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn rejects_page_size_above_reference_page() {
        let path = write_temp(
            "bad-config.toml",
            r#"
            [service]
            base_url = "https://application.example.com"
            user = "settings-user"

            [verification]
            max_page_size = 50
            page_sizes = [10, 75]
            "#,
        );

        assert!(matches!(load_config(&path), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn loads_fixtures_and_rejects_duplicates() {
        let path = write_temp(
            "fixtures.toml",
            r#"
            [[datasets]]
            name = "world_market_monitor"
            id = 101
            kind = "magellan"

            [[tree_orders]]
            dataset = "world_market_monitor"
            column = "Geography"
            order = ["World", "Europe", "France"]
            "#,
        );
        let fixtures = load_fixtures(&path).unwrap();
        assert_eq!(fixtures.dataset(Dataset::WorldMarketMonitor).map(|d| d.id), Some(101));
        assert_eq!(fixtures.tree_orders(Dataset::WorldMarketMonitor).count(), 1);

        let duplicate = write_temp(
            "dup-fixtures.toml",
            r#"
            [[datasets]]
            name = "banking"
            id = 1
            kind = "cube"

            [[datasets]]
            name = "banking"
            id = 2
            kind = "cube"
            "#,
        );
        assert!(matches!(load_fixtures(&duplicate), Err(ConfigError::ValidationError(_))));
    }
}
