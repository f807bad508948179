use crate::error::ConfigError;
use crate::settings::Config;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{BackendSettings, BenchmarkSettings, MarketSettings, Mode};

/// Loads the application configuration from the given TOML file.
///
/// Values can be overridden through `QUANTBENCH_*` environment variables
/// (e.g. `QUANTBENCH_BENCHMARK__RUNS=5`), which is how API keys are kept
/// out of the checked-in file.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("QUANTBENCH").separator("__"))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Rejects configurations the benchmark cannot run with. Only invalid
/// configuration (and total snapshot acquisition failure) is fatal to a
/// benchmark, so the checks here are the whole gate.
fn validate(config: &Config) -> Result<(), ConfigError> {
    core_types::validate_interval(&config.benchmark.interval)?;

    if config.backends.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one backend must be configured".to_string(),
        ));
    }

    match config.benchmark.mode {
        Mode::Static => {
            if config.benchmark.dataset_dir.is_empty() {
                return Err(ConfigError::ValidationError(
                    "static mode requires a dataset_dir".to_string(),
                ));
            }
        }
        Mode::Realtime => {
            if config.benchmark.symbols.is_empty() {
                return Err(ConfigError::ValidationError(
                    "realtime mode requires at least one symbol".to_string(),
                ));
            }
        }
    }

    if config.benchmark.candle_count == 0 {
        return Err(ConfigError::ValidationError(
            "candle_count must be positive".to_string(),
        ));
    }

    Ok(())
}
