use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("No usable snapshots: {0}")]
    NoSnapshots(String),

    #[error("Snapshot store error: {0}")]
    Store(#[from] datastore::StoreError),

    #[error("Market data error: {0}")]
    Market(#[from] api_client::ApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),
}
