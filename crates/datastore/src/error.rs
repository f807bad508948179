use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}
