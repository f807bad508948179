use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The API request returned an error: {0}")]
    Api(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("Unsupported interval: {0}")]
    Interval(#[from] core_types::CoreError),

    #[error("Request cancelled by shutdown signal")]
    Cancelled,
}
