use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Server returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("No products to save. Please select at least one remark.")]
    NothingToCommit,
    #[error("Product {0} is not on the current page.")]
    NotDisplayed(i64),
    #[error("Configuration error: {0}")]
    Config(String),
}
