use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("invalid product: {0}")]
    InvalidProduct(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
