use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlmanacError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
