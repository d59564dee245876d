use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidatorError>;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Core error: {0}")]
    CoreError(#[from] pagekeeper_core::CoreError),
}
