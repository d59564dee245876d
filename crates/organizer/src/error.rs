use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrganizerError>;

#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Core error: {0}")]
    CoreError(#[from] pagekeeper_core::CoreError),
}
