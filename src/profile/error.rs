use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
