use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("task {0} has not been submitted and cannot settle")]
    NotSubmitted(String),
}
