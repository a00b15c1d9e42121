use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LendingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("due dates from {0} leave the calendar")]
    DateOutOfRange(NaiveDate),
}

pub type Result<T> = std::result::Result<T, LendingError>;
