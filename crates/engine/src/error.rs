//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidArgument`] thrown when a request parameter is missing or malformed.
//! - [`KeyNotFound`] thrown when a referenced item does not exist.
//! - [`NotImplemented`] thrown by recognized workflows that are not built yet.
//! - [`Consistency`] and [`Database`] thrown when the store rejects or corrupts data.
//! - [`DeadlineExceeded`] thrown when a unit of work outlives its deadline.
//!
//! Every error aborts the whole unit of work it happened in.
//!
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`NotImplemented`]: EngineError::NotImplemented
//!  [`Consistency`]: EngineError::Consistency
//!  [`Database`]: EngineError::Database
//!  [`DeadlineExceeded`]: EngineError::DeadlineExceeded
use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    #[error("Consistency failure: {0}")]
    Consistency(String),
    #[error("Deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::NotImplemented(a), Self::NotImplemented(b)) => a == b,
            (Self::Consistency(a), Self::Consistency(b)) => a == b,
            (Self::DeadlineExceeded(a), Self::DeadlineExceeded(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
