//! Error types for provisioner.
//!
//! Two classes: fatal errors (`Precondition`, `Config`) abort a run before
//! any item is attempted; everything else is caught at the item boundary
//! and recorded in the run report.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("provisioning error: {0}")]
    Provisioning(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Precondition(_) | Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
