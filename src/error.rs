//! Error types for War Forge

use crate::trace::TraceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarError {
    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    #[error("Invalid deck: {0}")]
    InvalidDeck(String),

    #[error("Invalid players: {0}")]
    InvalidPlayers(String),

    #[error("Invalid game state: {0}")]
    InvalidState(String),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for WarError {
    fn from(err: serde_json::Error) -> Self {
        WarError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WarError>;
