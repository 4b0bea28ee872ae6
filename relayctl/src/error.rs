//! Errors surfaced by relayctl commands

use promptrelay_core::{PresentationError, ProviderError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Relay returned {status}: {message}")]
    Relay { status: u16, message: String },

    #[error(transparent)]
    Presentation(#[from] PresentationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
