//! Fehlerdefinitionen für das Sequencer-Modul

use thiserror::Error;

use crate::macros::MacroError;

/// Errors raised by the sequencer engine and its task plumbing.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// A compiled-in table failed validation during configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] MacroError),

    /// Engine setup failed before the poll loop started.
    #[error("Initialization error: {0}")]
    InitializationError(String),

    /// A channel to or from the engine task was closed or full.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// The engine task panicked or could not be joined.
    #[error("Thread error: {0}")]
    ThreadError(String),
}
