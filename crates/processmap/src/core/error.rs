//! Core error types for diagram processing
//!
//! This module defines the error taxonomy shared by the entity model, the
//! draw.io codec, the notation catalogue and the storage adapters. Lookups
//! that find nothing return `Option` instead of an error.

use thiserror::Error;

/// Core error types for diagram processing
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("Unknown notation: {notation}")]
    UnknownNotation { notation: String },

    #[error("Unknown stencil '{stencil}' for notation {notation}")]
    UnknownStencil { notation: String, stencil: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new malformed input error
    pub fn malformed_input(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Create a new unknown notation error
    pub fn unknown_notation(notation: impl Into<String>) -> Self {
        Self::UnknownNotation {
            notation: notation.into(),
        }
    }

    /// Create a new unknown stencil error
    pub fn unknown_stencil(notation: impl Into<String>, stencil: impl Into<String>) -> Self {
        Self::UnknownStencil {
            notation: notation.into(),
            stencil: stencil.into(),
        }
    }

    /// Create a new render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::RenderError {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error means the input document could not be opened at all
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }

    /// Whether this error is a rejected argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
