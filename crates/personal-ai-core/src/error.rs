//! Error types shared by the form, storage, and chat layers.

use thiserror::Error;

use crate::validation::FieldName;

/// A single field failing its validation rule.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("field is required")]
    Required,

    #[error("too short: {actual} of at least {min} characters")]
    TooShort { min: usize, actual: usize },
}

/// Errors raised by the storage layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not determine data directory")]
    NoDataDir,
}

/// Errors raised by the training form.
#[derive(Error, Debug)]
pub enum FormError {
    /// `next` refused to advance because fields in the current step are invalid.
    #[error("Step {step} has {} invalid field(s)", .errors.len())]
    InvalidStep {
        step: usize,
        errors: Vec<(FieldName, FieldError)>,
    },

    /// Submission aborted; nothing was written.
    #[error("Please complete all required fields correctly.")]
    IncompleteForm { errors: Vec<(FieldName, FieldError)> },

    #[error("Submit is only available on the final step")]
    NotAtFinalStep,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by the chat session.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a response is still pending")]
    ResponsePending,
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
