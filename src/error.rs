//! Error types for ticket-xref operations.

use thiserror::Error;

/// Errors raised while configuring or applying decorations.
///
/// Decorating text never fails; these come from configuration, markup
/// lookups and client-side validation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to compile xref pattern {pattern}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error("xref pattern {0} must not contain capturing groups")]
    CapturingGroup(String),

    #[error("invalid xref link template {template}: {reason}")]
    InvalidLinkTemplate { template: String, reason: String },

    #[error("invalid marker selector: {0}")]
    InvalidSelector(String),

    #[error("missing element: #{0}")]
    MissingElement(String),

    #[error("did not submit empty comment")]
    EmptyComment,
}

pub type Result<T> = std::result::Result<T, Error>;
