//! Requests sent to the ticket backend and how their responses are shown.
//!
//! Both actions follow the same order: build the request, send it, wait for
//! the complete response, then update the page. At most one request per user
//! action is in flight.

use serde::Serialize;

use crate::error::{Error, Result};

/// Endpoint accepting [`ApiAction`] envelopes.
pub const ACTION_ENDPOINT: &str = "/api";
/// Endpoint accepting [`CommentSubmission`] bodies.
pub const COMMENT_ENDPOINT: &str = "/api/submit-comment";

/// Envelope posted to [`ACTION_ENDPOINT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ApiAction {
    /// Move a ticket to another board column.
    SetStatus { ticket: String, status: String },
}

impl ApiAction {
    pub fn set_status(ticket: impl Into<String>, status: impl Into<String>) -> Self {
        ApiAction::SetStatus {
            ticket: ticket.into(),
            status: status.into(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Body posted to [`COMMENT_ENDPOINT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentSubmission {
    pub ticket: String,
    pub comment: String,
}

impl CommentSubmission {
    /// Trim both fields; an empty comment is rejected before any request
    /// is made.
    pub fn new(ticket: &str, comment: &str) -> Result<Self> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(Error::EmptyComment);
        }
        Ok(Self {
            ticket: ticket.trim().to_string(),
            comment: comment.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Danger,
}

impl AlertKind {
    /// CSS class of the alert region.
    pub fn class(self) -> &'static str {
        match self {
            AlertKind::Success => "alert-success",
            AlertKind::Danger => "alert-danger",
        }
    }
}

/// Message shown in the page's alert region. The text is the backend's
/// response body, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub text: String,
}

impl Alert {
    pub fn from_response(ok: bool, body: impl Into<String>) -> Self {
        Self {
            kind: if ok {
                AlertKind::Success
            } else {
                AlertKind::Danger
            },
            text: body.into(),
        }
    }

    /// Alert for a failed client-side check.
    pub fn from_error(err: &Error) -> Self {
        Self {
            kind: AlertKind::Danger,
            text: err.to_string(),
        }
    }
}

/// What the page does after a comment submission completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    /// Reload to show the new comment.
    Reload,
    /// Show the backend's message.
    Alert(Alert),
}

impl CommentOutcome {
    pub fn from_response(ok: bool, body: impl Into<String>) -> Self {
        if ok {
            CommentOutcome::Reload
        } else {
            CommentOutcome::Alert(Alert::from_response(false, body))
        }
    }
}
