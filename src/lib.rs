//! # ticket-xref
//!
//! Presentation logic for a ticket tracker's web pages, working on parsed
//! HTML instead of a live browser DOM.
//!
//! ## Features
//!
//! - Cross-reference decoration: ticket ids, content hashes, repository names
//!   and URLs in marked elements become links
//! - Configurable rule sets with first-declared-wins priority
//! - Bookmark navigation menus from a persisted JSON configuration
//! - Request envelopes and response handling for the ticket backend
//!
//! ## Quick Start
//!
//! ```
//! use ticket_xref::{Hosts, Marker, PatternSet, decorate_html};
//!
//! let patterns = PatternSet::standard(&Hosts::default()).unwrap();
//! let marker = Marker::class("gt-xref");
//!
//! let html = decorate_html(
//!     r#"<p class="gt-xref">blocked on prod-billing</p>"#,
//!     &marker,
//!     &patterns,
//! );
//! assert!(html.contains(r#"<a href="https://github.com/example/prod-billing">prod-billing</a>"#));
//! ```

pub mod api;
pub mod board;
pub mod config;
pub mod dom;
pub mod error;
pub mod menu;
pub mod xref;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{BookmarkConfig, Config};
pub use dom::{Dom, Marker, parse_document, serialize};
pub use error::{Error, Result};
pub use menu::Menu;
pub use xref::{DecorationReport, Decorator, Hosts, PatternRule, PatternSet, decorate_html};
