//! Cross-reference decoration.
//!
//! Free-form text is scanned for ticket ids, content hashes, repository names
//! and URLs, and each recognized token becomes a hyperlink. Decoration is a
//! two-stage process:
//!
//! 1. [`PatternSet::split`] cuts the text into alternating literal and token
//!    pieces using one pattern built by OR-ing every rule together.
//! 2. [`PatternSet::classify`] tests each piece against the rules in
//!    declaration order; the first rule matching the whole piece builds the
//!    link.
//!
//! # Example
//!
//! ```
//! use ticket_xref::xref::{Hosts, PatternSet, render_segments};
//!
//! let set = PatternSet::standard(&Hosts::default()).unwrap();
//! let html = render_segments(&set.decorate_text("see abcdef0"));
//! assert_eq!(html, r#"see <a href="/ticket/abcdef0">abcdef0</a>"#);
//! ```

mod decorate;
mod rule;
mod set;

pub use decorate::{DecorationReport, Decorator, decorate_html};
pub use rule::{LinkTemplate, PatternRule};
pub use set::{
    HASH_PATTERN, Hosts, PatternSet, REPO_PATTERN, Segment, TRACKER_ID_PATTERN, URL_PATTERN,
    plain_text, render_segments,
};
