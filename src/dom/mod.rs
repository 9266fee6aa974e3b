//! HTML document model.
//!
//! Pages are parsed with html5ever into an arena tree ([`Dom`]), queried with
//! CSS selectors ([`Marker`]) and written back out with [`serialize`].

mod arena;
mod select;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, Children, Dom, Node, NodeData, NodeId};
pub use select::{ElementRef, Marker, XrefSelectors};
pub use serialize::{escape_attr, escape_text, inner_html, outer_html, serialize};
pub use tree_sink::{DomSink, ElementName};

use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;

/// Parse an HTML document. Markup errors are recovered from the way a
/// browser would.
pub fn parse_document(html: &str) -> Dom {
    html5ever::parse_document(DomSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}
