//! CSS selector matching over [`Dom`] via the `selectors` crate.
//!
//! Used to pick the elements a decoration pass applies to.

use std::fmt;

use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::ElementSelectorFlags;
use selectors::parser::{ParseRelative, Selector, SelectorList, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use super::arena::{Dom, NodeData, NodeId};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrefSelectors;

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        self.0
            .bytes()
            .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32))
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentStr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IdentStr {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssLocalName {
    fn from(s: String) -> Self {
        Self(LocalName::from(s))
    }
}

impl From<&str> for CssLocalName {
    fn from(s: &str) -> Self {
        Self(LocalName::from(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssNamespace {
    fn from(s: String) -> Self {
        Self(Namespace::from(s))
    }
}

impl From<&str> for CssNamespace {
    fn from(s: &str) -> Self {
        Self(Namespace::from(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = XrefSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        false
    }

    fn valid_after_slotted(&self) -> bool {
        false
    }
}

/// Only `:link` is meaningful for a static page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {
    Link,
}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = XrefSelectors;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::Link => dest.write_str(":link"),
        }
    }
}

impl<'i> selectors::parser::Parser<'i> for XrefSelectors {
    type Impl = XrefSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

impl SelectorImpl for XrefSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// An element of a [`Dom`] seen through the `selectors::Element` trait.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub dom: &'a Dom,
    pub id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(dom: &'a Dom, id: NodeId) -> Self {
        Self { dom, id }
    }

    fn is_anchor_with_href(&self) -> bool {
        self.dom
            .element_name(self.id)
            .is_some_and(|n| n.as_ref() == "a")
            && self.dom.get_attr(self.id, "href").is_some()
    }

    fn sibling_element(&self, step: impl Fn(&super::arena::Node) -> NodeId) -> Option<Self> {
        let mut current = step(self.dom.get(self.id)?);
        while current.is_some() {
            if self.dom.is_element(current) {
                return Some(Self::new(self.dom, current));
            }
            current = step(self.dom.get(current)?);
        }
        None
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.dom.element_name(self.id))
            .finish()
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = XrefSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.dom.get(self.id)?.parent;
        self.dom
            .is_element(parent)
            .then(|| Self::new(self.dom, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|n| n.prev_sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|n| n.next_sibling)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.dom
            .children(self.id)
            .find(|&c| self.dom.is_element(c))
            .map(|c| Self::new(self.dom, c))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.dom
            .element_name(self.id)
            .is_some_and(|n| n == &name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.dom
            .element_namespace(self.id)
            .is_some_and(|n| n == &ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.dom.element_name(self.id) == other.dom.element_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        let Some(NodeData::Element { attrs, .. }) = self.dom.get(self.id).map(|n| &n.data) else {
            return false;
        };

        attrs
            .iter()
            .filter(|attr| match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            })
            .find(|attr| attr.name.local == local_name.0)
            .is_some_and(|attr| operation.eval_str(&attr.value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match pc {
            NonTSPseudoClass::Link => self.is_anchor_with_href(),
        }
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn is_link(&self) -> bool {
        self.is_anchor_with_href()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_id(self.id)
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_classes(self.id)
            .iter()
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.dom.children(self.id).all(|child| match self.dom.get(child).map(|n| &n.data) {
            Some(NodeData::Element { .. }) => false,
            Some(NodeData::Text(t)) => t.is_empty(),
            _ => true,
        })
    }

    fn is_root(&self) -> bool {
        self.dom
            .get(self.id)
            .and_then(|n| self.dom.get(n.parent))
            .is_some_and(|p| matches!(p.data, NodeData::Document))
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

/// Identifies the elements a decoration pass applies to.
#[derive(Clone)]
pub enum Marker {
    /// Elements carrying this class.
    Class(String),
    /// Elements matching any selector of a comma-separated list.
    Selector {
        css: String,
        selectors: Vec<Selector<XrefSelectors>>,
    },
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Class(class) => f.debug_tuple("Class").field(class).finish(),
            Marker::Selector { css, .. } => f.debug_tuple("Selector").field(css).finish(),
        }
    }
}

impl Marker {
    pub fn class(name: impl Into<String>) -> Self {
        Marker::Class(name.into())
    }

    /// Parse a selector list such as `.gt-xref` or `td.summary, .title`.
    pub fn selector(css: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(css);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&XrefSelectors, &mut parser, ParseRelative::No)
            .map_err(|_| Error::InvalidSelector(css.to_string()))?;
        if !parser.is_exhausted() {
            return Err(Error::InvalidSelector(css.to_string()));
        }

        Ok(Marker::Selector {
            css: css.to_string(),
            selectors: list.slice().to_vec(),
        })
    }

    /// Interpret a command-line style marker: a bare word is a class name,
    /// anything else is a selector.
    pub fn parse(marker: &str) -> Result<Self> {
        let bare = !marker.is_empty()
            && marker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if bare {
            Ok(Marker::class(marker))
        } else {
            Marker::selector(marker)
        }
    }

    pub fn matches(&self, dom: &Dom, id: NodeId) -> bool {
        if !dom.is_element(id) {
            return false;
        }
        match self {
            Marker::Class(class) => dom.has_class(id, class),
            Marker::Selector { selectors: list, .. } => {
                let element = ElementRef::new(dom, id);
                let mut caches = SelectorCaches::default();
                let mut context = MatchingContext::new(
                    selectors::matching::MatchingMode::Normal,
                    None,
                    &mut caches,
                    selectors::context::QuirksMode::NoQuirks,
                    selectors::matching::NeedsSelectorFlags::No,
                    selectors::matching::MatchingForInvalidation::No,
                );
                list.iter().any(|selector| {
                    selectors::matching::matches_selector(
                        selector,
                        0,
                        None,
                        &element,
                        &mut context,
                    )
                })
            }
        }
    }

    /// Matching elements in document order.
    pub fn select(&self, dom: &Dom) -> Vec<NodeId> {
        dom.elements()
            .into_iter()
            .filter(|&id| self.matches(dom, id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;

    #[test]
    fn test_class_marker() {
        let dom = parse_document(r#"<p class="gt-xref">a</p><p>b</p><p class="x gt-xref">c</p>"#);
        let marker = Marker::class("gt-xref");
        let found: Vec<_> = marker
            .select(&dom)
            .into_iter()
            .map(|id| dom.text_content(id))
            .collect();
        assert_eq!(found, vec!["a", "c"]);
    }

    #[test]
    fn test_selector_marker() {
        let dom = parse_document(
            r#"<div class="board"><span class="title">T1</span></div><span class="title">T2</span>"#,
        );
        let marker = Marker::selector(".board > span.title").unwrap();
        let found: Vec<_> = marker
            .select(&dom)
            .into_iter()
            .map(|id| dom.text_content(id))
            .collect();
        assert_eq!(found, vec!["T1"]);
    }

    #[test]
    fn test_id_and_attribute_selectors() {
        let dom = parse_document(r#"<td id="summary" data-kind="text">x</td>"#);
        let td = dom.find_by_tag("td").unwrap();
        assert!(Marker::selector("#summary").unwrap().matches(&dom, td));
        assert!(Marker::selector("[data-kind=text]").unwrap().matches(&dom, td));
        assert!(!Marker::selector("#other").unwrap().matches(&dom, td));
    }

    #[test]
    fn test_selector_list_marker() {
        let dom = parse_document(
            r#"<p class="gt-xref">T1</p><p class="summary">T2</p><p class="other">T3</p>"#,
        );
        let marker = Marker::parse(".gt-xref, .summary").unwrap();
        let found: Vec<_> = marker
            .select(&dom)
            .into_iter()
            .map(|id| dom.text_content(id))
            .collect();
        assert_eq!(found, vec!["T1", "T2"]);
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        assert!(matches!(
            Marker::selector(".gt-xref !"),
            Err(Error::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_parse_marker_forms() {
        assert!(matches!(Marker::parse("gt-xref"), Ok(Marker::Class(c)) if c == "gt-xref"));
        assert!(matches!(Marker::parse(".gt-xref"), Ok(Marker::Selector { .. })));
        assert!(matches!(
            Marker::parse("p >> ["),
            Err(Error::InvalidSelector(_))
        ));
    }
}
