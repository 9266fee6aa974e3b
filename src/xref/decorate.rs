//! Rewriting marked leaf elements of a document.

use tracing::{debug, trace};

use super::set::{PatternSet, Segment};
use crate::dom::{Dom, Marker, NodeId, parse_document, serialize};

/// Outcome of one decoration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecorationReport {
    /// Elements matching the marker.
    pub candidates: usize,
    /// Elements whose content was rewritten.
    pub decorated: usize,
    /// Elements left alone because they contain nested markup.
    pub skipped: usize,
    /// Links created across all elements.
    pub links: usize,
}

/// Applies a [`PatternSet`] to every element selected by a [`Marker`].
///
/// Only elements without element children are touched; anything with nested
/// markup is left exactly as it was. Running a pass again over its own output
/// is harmless for the same reason: decorated elements now contain links.
#[derive(Debug, Clone, Copy)]
pub struct Decorator<'a> {
    marker: &'a Marker,
    patterns: &'a PatternSet,
}

impl<'a> Decorator<'a> {
    pub fn new(marker: &'a Marker, patterns: &'a PatternSet) -> Self {
        Self { marker, patterns }
    }

    pub fn decorate(&self, dom: &mut Dom) -> DecorationReport {
        let mut report = DecorationReport::default();

        for id in self.marker.select(dom) {
            report.candidates += 1;

            if dom.has_element_children(id) {
                trace!(?id, "skipping element with nested markup");
                report.skipped += 1;
                continue;
            }

            let links = self.decorate_leaf(dom, id);
            if links > 0 {
                report.decorated += 1;
                report.links += links;
            }
        }

        debug!(
            marker = ?self.marker,
            candidates = report.candidates,
            decorated = report.decorated,
            skipped = report.skipped,
            links = report.links,
            "xref pass complete"
        );
        report
    }

    /// Replace the children of a leaf element with decorated content.
    /// Returns the number of links created.
    fn decorate_leaf(&self, dom: &mut Dom, id: NodeId) -> usize {
        let text = dom.text_content(id);
        if text.is_empty() {
            return 0;
        }

        let segments = self.patterns.decorate_text(&text);
        let links = segments.iter().filter(|s| s.is_link()).count();
        if links == 0 {
            return 0;
        }

        dom.detach_children(id);
        for segment in &segments {
            match segment {
                Segment::Literal(literal) => dom.append_text(id, literal),
                Segment::Link { text, href, .. } => {
                    let anchor = dom.create_link(href, text);
                    dom.append(id, anchor);
                }
            }
        }
        links
    }
}

/// Parse `html`, decorate it, and serialize the result.
pub fn decorate_html(html: &str, marker: &Marker, patterns: &PatternSet) -> String {
    let mut dom = parse_document(html);
    Decorator::new(marker, patterns).decorate(&mut dom);
    serialize(&dom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{inner_html, outer_html};
    use crate::xref::Hosts;

    fn patterns() -> PatternSet {
        PatternSet::standard(&Hosts {
            tracker_url: "https://tracker.test".to_string(),
            repo_url: "https://git.test/org".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_decorates_marked_leaf() {
        let mut dom = parse_document(r#"<p class="gt-xref">fixed in T100</p>"#);
        let marker = Marker::class("gt-xref");
        let report = Decorator::new(&marker, &patterns()).decorate(&mut dom);

        assert_eq!(
            report,
            DecorationReport {
                candidates: 1,
                decorated: 1,
                skipped: 0,
                links: 1,
            }
        );
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(
            inner_html(&dom, p),
            r#"fixed in <a href="https://tracker.test/T100">T100</a>"#
        );
    }

    #[test]
    fn test_unmarked_elements_are_ignored() {
        let mut dom = parse_document("<p>fixed in T100</p>");
        let marker = Marker::class("gt-xref");
        let report = Decorator::new(&marker, &patterns()).decorate(&mut dom);

        assert_eq!(report.candidates, 0);
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(inner_html(&dom, p), "fixed in T100");
    }

    #[test]
    fn test_nested_markup_is_untouched() {
        let html = r#"<div class="gt-xref">see <b>T100</b> and abcdef0</div>"#;
        let mut dom = parse_document(html);
        let div = dom.find_by_tag("div").unwrap();
        let before = outer_html(&dom, div);

        let marker = Marker::class("gt-xref");
        let report = Decorator::new(&marker, &patterns()).decorate(&mut dom);

        assert_eq!(report.skipped, 1);
        assert_eq!(report.links, 0);
        assert_eq!(outer_html(&dom, div), before);
    }

    #[test]
    fn test_entities_survive_decoration() {
        let mut dom = parse_document(r#"<span class="gt-xref">a &lt;b&gt; &amp; D7</span>"#);
        let marker = Marker::class("gt-xref");
        Decorator::new(&marker, &patterns()).decorate(&mut dom);

        let span = dom.find_by_tag("span").unwrap();
        assert_eq!(
            inner_html(&dom, span),
            r#"a &lt;b&gt; &amp; <a href="https://tracker.test/D7">D7</a>"#
        );
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let marker = Marker::class("gt-xref");
        let set = patterns();
        let once = decorate_html(r#"<p class="gt-xref">T1 prod-x</p>"#, &marker, &set);
        let twice = decorate_html(&once, &marker, &set);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_selector_list_marker_decorates_every_branch() {
        let mut dom =
            parse_document(r#"<p class="gt-xref">T1</p><p class="summary">T2</p><p>T3</p>"#);
        let marker = Marker::parse(".gt-xref, .summary").unwrap();
        let report = Decorator::new(&marker, &patterns()).decorate(&mut dom);

        assert_eq!(report.candidates, 2);
        assert_eq!(report.links, 2);
    }

    #[test]
    fn test_noscript_outside_markers_is_preserved() {
        let html = "<!DOCTYPE html><html><head></head><body>\
                    <noscript><img src=\"a.png\"></noscript>\
                    <p class=\"gt-xref\">T1</p></body></html>";
        let once = decorate_html(html, &Marker::class("gt-xref"), &patterns());
        assert!(once.contains(r#"<noscript><img src="a.png"></noscript>"#));
        assert_eq!(decorate_html(&once, &Marker::class("gt-xref"), &patterns()), once);
    }

    #[test]
    fn test_leaf_without_tokens_keeps_its_nodes() {
        let mut dom = parse_document(r#"<p class="gt-xref">plain<!--c--></p>"#);
        let p = dom.find_by_tag("p").unwrap();
        let marker = Marker::class("gt-xref");
        let report = Decorator::new(&marker, &patterns()).decorate(&mut dom);

        assert_eq!(report.decorated, 0);
        assert_eq!(inner_html(&dom, p), "plain<!--c-->");
    }
}
