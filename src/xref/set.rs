//! Ordered rule lists and text segmentation.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::rule::{LinkTemplate, PatternRule};
use crate::dom::{escape_attr, escape_text};
use crate::error::{Error, Result};

/// Link destinations for the standard rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hosts {
    /// Issue tracker base; short ids (`T123`, `D45`) link below it.
    pub tracker_url: String,
    /// Repository host and organization; `exp-*` and `prod-*` names link below it.
    pub repo_url: String,
}

impl Default for Hosts {
    fn default() -> Self {
        Self {
            tracker_url: "https://phabricator.example.com".to_string(),
            repo_url: "https://github.com/example".to_string(),
        }
    }
}

/// Short tracker ids: one of a fixed set of letters followed by digits.
pub const TRACKER_ID_PATTERN: &str = r"\b[TD][0-9]+\b";
/// Content hashes, 7 to 64 hex digits.
pub const HASH_PATTERN: &str = r"\b[0-9a-fA-F]{7,64}\b";
/// Repository names with a deployment prefix.
pub const REPO_PATTERN: &str = r"\b(?:exp|prod)-[A-Za-z0-9-]+\b";
/// Absolute http(s) URLs up to the next whitespace.
pub const URL_PATTERN: &str = r"https?://\S+";

/// A piece of decorated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'t> {
    Literal(&'t str),
    Link {
        text: &'t str,
        href: String,
        /// Index of the rule that produced the link.
        rule: usize,
    },
}

impl<'t> Segment<'t> {
    /// The original text this segment covers.
    pub fn text(&self) -> &'t str {
        match self {
            Segment::Literal(text) | Segment::Link { text, .. } => *text,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Segment::Link { .. })
    }
}

/// Rules in priority order plus the combined pattern used to split text.
///
/// The first declared rule whose recognizer matches a whole token wins,
/// even when a later rule is more specific.
#[derive(Debug, Clone)]
pub struct PatternSet {
    rules: Vec<PatternRule>,
    /// `((?:r1)|(?:r2)|...)`; `None` when there are no rules.
    splitter: Option<Regex>,
}

impl PatternSet {
    pub fn new(rules: Vec<PatternRule>) -> Result<Self> {
        if rules.is_empty() {
            return Ok(Self {
                rules,
                splitter: None,
            });
        }

        let alternation = rules
            .iter()
            .map(|r| format!("(?:{})", r.pattern()))
            .collect::<Vec<_>>()
            .join("|");
        let combined = format!("({alternation})");
        let splitter = Regex::new(&combined).map_err(|source| Error::Regex {
            pattern: combined.clone(),
            source,
        })?;

        Ok(Self {
            rules,
            splitter: Some(splitter),
        })
    }

    /// Tracker ids, hashes, repository names and URLs, in that order.
    pub fn standard(hosts: &Hosts) -> Result<Self> {
        Self::new(vec![
            PatternRule::new(TRACKER_ID_PATTERN, LinkTemplate::under(&hosts.tracker_url))?,
            PatternRule::parse(HASH_PATTERN, "/ticket/{token}")?,
            PatternRule::new(REPO_PATTERN, LinkTemplate::under(&hosts.repo_url))?,
            PatternRule::new(URL_PATTERN, LinkTemplate::identity())?,
        ])
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Split `text` into alternating literal and token pieces.
    ///
    /// The result always has odd length and starts and ends with a literal;
    /// literals may be empty.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let Some(splitter) = &self.splitter else {
            return vec![text];
        };

        let mut pieces = Vec::new();
        let mut last = 0;
        for m in splitter.find_iter(text) {
            pieces.push(&text[last..m.start()]);
            pieces.push(m.as_str());
            last = m.end();
        }
        pieces.push(&text[last..]);
        pieces
    }

    /// First rule matching the whole segment, with its index.
    pub fn classify(&self, segment: &str) -> Option<(usize, &PatternRule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches_whole(segment))
    }

    /// Split `text` and turn every recognized piece into a link.
    ///
    /// Every non-empty piece is classified, literals included, so a piece the
    /// splitter left alone still links if a rule matches it in isolation.
    /// Empty pieces are dropped.
    pub fn decorate_text<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        self.split(text)
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .map(|piece| match self.classify(piece) {
                Some((rule, matched)) => Segment::Link {
                    text: piece,
                    href: matched.href(piece),
                    rule,
                },
                None => Segment::Literal(piece),
            })
            .collect()
    }
}

/// HTML markup for `segments`.
pub fn render_segments(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(&escape_text(text)),
            Segment::Link { text, href, .. } => {
                out.push_str("<a href=\"");
                out.push_str(&escape_attr(href));
                out.push_str("\">");
                out.push_str(&escape_text(text));
                out.push_str("</a>");
            }
        }
    }
    out
}

/// The text covered by `segments`, links stripped.
pub fn plain_text(segments: &[Segment<'_>]) -> String {
    segments.iter().map(Segment::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> PatternSet {
        PatternSet::standard(&Hosts {
            tracker_url: "https://tracker.test".to_string(),
            repo_url: "https://git.test/org".to_string(),
        })
        .unwrap()
    }

    fn links(segments: &[Segment<'_>]) -> Vec<(String, String)> {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::Link { text, href, .. } => Some((text.to_string(), href.clone())),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_text_passes_through() {
        let set = standard();
        let text = "nothing to see here, move along";
        assert_eq!(set.decorate_text(text), vec![Segment::Literal(text)]);
        assert_eq!(render_segments(&set.decorate_text(text)), text);
    }

    #[test]
    fn test_single_tokens() {
        let set = standard();
        let cases = [
            ("T1234", "https://tracker.test/T1234"),
            ("D42", "https://tracker.test/D42"),
            ("abcdef7", "/ticket/abcdef7"),
            ("exp-my-repo", "https://git.test/org/exp-my-repo"),
            ("prod-api2", "https://git.test/org/prod-api2"),
            ("https://example.com/x", "https://example.com/x"),
            ("http://example.com", "http://example.com"),
        ];
        for (token, href) in cases {
            let segments = set.decorate_text(token);
            assert_eq!(links(&segments), vec![(token.to_string(), href.to_string())]);
            assert_eq!(segments.len(), 1, "{token} should be one link");
        }
    }

    #[test]
    fn test_mixed_sentence() {
        let set = standard();
        let segments = set.decorate_text("see T100 and also abcdef0123456 please");
        assert_eq!(
            segments,
            vec![
                Segment::Literal("see "),
                Segment::Link {
                    text: "T100",
                    href: "https://tracker.test/T100".to_string(),
                    rule: 0,
                },
                Segment::Literal(" and also "),
                Segment::Link {
                    text: "abcdef0123456",
                    href: "/ticket/abcdef0123456".to_string(),
                    rule: 1,
                },
                Segment::Literal(" please"),
            ]
        );
    }

    #[test]
    fn test_split_alternates() {
        let set = standard();
        assert_eq!(set.split("T1"), vec!["", "T1", ""]);
        assert_eq!(set.split("a T1 b D2"), vec!["a ", "T1", " b ", "D2", ""]);
        assert_eq!(set.split(""), vec![""]);
    }

    #[test]
    fn test_first_declared_rule_wins() {
        let set = standard();
        // Both a tracker id and a 7+ digit hex string.
        let segments = set.decorate_text("D1234567");
        assert_eq!(
            links(&segments),
            vec![(
                "D1234567".to_string(),
                "https://tracker.test/D1234567".to_string()
            )]
        );

        let reversed = PatternSet::new(vec![
            PatternRule::parse(HASH_PATTERN, "/ticket/{token}").unwrap(),
            PatternRule::parse(TRACKER_ID_PATTERN, "https://tracker.test/{token}").unwrap(),
        ])
        .unwrap();
        assert_eq!(
            links(&reversed.decorate_text("D1234567")),
            vec![("D1234567".to_string(), "/ticket/D1234567".to_string())]
        );
    }

    #[test]
    fn test_whole_word_only() {
        let set = standard();
        assert!(links(&set.decorate_text("XT100 T100x")).is_empty());
        assert!(links(&set.decorate_text("abcdef")).is_empty());
        let too_long = "a".repeat(65);
        assert!(links(&set.decorate_text(&too_long)).is_empty());
    }

    #[test]
    fn test_url_keeps_unsafe_characters() {
        let set = standard();
        let segments = set.decorate_text("at https://h.test/a?b=1&c=\"2\" now");
        assert_eq!(
            links(&segments),
            vec![(
                "https://h.test/a?b=1&c=\"2\"".to_string(),
                "https://h.test/a?b=1&c=\"2\"".to_string()
            )]
        );
        assert_eq!(
            render_segments(&segments),
            "at <a href=\"https://h.test/a?b=1&amp;c=&quot;2&quot;\">https://h.test/a?b=1&amp;c=\"2\"</a> now"
        );
    }

    #[test]
    fn test_empty_set_decorates_nothing() {
        let set = PatternSet::new(Vec::new()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.decorate_text("T100"), vec![Segment::Literal("T100")]);
    }

    #[test]
    fn test_split_piece_without_whole_match_stays_literal() {
        // The splitter finds "foo" inside "xfoo", but in isolation the piece
        // has no non-boundary before it.
        let set = PatternSet::new(vec![PatternRule::parse(r"\Bfoo\b", "/{token}").unwrap()])
            .unwrap();
        assert_eq!(set.split("xfoo bar"), vec!["x", "foo", " bar"]);

        let segments = set.decorate_text("xfoo bar");
        assert!(segments.iter().all(|s| !s.is_link()));
        assert_eq!(plain_text(&segments), "xfoo bar");
        assert_eq!(render_segments(&segments), "xfoo bar");
    }

    #[test]
    fn test_plain_text_reconstructs_input() {
        let set = standard();
        let text = "T1,D2;deadbeef exp-a https://x.test/y\tprod-b.";
        assert_eq!(plain_text(&set.decorate_text(text)), text);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn prop_decoration_preserves_text(
                words in prop::collection::vec(
                    prop_oneof![
                        "[TD][0-9]{1,5}",
                        "[0-9a-f]{5,12}",
                        "(exp|prod)-[a-z0-9-]{1,8}",
                        "https?://[a-z./]{1,12}",
                        "[ -~]{0,8}",
                    ],
                    0..8
                ),
                sep in "[ ,.;:\t\n]"
            ) {
                let text = words.join(&sep);
                let segments = standard().decorate_text(&text);
                prop_assert_eq!(plain_text(&segments), text);
            }

            #[test]
            fn prop_text_without_tokens_is_unchanged(text in "[g-z ,.!?]{0,40}") {
                let segments = standard().decorate_text(&text);
                prop_assert!(segments.iter().all(|s| !s.is_link()));
                prop_assert_eq!(render_segments(&segments), text);
            }
        }
    }
}
