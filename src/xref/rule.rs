//! A single token shape and where it links to.

use std::fmt;

use regex_lite::Regex;

use crate::error::{Error, Result};

/// Destination URL builder with `{token}` placeholders.
///
/// The matched token is substituted verbatim, without percent-encoding.
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplate {
    source: String,
    pieces: Vec<Piece>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Token,
}

impl LinkTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidLinkTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => return Err(invalid("unterminated placeholder")),
                        }
                    }
                    if name != "token" {
                        return Err(invalid(&format!("unknown placeholder {{{name}}}")));
                    }
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Token);
                }
                '}' => return Err(invalid("unmatched }")),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            pieces,
        })
    }

    /// Template that links a token to itself.
    pub fn identity() -> Self {
        Self {
            source: "{token}".to_string(),
            pieces: vec![Piece::Token],
        }
    }

    /// Template `{base}/{token}`; braces in `base` are taken literally.
    pub fn under(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            source: format!("{}/{{token}}", base.replace('{', "{{").replace('}', "}}")),
            pieces: vec![Piece::Literal(format!("{base}/")), Piece::Token],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn render(&self, token: &str) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Token => out.push_str(token),
            }
        }
        out
    }
}

impl fmt::Display for LinkTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Recognizer plus link builder.
///
/// The recognizer must not contain capturing groups: rules are OR-ed into one
/// splitting pattern whose single group delimits tokens.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: String,
    /// `^(?:pattern)$`, used to test whole segments.
    anchored: Regex,
    link: LinkTemplate,
}

impl PatternRule {
    pub fn new(pattern: &str, link: LinkTemplate) -> Result<Self> {
        let compile = |p: &str| {
            Regex::new(p).map_err(|source| Error::Regex {
                pattern: pattern.to_string(),
                source,
            })
        };

        let recognizer = compile(pattern)?;
        if recognizer.captures_len() != 1 {
            return Err(Error::CapturingGroup(pattern.to_string()));
        }
        let anchored = compile(&format!("^(?:{pattern})$"))?;

        Ok(Self {
            pattern: pattern.to_string(),
            anchored,
            link,
        })
    }

    /// Build a rule from a pattern and a link template string.
    pub fn parse(pattern: &str, link: &str) -> Result<Self> {
        Self::new(pattern, LinkTemplate::parse(link)?)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn link(&self) -> &LinkTemplate {
        &self.link
    }

    /// Whether the recognizer matches the whole of `segment`.
    pub fn matches_whole(&self, segment: &str) -> bool {
        self.anchored.is_match(segment)
    }

    pub fn href(&self, token: &str) -> String {
        self.link.render(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_substitutes_every_placeholder() {
        let t = LinkTemplate::parse("/ticket/{token}?ref={token}").unwrap();
        assert_eq!(t.render("abc1234"), "/ticket/abc1234?ref=abc1234");
    }

    #[test]
    fn test_template_escaped_braces() {
        let t = LinkTemplate::parse("/x/{{literal}}/{token}").unwrap();
        assert_eq!(t.render("T1"), "/x/{literal}/T1");
    }

    #[test]
    fn test_template_rejects_unknown_placeholder() {
        assert!(matches!(
            LinkTemplate::parse("/ticket/{id}"),
            Err(Error::InvalidLinkTemplate { .. })
        ));
        assert!(LinkTemplate::parse("/ticket/{token").is_err());
        assert!(LinkTemplate::parse("/ticket/}").is_err());
    }

    #[test]
    fn test_template_under_trims_slash() {
        let t = LinkTemplate::under("https://tracker.example.com/");
        assert_eq!(t.render("T100"), "https://tracker.example.com/T100");
        assert_eq!(t.as_str(), "https://tracker.example.com/{token}");
    }

    #[test]
    fn test_token_is_not_percent_encoded() {
        assert_eq!(
            LinkTemplate::identity().render("https://h/a b?x=<1>"),
            "https://h/a b?x=<1>"
        );
    }

    #[test]
    fn test_rule_rejects_capturing_group() {
        let err = PatternRule::parse(r"\b(T|D)[0-9]+\b", "/{token}").unwrap_err();
        assert!(matches!(err, Error::CapturingGroup(p) if p == r"\b(T|D)[0-9]+\b"));
    }

    #[test]
    fn test_rule_accepts_non_capturing_group() {
        assert!(PatternRule::parse(r"\b(?:exp|prod)-[a-z]+\b", "/{token}").is_ok());
    }

    #[test]
    fn test_rule_reports_bad_regex() {
        assert!(matches!(
            PatternRule::parse(r"[unclosed", "/{token}"),
            Err(Error::Regex { .. })
        ));
    }

    #[test]
    fn test_matches_whole_segment_only() {
        let rule = PatternRule::parse(r"\b[TD][0-9]+\b", "/{token}").unwrap();
        assert!(rule.matches_whole("T100"));
        assert!(!rule.matches_whole("T100 "));
        assert!(!rule.matches_whole("see T100"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let rule = PatternRule::parse(r"foo|bar", "/{token}").unwrap();
        assert!(rule.matches_whole("bar"));
        assert!(!rule.matches_whole("foobar"));
    }
}
