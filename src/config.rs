//! JSON configuration: link hosts, custom xref rules and bookmarks.
//!
//! ```json
//! {
//!   "hosts": { "tracker_url": "https://phab.example.com", "repo_url": "https://github.com/acme" },
//!   "xref": [ { "pattern": "\\bJIRA-[0-9]+\\b", "link": "https://jira.example.com/browse/{token}" } ],
//!   "bookmarks": { "Me": { "Assigned to me": "assignee:alice" } }
//! }
//! ```
//!
//! Every section is optional. Without `xref` the standard rules are used.

use std::fs;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::xref::{Hosts, PatternRule, PatternSet};

/// A custom xref rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct XrefRuleConfig {
    #[serde(alias = "Pattern")]
    pub pattern: String,
    #[serde(alias = "Link")]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub label: String,
    /// Query string, passed as `?q=` verbatim.
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkGroup {
    pub name: String,
    pub entries: Vec<Bookmark>,
}

/// Bookmark groups in configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkConfig {
    pub groups: Vec<BookmarkGroup>,
}

impl Default for BookmarkConfig {
    /// A single "all tickets" bookmark with an empty query.
    fn default() -> Self {
        Self {
            groups: vec![BookmarkGroup {
                name: "all tickets".to_string(),
                entries: vec![Bookmark {
                    label: "all tickets".to_string(),
                    query: String::new(),
                }],
            }],
        }
    }
}

impl<'de> Deserialize<'de> for BookmarkConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let mut groups = Vec::with_capacity(map.len());

        for (name, entries) in map {
            let Value::Object(entries) = entries else {
                return Err(D::Error::custom(format!(
                    "bookmark group {name:?} must be an object"
                )));
            };
            let entries = entries
                .into_iter()
                .map(|(label, query)| match query {
                    Value::String(query) => Ok(Bookmark { label, query }),
                    other => Err(D::Error::custom(format!(
                        "bookmark {label:?} must map to a query string, got {other}"
                    ))),
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            groups.push(BookmarkGroup { name, entries });
        }

        Ok(Self { groups })
    }
}

impl BookmarkConfig {
    /// Parse the persisted form `{"bookmarks": {group: {label: query}}}`.
    /// A missing `bookmarks` key yields the default.
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Persisted {
            #[serde(default)]
            bookmarks: BookmarkConfig,
        }

        Ok(serde_json::from_str::<Persisted>(json)?.bookmarks)
    }

    /// Load from the persisted form, or fall back to the default when nothing
    /// has been stored yet.
    pub fn from_stored(stored: Option<&str>) -> Result<Self> {
        match stored {
            Some(json) => Self::from_json(json),
            None => Ok(Self::default()),
        }
    }

    /// Serialize to the persisted form, preserving group and entry order.
    pub fn to_json(&self) -> String {
        let groups: Map<String, Value> = self
            .groups
            .iter()
            .map(|group| {
                let entries: Map<String, Value> = group
                    .entries
                    .iter()
                    .map(|b| (b.label.clone(), Value::String(b.query.clone())))
                    .collect();
                (group.name.clone(), Value::Object(entries))
            })
            .collect();

        let mut root = Map::new();
        root.insert("bookmarks".to_string(), Value::Object(groups));
        Value::Object(root).to_string()
    }
}

/// Complete configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hosts: Hosts,
    /// Custom rules; replaces the standard set when present.
    #[serde(alias = "Xref")]
    pub xref: Option<Vec<XrefRuleConfig>>,
    pub bookmarks: BookmarkConfig,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            custom_rules = config.xref.as_ref().map_or(0, Vec::len),
            bookmark_groups = config.bookmarks.groups.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Compile the configured rules, verifying every pattern and template.
    pub fn patterns(&self) -> Result<PatternSet> {
        match &self.xref {
            Some(rules) => PatternSet::new(
                rules
                    .iter()
                    .map(|r| PatternRule::parse(&r.pattern, &r.link))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => PatternSet::standard(&self.hosts),
        }
    }
}
