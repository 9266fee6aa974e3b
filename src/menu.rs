//! Bookmark navigation menu.

use percent_encoding::percent_decode_str;

use crate::config::BookmarkConfig;
use crate::dom::{Attribute, Dom};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroup {
    pub name: String,
    pub entries: Vec<MenuEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub groups: Vec<MenuGroup>,
}

impl Menu {
    /// Lay out `config` as menu links. An entry is active when its query
    /// equals `current_query`; with no current query nothing is active.
    pub fn build(config: &BookmarkConfig, current_query: Option<&str>) -> Self {
        let groups = config
            .groups
            .iter()
            .map(|group| MenuGroup {
                name: group.name.clone(),
                entries: group
                    .entries
                    .iter()
                    .map(|b| MenuEntry {
                        label: b.label.clone(),
                        href: format!("?q={}", b.query),
                        active: current_query == Some(b.query.as_str()),
                    })
                    .collect(),
            })
            .collect();

        Self { groups }
    }

    /// Render into the element with id `menu_id`.
    ///
    /// Each group is prepended, so the last configured group ends up first.
    pub fn render_into(&self, dom: &mut Dom, menu_id: &str) -> Result<()> {
        let menu = dom
            .get_by_id(menu_id)
            .ok_or_else(|| Error::MissingElement(menu_id.to_string()))?;

        for group in &self.groups {
            let group_el =
                dom.create_html_element("div", vec![Attribute::new("class", "gt-menu-group")]);
            dom.prepend(menu, group_el);

            let span = dom.create_html_element("span", vec![]);
            dom.append_text(span, &group.name);
            dom.append(group_el, span);

            for entry in &group.entries {
                let link = dom.create_html_element("a", vec![Attribute::new("href", &entry.href)]);
                dom.append(group_el, link);

                let class = if entry.active {
                    "gt-menu-bookmark active"
                } else {
                    "gt-menu-bookmark"
                };
                let bookmark = dom.create_html_element("div", vec![Attribute::new("class", class)]);
                dom.append_text(bookmark, &entry.label);
                dom.append(link, bookmark);
            }
        }

        Ok(())
    }
}

/// Value of parameter `name` in a URL query string (with or without the
/// leading `?`), decoded like a form submission.
pub fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode_component(key) == name)
        .map(|(_, value)| decode_component(value))
}

fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Bookmark, BookmarkGroup};
    use crate::dom::{inner_html, parse_document};

    fn config() -> BookmarkConfig {
        BookmarkConfig {
            groups: vec![
                BookmarkGroup {
                    name: "Me".to_string(),
                    entries: vec![
                        Bookmark {
                            label: "Assigned to me".to_string(),
                            query: "assignee:alice".to_string(),
                        },
                        Bookmark {
                            label: "Reported by me".to_string(),
                            query: "author:alice".to_string(),
                        },
                    ],
                },
                BookmarkGroup {
                    name: "All".to_string(),
                    entries: vec![Bookmark {
                        label: "All tickets".to_string(),
                        query: String::new(),
                    }],
                },
            ],
        }
    }

    fn active_labels(menu: &Menu) -> Vec<&str> {
        menu.groups
            .iter()
            .flat_map(|g| &g.entries)
            .filter(|e| e.active)
            .map(|e| e.label.as_str())
            .collect()
    }

    #[test]
    fn test_active_entry_matches_query() {
        let menu = Menu::build(&config(), Some("author:alice"));
        assert_eq!(active_labels(&menu), vec!["Reported by me"]);
        assert_eq!(menu.groups[0].entries[1].href, "?q=author:alice");
    }

    #[test]
    fn test_no_query_means_nothing_active() {
        let menu = Menu::build(&config(), None);
        assert!(active_labels(&menu).is_empty());
    }

    #[test]
    fn test_empty_query_activates_empty_bookmark() {
        let menu = Menu::build(&config(), Some(""));
        assert_eq!(active_labels(&menu), vec!["All tickets"]);
        assert_eq!(menu.groups[1].entries[0].href, "?q=");
    }

    #[test]
    fn test_render_prepends_groups() {
        let mut dom = parse_document(r#"<nav id="menu"><hr></nav>"#);
        let menu = Menu::build(&config(), Some("assignee:alice"));
        menu.render_into(&mut dom, "menu").unwrap();

        let nav = dom.get_by_id("menu").unwrap();
        assert_eq!(
            inner_html(&dom, nav),
            concat!(
                r#"<div class="gt-menu-group"><span>All</span>"#,
                r#"<a href="?q="><div class="gt-menu-bookmark">All tickets</div></a></div>"#,
                r#"<div class="gt-menu-group"><span>Me</span>"#,
                r#"<a href="?q=assignee:alice"><div class="gt-menu-bookmark active">Assigned to me</div></a>"#,
                r#"<a href="?q=author:alice"><div class="gt-menu-bookmark">Reported by me</div></a></div>"#,
                "<hr>",
            )
        );
    }

    #[test]
    fn test_render_requires_menu_element() {
        let mut dom = parse_document("<body></body>");
        let err = Menu::build(&config(), None)
            .render_into(&mut dom, "menu")
            .unwrap_err();
        assert!(matches!(err, Error::MissingElement(id) if id == "menu"));
    }

    #[test]
    fn test_query_param() {
        assert_eq!(
            query_param("?q=assignee%3Aalice+status:open&x=1", "q").as_deref(),
            Some("assignee:alice status:open")
        );
        assert_eq!(query_param("x=1&q=", "q").as_deref(), Some(""));
        assert_eq!(query_param("q", "q").as_deref(), Some(""));
        assert_eq!(query_param("?x=1", "q"), None);
        assert_eq!(query_param("", "q"), None);
    }
}
