//! Domain model for the helpdesk knowledge base.
//!
//! Value types only: sections, articles, attachments and translations, plus
//! the pure derivations the sync engine needs (inline image extraction and
//! body rewriting). Nothing here talks to the network or the filesystem.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCALE: &str = "en-us";

/// Permission group every uploaded article is assigned to.
pub const DEFAULT_PERMISSION_GROUP_ID: i64 = 567_571;

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_draft() -> bool {
    true
}

fn default_permission_group_id() -> i64 {
    DEFAULT_PERMISSION_GROUP_ID
}

/// A section to be created remotely, derived from a directory named
/// `"<position>-<name>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSection {
    pub name: String,
    pub parent_section_id: Option<i64>,
    pub locale: String,
    pub position: i32,
}

impl NewSection {
    /// Builds a section from a directory name, stripping the leading
    /// `"<position>-"` prefix. Position defaults to 0 when the separator is
    /// absent or the prefix is not an integer.
    pub fn from_dir_name(dir_name: &str, parent_section_id: Option<i64>) -> Self {
        let (position, name) = match dir_name.split_once('-') {
            Some((prefix, rest)) => (prefix.parse().unwrap_or(0), rest.to_string()),
            None => (0, dir_name.to_string()),
        };
        NewSection {
            name,
            parent_section_id,
            locale: default_locale(),
            position,
        }
    }
}

/// A section as the remote system reports it. Owned remotely; the engine
/// reads, deletes and recreates but never mutates one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingSection {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_section_id: Option<i64>,
    #[serde(default = "default_locale")]
    pub locale: String,
}

/// An article, local-side until `id` is populated by the remote create.
///
/// `path` points at the source HTML file and is only used to resolve
/// relative image references; it is never serialized to the remote body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(skip_serializing, default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "section_id")]
    pub parent_section_id: i64,
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_draft")]
    pub draft: bool,
    #[serde(default = "default_permission_group_id")]
    pub permission_group_id: i64,
    #[serde(default)]
    pub user_segment_id: Option<i64>,
    #[serde(skip, default)]
    pub path: PathBuf,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        parent_section_id: i64,
        path: impl Into<PathBuf>,
    ) -> Self {
        Article {
            id: None,
            title: title.into(),
            parent_section_id,
            body: body.into(),
            locale: default_locale(),
            draft: true,
            permission_group_id: DEFAULT_PERMISSION_GROUP_ID,
            user_segment_id: None,
            path: path.into(),
        }
    }

    /// All `<img src="...">` references in the body whose source is not an
    /// absolute http(s) URL, in document order. Duplicates are possible.
    pub fn body_images(&self) -> Vec<String> {
        image_tag()
            .captures_iter(&self.body)
            .map(|caps| caps[1].to_string())
            .filter(|src| !is_hosted(src))
            .collect()
    }

    /// Returns a copy of the article with every mapped relative image source
    /// replaced by its hosted URL. Unmapped references and absolute http(s)
    /// references pass through unchanged.
    pub fn with_hosted_images(&self, mapping: &HashMap<String, String>) -> Article {
        let body = image_tag()
            .replace_all(&self.body, |caps: &regex::Captures| {
                let src = &caps[1];
                match mapping.get(src) {
                    Some(url) if !is_hosted(src) => caps[0].replacen(src, url, 1),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned();
        Article {
            body,
            ..self.clone()
        }
    }
}

/// An image hosted remotely, to be linked to its owning article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleAttachment {
    pub id: i64,
    #[serde(default)]
    pub article_id: Option<i64>,
    pub content_url: String,
    pub inline: bool,
}

/// A translation of an article; publishing flips `draft` to false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub source_id: i64,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub draft: bool,
}

impl Translation {
    pub fn published(&self) -> Translation {
        Translation {
            draft: false,
            ..self.clone()
        }
    }
}

fn is_hosted(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

fn image_tag() -> &'static Regex {
    static IMAGE_TAG: OnceLock<Regex> = OnceLock::new();
    IMAGE_TAG.get_or_init(|| Regex::new(r#"<img src="(.*?)"[^>]*?>"#).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_with_body(body: &str) -> Article {
        Article::new("a title", body, 42, "/tmp/docs/a title.html")
    }

    #[test]
    fn section_name_strips_position_prefix() {
        let section = NewSection::from_dir_name("3-Getting Started", None);
        assert_eq!(section.name, "Getting Started");
        assert_eq!(section.position, 3);
        assert_eq!(section.locale, "en-us");
        assert_eq!(section.parent_section_id, None);
    }

    #[test]
    fn section_without_separator_defaults_position_to_zero() {
        let section = NewSection::from_dir_name("Advanced", Some(7));
        assert_eq!(section.name, "Advanced");
        assert_eq!(section.position, 0);
        assert_eq!(section.parent_section_id, Some(7));
    }

    #[test]
    fn section_name_only_strips_first_separator() {
        let section = NewSection::from_dir_name("12-How-To", None);
        assert_eq!(section.name, "How-To");
        assert_eq!(section.position, 12);
    }

    #[test]
    fn body_images_ignores_absolute_urls() {
        let article = article_with_body(
            r#"<p>one</p><img src="pic/a.png" alt="a"><img src="https://cdn.example.com/b.png"><img src="b.png">"#,
        );
        assert_eq!(article.body_images(), vec!["pic/a.png", "b.png"]);
    }

    #[test]
    fn body_images_preserves_order_and_duplicates() {
        let article = article_with_body(r#"<img src="x.png"><img src="y.png"><img src="x.png">"#);
        assert_eq!(article.body_images(), vec!["x.png", "y.png", "x.png"]);
    }

    #[test]
    fn with_hosted_images_rewrites_mapped_sources_only() {
        let article = article_with_body(
            r#"<img src="a.png" alt="a"><img src="keep.png"><img src="https://cdn.example.com/c.png">"#,
        );
        let mapping = HashMap::from([(
            "a.png".to_string(),
            "https://helpdesk.example.com/attachments/1".to_string(),
        )]);
        let rewritten = article.with_hosted_images(&mapping);
        assert_eq!(
            rewritten.body,
            r#"<img src="https://helpdesk.example.com/attachments/1" alt="a"><img src="keep.png"><img src="https://cdn.example.com/c.png">"#
        );
    }

    #[test]
    fn with_hosted_images_is_idempotent() {
        let article = article_with_body(r#"<img src="a.png">"#);
        let mapping = HashMap::from([(
            "a.png".to_string(),
            "https://helpdesk.example.com/attachments/1".to_string(),
        )]);
        let once = article.with_hosted_images(&mapping);
        let twice = once.with_hosted_images(&mapping);
        assert_eq!(once.body, twice.body);
    }

    #[test]
    fn article_serialization_omits_id_and_path() {
        let mut article = article_with_body("<p>hi</p>");
        article.id = Some(99);
        let json = serde_json::to_value(&article).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("path").is_none());
        assert_eq!(json["permission_group_id"], DEFAULT_PERMISSION_GROUP_ID);
        assert_eq!(json["draft"], true);
    }

    #[test]
    fn article_deserializes_from_sparse_create_response() {
        let article: Article =
            serde_json::from_value(serde_json::json!({"id": 37486578, "section_id": 98838}))
                .unwrap();
        assert_eq!(article.id, Some(37486578));
        assert_eq!(article.parent_section_id, 98838);
        assert_eq!(article.locale, "en-us");
        assert!(article.draft);
    }

    #[test]
    fn published_translation_clears_draft() {
        let translation = Translation {
            source_id: 1,
            source_type: Some("Article".into()),
            locale: "en-us".into(),
            draft: true,
        };
        assert!(!translation.published().draft);
    }
}
