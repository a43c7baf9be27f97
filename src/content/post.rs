//! Post model

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::ContentError;
use crate::helpers::parse_iso_datetime;

/// Metadata keys the parsers set themselves; never carried in `extra`
pub const RESERVED_KEYS: [&str; 5] = ["slug", "html", "date", "title", "content"];

/// Where a post was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostSource {
    /// One markdown file with front-matter
    Markdown(PathBuf),
    /// An entry of the aggregate JSON file
    Aggregate(PathBuf),
}

impl fmt::Display for PostSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostSource::Markdown(path) => write!(f, "{}", path.display()),
            PostSource::Aggregate(path) => write!(f, "{} (aggregate)", path.display()),
        }
    }
}

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Lookup key and URL segment
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: DateTime<FixedOffset>,

    /// Rendered HTML content
    pub html: String,

    /// Raw markdown content
    #[serde(skip)]
    pub raw: String,

    #[serde(skip)]
    pub source: PostSource,

    /// Remaining metadata (tags, author, ...) in source order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Post {
    /// Build a post, dropping reserved keys from `extra`
    pub fn new(
        slug: String,
        title: String,
        date: DateTime<FixedOffset>,
        raw: String,
        html: String,
        source: PostSource,
        mut extra: IndexMap<String, serde_json::Value>,
    ) -> Self {
        extra.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
        Self {
            slug,
            title,
            date,
            html,
            raw,
            source,
            extra,
        }
    }

    /// Tags from the `tags` metadata field, as a string or a list of strings
    pub fn tags(&self) -> Vec<String> {
        match self.extra.get("tags") {
            Some(serde_json::Value::String(tag)) => vec![tag.clone()],
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Metadata fields as read from either post source
pub(crate) type Metadata = IndexMap<String, serde_json::Value>;

/// Parse the required `date` field
pub(crate) fn date_field(
    source_name: &str,
    metadata: &Metadata,
) -> Result<DateTime<FixedOffset>, ContentError> {
    let value = metadata.get("date").ok_or_else(|| ContentError::MissingField {
        source_name: source_name.to_string(),
        field: "date",
    })?;

    let raw = match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    parse_iso_datetime(&raw).ok_or(ContentError::InvalidDate {
        source_name: source_name.to_string(),
        value: raw,
    })
}

/// The `title` field as text, if present
pub(crate) fn title_field(metadata: &Metadata) -> Option<String> {
    match metadata.get("title")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(extra: IndexMap<String, serde_json::Value>) -> Post {
        Post::new(
            "hello".into(),
            "Hello".into(),
            parse_iso_datetime("2024-01-01").unwrap(),
            "# Hi".into(),
            "<h1>Hi</h1>".into(),
            PostSource::Markdown(PathBuf::from("blog_posts/hello.md")),
            extra,
        )
    }

    #[test]
    fn test_reserved_keys_are_dropped() {
        let mut extra = IndexMap::new();
        extra.insert("slug".to_string(), json!("other"));
        extra.insert("html".to_string(), json!("<p>x</p>"));
        extra.insert("author".to_string(), json!("Ada"));
        let post = sample(extra);
        assert_eq!(post.extra.len(), 1);
        assert_eq!(post.extra["author"], json!("Ada"));
    }

    #[test]
    fn test_serialize_flattens_extra() {
        let mut extra = IndexMap::new();
        extra.insert("author".to_string(), json!("Ada"));
        let value = serde_json::to_value(sample(extra)).unwrap();
        assert_eq!(value["slug"], json!("hello"));
        assert_eq!(value["author"], json!("Ada"));
        assert!(value["date"]
            .as_str()
            .is_some_and(|date| date.starts_with("2024-01-01T00:00:00")));
        assert!(value.get("raw").is_none());
    }

    #[test]
    fn test_tags() {
        let mut extra = IndexMap::new();
        extra.insert("tags".to_string(), json!(["rust", "web"]));
        assert_eq!(sample(extra).tags(), vec!["rust", "web"]);

        let mut extra = IndexMap::new();
        extra.insert("tags".to_string(), json!("notes"));
        assert_eq!(sample(extra).tags(), vec!["notes"]);

        assert!(sample(IndexMap::new()).tags().is_empty());
    }

    #[test]
    fn test_date_field_errors() {
        let mut metadata = Metadata::new();
        assert!(matches!(
            date_field("a.md", &metadata),
            Err(ContentError::MissingField { field: "date", .. })
        ));

        metadata.insert("date".to_string(), json!("not a date"));
        assert!(matches!(
            date_field("a.md", &metadata),
            Err(ContentError::InvalidDate { value, .. }) if value == "not a date"
        ));

        metadata.insert("date".to_string(), json!("2024-05-06"));
        let date = date_field("a.md", &metadata).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-05-06");
    }

    #[test]
    fn test_title_field() {
        let mut metadata = Metadata::new();
        assert_eq!(title_field(&metadata), None);
        metadata.insert("title".to_string(), json!(2024));
        assert_eq!(title_field(&metadata), Some("2024".to_string()));
        metadata.insert("title".to_string(), json!("Hello"));
        assert_eq!(title_field(&metadata), Some("Hello".to_string()));
    }
}
