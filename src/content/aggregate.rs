//! Aggregate post file: one JSON array holding many posts

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::post::{date_field, title_field, Metadata};
use super::{ContentError, MarkdownRenderer, Post, PostSource};

/// Read and parse the aggregate file; a missing file yields no posts
pub fn load_posts(path: &Path, renderer: &MarkdownRenderer) -> Result<Vec<Post>, ContentError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No aggregate post file at {:?}", path);
            return Ok(Vec::new());
        }
        Err(e) => return Err(ContentError::io(path, e)),
    };

    parse_posts(path, &content, renderer)
}

/// Parse every entry of an aggregate file; the first bad entry fails the whole read
pub fn parse_posts(
    path: &Path,
    content: &str,
    renderer: &MarkdownRenderer,
) -> Result<Vec<Post>, ContentError> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(content).map_err(|error| ContentError::InvalidAggregate {
            path: path.to_path_buf(),
            error,
        })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(path, index, entry, renderer))
        .collect()
}

fn parse_entry(
    path: &Path,
    index: usize,
    entry: serde_json::Value,
    renderer: &MarkdownRenderer,
) -> Result<Post, ContentError> {
    let source_name = format!("{}[{}]", path.display(), index);

    let metadata: Metadata = match entry {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        _ => {
            return Err(ContentError::NotAMapping { source_name });
        }
    };

    let raw = match metadata.get("content") {
        Some(serde_json::Value::String(content)) => content.clone(),
        _ => {
            return Err(ContentError::MissingField {
                source_name,
                field: "content",
            })
        }
    };

    let date = date_field(&source_name, &metadata)?;
    let title = title_field(&metadata);

    let slug = match metadata.get("slug").and_then(|slug| slug.as_str()) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => match title.as_deref().map(slug::slugify) {
            Some(slug) if !slug.is_empty() => slug,
            _ => {
                return Err(ContentError::MissingField {
                    source_name,
                    field: "slug",
                })
            }
        },
    };

    let title = title.unwrap_or_else(|| slug.clone());
    let html = renderer.render(&raw);

    Ok(Post::new(
        slug,
        title,
        date,
        raw,
        html,
        PostSource::Aggregate(path.to_path_buf()),
        metadata,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<Vec<Post>, ContentError> {
        parse_posts(Path::new("blog.json"), content, &MarkdownRenderer::new())
    }

    #[test]
    fn test_single_entry() {
        let posts = parse(r#"[{"slug":"x","date":"2024-02-01","content":"**bold**"}]"#).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "x");
        assert_eq!(posts[0].title, "x");
        assert!(posts[0].html.contains("<strong>bold</strong>"));
        assert_eq!(posts[0].date.format("%Y-%m-%d").to_string(), "2024-02-01");
    }

    #[test]
    fn test_html_matches_markdown_rendering() {
        let renderer = MarkdownRenderer::new();
        let content = "## Notes\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        let raw = json!([{ "slug": "t", "date": "2024-02-01", "content": content }]).to_string();
        let posts = parse_posts(Path::new("blog.json"), &raw, &renderer).unwrap();
        assert_eq!(posts[0].html, renderer.render(content));
    }

    #[test]
    fn test_extra_fields_carried_through() {
        let posts = parse(
            r#"[{"slug":"x","title":"X","date":"2024-02-01","content":"hi","author":"Ada","tags":["a"]}]"#,
        )
        .unwrap();
        let post = &posts[0];
        assert_eq!(post.title, "X");
        assert_eq!(post.extra["author"], json!("Ada"));
        assert_eq!(post.tags(), vec!["a"]);
        assert!(!post.extra.contains_key("content"));
    }

    #[test]
    fn test_slug_from_title() {
        let posts =
            parse(r#"[{"title":"Launch Day Notes","date":"2024-02-01","content":"hi"}]"#).unwrap();
        assert_eq!(posts[0].slug, "launch-day-notes");
    }

    #[test]
    fn test_empty_array() {
        assert!(parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse("[{"),
            Err(ContentError::InvalidAggregate { .. })
        ));
        assert!(matches!(
            parse(r#"{"slug":"x"}"#),
            Err(ContentError::InvalidAggregate { .. })
        ));
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(matches!(
            parse(r#"[{"slug":"x","date":"2024-02-01"}]"#),
            Err(ContentError::MissingField { field: "content", .. })
        ));
        assert!(matches!(
            parse(r#"[{"slug":"x","content":"hi"}]"#),
            Err(ContentError::MissingField { field: "date", .. })
        ));
        assert!(matches!(
            parse(r#"[{"date":"2024-02-01","content":"hi"}]"#),
            Err(ContentError::MissingField { field: "slug", .. })
        ));
        assert!(matches!(
            parse(r#"["just a string"]"#),
            Err(ContentError::NotAMapping { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let posts = load_posts(&dir.path().join("blog.json"), &MarkdownRenderer::new()).unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blog.json");
        fs::write(
            &path,
            r#"[{"slug":"a","date":"2024-01-01","content":"A"},{"slug":"b","date":"2024-03-01","content":"B"}]"#,
        )
        .unwrap();

        let posts = load_posts(&path, &MarkdownRenderer::new()).unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "b"]);
        assert_eq!(posts[0].source, PostSource::Aggregate(path.clone()));
    }
}
