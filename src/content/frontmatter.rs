//! Front-matter parsing

use std::path::Path;

use super::post::{date_field, title_field, Metadata};
use super::{ContentError, MarkdownRenderer, Post, PostSource};

/// Marker line opening and closing the metadata block
const DELIMITER: &str = "---";

/// Front-matter data from a post
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    /// Every key of the YAML block, in source order
    pub metadata: Metadata,
}

impl FrontMatter {
    /// Split content into (yaml block, body).
    ///
    /// The first line must be `---`; the block ends at the next line that is
    /// exactly `---`.
    pub fn split(content: &str) -> Option<(&str, &str)> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut lines = content.split_inclusive('\n');

        let first = lines.next()?;
        if first.trim_end() != DELIMITER {
            return None;
        }

        let block_start = first.len();
        let mut offset = block_start;
        for line in lines {
            if line.trim_end() == DELIMITER {
                let body_start = offset + line.len();
                return Some((&content[block_start..offset], &content[body_start..]));
            }
            offset += line.len();
        }

        None
    }

    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse<'a>(source_name: &str, content: &'a str) -> Result<(Self, &'a str), ContentError> {
        let (yaml, body) = Self::split(content).ok_or_else(|| ContentError::MissingFrontMatter {
            source_name: source_name.to_string(),
        })?;

        let invalid = |error| ContentError::InvalidMetadata {
            source_name: source_name.to_string(),
            error,
        };

        let metadata = match serde_yaml::from_str::<serde_yaml::Value>(yaml).map_err(invalid)? {
            serde_yaml::Value::Null => Metadata::new(),
            value @ serde_yaml::Value::Mapping(_) => {
                serde_yaml::from_value::<Metadata>(value).map_err(invalid)?
            }
            _ => {
                return Err(ContentError::NotAMapping {
                    source_name: source_name.to_string(),
                })
            }
        };

        Ok((FrontMatter { metadata }, body))
    }
}

/// Parse one markdown post; the slug is the file name without extension.
///
/// Metadata is applied first, then the parser's own `slug`, `html` and `date`
/// replace any same-named keys.
pub fn parse_post(
    path: &Path,
    content: &str,
    renderer: &MarkdownRenderer,
) -> Result<Post, ContentError> {
    let source_name = path.display().to_string();
    let (fm, body) = FrontMatter::parse(&source_name, content)?;

    let slug = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "untitled".to_string());

    let date = date_field(&source_name, &fm.metadata)?;
    let title = title_field(&fm.metadata).unwrap_or_else(|| slug.clone());

    let raw = body.trim().to_string();
    let html = renderer.render(&raw);

    Ok(Post::new(
        slug,
        title,
        date,
        raw,
        html,
        PostSource::Markdown(path.to_path_buf()),
        fm.metadata,
    ))
}
