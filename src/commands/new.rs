//! Create a new markdown post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Folio;

/// Scaffold `<blog_dir>/<slug>.md` with title and date front-matter
pub fn create_post(folio: &Folio, title: &str) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    fs::create_dir_all(&folio.blog_dir)?;
    let file_path = folio.blog_dir.join(format!("{}.md", slug));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    // Quote the title so YAML never reinterprets it
    let quoted_title = serde_json::to_string(title)?;
    let content = format!(
        "---\ntitle: {}\ndate: {}\n---\n\n",
        quoted_title,
        now.format("%Y-%m-%dT%H:%M:%S")
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created post {:?}", file_path);

    Ok(file_path)
}
