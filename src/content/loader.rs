//! Post loader - merges markdown posts and the aggregate file into one timeline

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{aggregate, frontmatter, ContentError, MarkdownRenderer, Post};
use crate::Folio;

/// Loads posts fresh from disk on every call
pub struct PostLoader {
    blog_dir: PathBuf,
    blog_json: PathBuf,
    strict: bool,
    renderer: MarkdownRenderer,
}

impl PostLoader {
    /// Create a new post loader
    pub fn new(folio: &Folio) -> Self {
        let highlight = &folio.config.highlight;
        Self {
            blog_dir: folio.blog_dir.clone(),
            blog_json: folio.blog_json.clone(),
            strict: folio.config.strict_posts,
            renderer: MarkdownRenderer::with_options(&highlight.theme, highlight.line_number),
        }
    }

    /// Load every `*.md` post directly inside the blog directory, ordered by file name
    pub fn load_markdown_posts(&self) -> Result<Vec<Post>, ContentError> {
        if !self.blog_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&self.blog_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !(path.is_file() && is_markdown_file(path)) {
                continue;
            }

            match self.load_markdown_post(path) {
                Ok(post) => posts.push(post),
                Err(e) => self.tolerate(e)?,
            }
        }

        Ok(posts)
    }

    fn load_markdown_post(&self, path: &Path) -> Result<Post, ContentError> {
        let content = fs::read_to_string(path).map_err(|e| ContentError::io(path, e))?;
        frontmatter::parse_post(path, &content, &self.renderer)
    }

    /// Load the aggregate file; missing means empty
    pub fn load_aggregate_posts(&self) -> Result<Vec<Post>, ContentError> {
        match aggregate::load_posts(&self.blog_json, &self.renderer) {
            Ok(posts) => Ok(posts),
            Err(e) => self.tolerate(e).map(|_| Vec::new()),
        }
    }

    /// All posts, newest first.
    ///
    /// Markdown posts come before aggregate posts in the concatenation and the
    /// sort is stable, so equal dates keep that order. Duplicate slugs are kept.
    pub fn load_all(&self) -> Result<Vec<Post>, ContentError> {
        let mut posts = self.load_markdown_posts()?;
        posts.extend(self.load_aggregate_posts()?);

        posts.sort_by(|a, b| b.date.cmp(&a.date));

        for post in duplicate_slugs(&posts) {
            tracing::debug!("Duplicate slug {:?} from {}", post.slug, post.source);
        }
        Ok(posts)
    }

    /// Warn once about posts whose slug is shadowed by a newer post
    pub fn report_duplicates(&self) {
        match self.load_all() {
            Ok(posts) => {
                for post in duplicate_slugs(&posts) {
                    tracing::warn!(
                        "Duplicate slug {:?} from {}; lookups resolve to the newest post",
                        post.slug,
                        post.source
                    );
                }
            }
            Err(e) => tracing::warn!("Failed to load posts: {}", e),
        }
    }

    /// Look up one post; with duplicate slugs the newest wins
    pub fn find(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        Ok(self.load_all()?.into_iter().find(|post| post.slug == slug))
    }

    /// Skip a bad post with a warning, or fail in strict mode
    fn tolerate(&self, error: ContentError) -> Result<(), ContentError> {
        if self.strict {
            return Err(error);
        }
        tracing::warn!("Skipping post: {}", error);
        Ok(())
    }
}

/// Posts shadowed by an earlier (newer) post with the same slug
fn duplicate_slugs(posts: &[Post]) -> Vec<&Post> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter(|post| !seen.insert(post.slug.as_str()))
        .collect()
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    struct Site {
        _dir: TempDir,
        folio: Folio,
    }

    impl Site {
        fn new(strict: bool) -> Self {
            let dir = TempDir::new().unwrap();
            let config = SiteConfig {
                strict_posts: strict,
                ..Default::default()
            };
            let folio = Folio::with_config(dir.path(), config);
            fs::create_dir_all(&folio.blog_dir).unwrap();
            Self { _dir: dir, folio }
        }

        fn post(&self, name: &str, date: &str, body: &str) {
            let content = format!("---\ntitle: {name}\ndate: {date}\n---\n{body}\n");
            fs::write(self.folio.blog_dir.join(name), content).unwrap();
        }

        fn aggregate(&self, json: &str) {
            fs::write(&self.folio.blog_json, json).unwrap();
        }

        fn loader(&self) -> PostLoader {
            self.folio.post_loader()
        }
    }

    fn slugs(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn test_merged_posts_sorted_newest_first() {
        let site = Site::new(false);
        site.post("old.md", "2023-01-01", "Old");
        site.post("new.md", "2024-06-01", "New");
        site.aggregate(
            r#"[{"slug":"middle","date":"2023-09-01","content":"M"},
                {"slug":"newest","date":"2024-06-01T12:00:00","content":"N"}]"#,
        );

        let posts = site.loader().load_all().unwrap();
        assert_eq!(slugs(&posts), ["newest", "new", "middle", "old"]);
        assert!(posts.windows(2).all(|pair| pair[0].date >= pair[1].date));
    }

    #[test]
    fn test_equal_dates_keep_markdown_first() {
        let site = Site::new(false);
        site.post("b.md", "2024-01-01", "B");
        site.post("a.md", "2024-01-01", "A");
        site.aggregate(r#"[{"slug":"c","date":"2024-01-01","content":"C"}]"#);

        let posts = site.loader().load_all().unwrap();
        assert_eq!(slugs(&posts), ["a", "b", "c"]);
    }

    #[test]
    fn test_only_top_level_markdown_files() {
        let site = Site::new(false);
        site.post("top.md", "2024-01-01", "Top");
        fs::write(site.folio.blog_dir.join("notes.txt"), "ignored").unwrap();
        let nested = site.folio.blog_dir.join("drafts");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("draft.md"), "---\ndate: 2024-01-01\n---\n").unwrap();

        let posts = site.loader().load_markdown_posts().unwrap();
        assert_eq!(slugs(&posts), ["top"]);
    }

    #[test]
    fn test_no_sources_is_empty() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        assert!(folio.post_loader().load_all().unwrap().is_empty());
    }

    #[test]
    fn test_find() {
        let site = Site::new(false);
        site.post("hello-world.md", "2024-01-01", "# Hi");
        site.aggregate(r#"[{"slug":"x","date":"2024-02-01","content":"**bold**"}]"#);

        let loader = site.loader();
        let post = loader.find("hello-world").unwrap().unwrap();
        assert!(post.html.contains("Hi"));
        assert!(loader.find("x").unwrap().is_some());
        assert!(loader.find("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_slugs_listed_and_newest_found() {
        let site = Site::new(false);
        site.post("dup.md", "2023-01-01", "from markdown");
        site.aggregate(r#"[{"slug":"dup","date":"2024-01-01","content":"from json"}]"#);

        let loader = site.loader();
        assert_eq!(loader.load_all().unwrap().len(), 2);
        let found = loader.find("dup").unwrap().unwrap();
        assert!(found.html.contains("from json"));
    }

    #[test]
    fn test_duplicate_slugs_are_the_older_posts() {
        let site = Site::new(false);
        site.post("dup.md", "2023-01-01", "from markdown");
        site.post("solo.md", "2022-01-01", "alone");
        site.aggregate(r#"[{"slug":"dup","date":"2024-01-01","content":"from json"}]"#);

        let posts = site.loader().load_all().unwrap();
        let shadowed = duplicate_slugs(&posts);
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].slug, "dup");
        assert!(shadowed[0].html.contains("from markdown"));
    }

    #[test]
    fn test_lenient_skips_bad_posts() {
        let site = Site::new(false);
        site.post("good.md", "2024-01-01", "Good");
        site.post("bad.md", "not-a-date", "Bad");
        fs::write(site.folio.blog_dir.join("nofm.md"), "no front matter").unwrap();
        site.aggregate("[{broken");

        let posts = site.loader().load_all().unwrap();
        assert_eq!(slugs(&posts), ["good"]);
    }

    #[test]
    fn test_strict_propagates_errors() {
        let site = Site::new(true);
        site.post("bad.md", "not-a-date", "Bad");
        assert!(matches!(
            site.loader().load_all(),
            Err(ContentError::InvalidDate { .. })
        ));

        let site = Site::new(true);
        site.aggregate("[{broken");
        assert!(matches!(
            site.loader().load_all(),
            Err(ContentError::InvalidAggregate { .. })
        ));
    }
}
