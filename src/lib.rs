//! folio-rs: a small marketing site server
//!
//! Serves a homepage with testimonials, takes contact form submissions
//! (logged to CSV, announced by email) and renders a blog merged from
//! front-matter markdown files and an aggregate JSON file.

pub mod commands;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The site: configuration plus resolved file locations
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory scanned for `*.md` posts
    pub blog_dir: PathBuf,
    /// Aggregate post file
    pub blog_json: PathBuf,
    /// Testimonials file, read once at startup
    pub testimonials_path: PathBuf,
    /// Append-only contact submission log
    pub submissions_path: PathBuf,
    /// Static assets served under /static
    pub static_dir: PathBuf,
}

impl Folio {
    /// Create a new Folio instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Resolve the configured paths against `base_dir`
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            blog_dir: base_dir.join(&config.blog_dir),
            blog_json: base_dir.join(&config.blog_json),
            testimonials_path: base_dir.join(&config.testimonials),
            submissions_path: base_dir.join(&config.submissions),
            static_dir: base_dir.join(&config.static_dir),
            config,
            base_dir,
        }
    }

    /// Build a post loader for this site
    pub fn post_loader(&self) -> content::loader::PostLoader {
        content::loader::PostLoader::new(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str) -> Result<PathBuf> {
        commands::new::create_post(self, title)
    }
}
