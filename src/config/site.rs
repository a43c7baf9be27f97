//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,

    // Files, relative to the site directory
    pub blog_dir: String,
    pub blog_json: String,
    pub testimonials: String,
    pub submissions: String,
    pub static_dir: String,

    // Writing
    pub date_format: String,
    /// Abort a blog request on the first malformed post instead of skipping it
    pub strict_posts: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: String::new(),
            url: "http://localhost:5000".to_string(),

            blog_dir: "blog_posts".to_string(),
            blog_json: "blog.json".to_string(),
            testimonials: "testimonials.json".to_string(),
            submissions: "submissions.csv".to_string(),
            static_dir: "static".to_string(),

            date_format: "MMMM DD, YYYY".to_string(),
            strict_posts: false,
            highlight: HighlightConfig::default(),

            mail: MailConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "InspiredGitHub".to_string(),
            line_number: false,
        }
    }
}

/// Outbound notification mail settings. Credentials come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// SMTP relay, reached with implicit TLS
    pub host: String,
    pub port: u16,
    /// Recipient; the mail user when unset
    pub receiver: Option<String>,
    pub subject: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            receiver: None,
            subject: "🚀 New Contact Form Submission".to_string(),
        }
    }
}

/// Environment variable holding the SMTP user (also the sender address)
pub const EMAIL_USER_VAR: &str = "EMAIL_USER";
/// Environment variable holding the SMTP password
pub const EMAIL_PASS_VAR: &str = "EMAIL_PASS";

/// SMTP login loaded once at startup
#[derive(Clone)]
pub struct MailCredentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl MailCredentials {
    /// Read `EMAIL_USER` / `EMAIL_PASS`; `None` unless both are set and non-empty
    pub fn from_env() -> Option<Self> {
        let user = std::env::var(EMAIL_USER_VAR).ok().filter(|v| !v.is_empty())?;
        let password = std::env::var(EMAIL_PASS_VAR).ok().filter(|v| !v.is_empty())?;
        Some(Self { user, password })
    }
}
