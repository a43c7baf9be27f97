//! Testimonials shown on the homepage

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One client testimonial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,

    /// Additional custom fields (avatar, company, ...)
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Load testimonials once at startup; a missing file means none
pub fn load_testimonials(path: &Path) -> Result<Vec<Testimonial>> {
    if !path.exists() {
        tracing::warn!("Testimonials file {:?} not found, homepage will show none", path);
        return Ok(Vec::new());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let testimonials: Vec<Testimonial> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse testimonials in {:?}", path))?;

    tracing::debug!("Loaded {} testimonials", testimonials.len());
    Ok(testimonials)
}
