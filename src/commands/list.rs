//! List blog posts

use anyhow::Result;

use crate::Folio;

/// Print every post, newest first
pub fn run(folio: &Folio) -> Result<()> {
    let posts = folio.post_loader().load_all()?;

    println!("Posts ({}):", posts.len());
    for post in posts {
        println!(
            "  {} - {} [{}] ({})",
            post.date.format("%Y-%m-%d"),
            post.title,
            post.slug,
            post.source
        );
    }

    Ok(())
}
