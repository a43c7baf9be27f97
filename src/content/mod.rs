//! Content module - blog posts, their two sources, and testimonials

pub mod aggregate;
mod error;
pub mod frontmatter;
pub mod loader;
mod markdown;
mod post;
mod testimonial;

pub use error::ContentError;
pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, TocEntry};
pub use post::{Post, PostSource};
pub use testimonial::{load_testimonials, Testimonial};
