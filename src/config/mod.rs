//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::MailConfig;
pub use site::MailCredentials;
pub use site::SiteConfig;
pub use site::{EMAIL_PASS_VAR, EMAIL_USER_VAR};
