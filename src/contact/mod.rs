//! Contact form intake: CSV log plus a best-effort email notification

mod log;
mod notifier;

pub use log::SubmissionLog;
pub use notifier::{compose_body, DisabledNotifier, Notifier, SmtpNotifier};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fields posted by the contact form. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub project_type: Option<String>,
    pub message: Option<String>,
}

impl ContactForm {
    /// Build from raw form pairs; a repeated key keeps its first value
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "firstName" => &mut form.first_name,
                "lastName" => &mut form.last_name,
                "email" => &mut form.email,
                "projectType" => &mut form.project_type,
                "message" => &mut form.message,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        form
    }
}

/// One submission as written to the log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub project_type: Option<String>,
    pub message: Option<String>,
}

impl Submission {
    /// Column names, in row order
    pub const FIELDS: [&'static str; 5] =
        ["first_name", "last_name", "email", "project_type", "message"];
}

impl From<ContactForm> for Submission {
    fn from(form: ContactForm) -> Self {
        Self {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            project_type: form.project_type,
            message: form.message,
        }
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("failed to open submission log {path}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to write submission row")]
    Write(#[from] csv::Error),

    #[error("submission log lock poisoned")]
    Poisoned,
}
