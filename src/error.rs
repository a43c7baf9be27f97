//! Errors surfaced at the HTTP boundary

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::contact::ContactError;
use crate::content::ContentError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Contact(#[from] ContactError),
    #[error("template rendering failed")]
    Template(#[from] tera::Error),
    #[error("background task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Content(_) => "Blog content could not be loaded",
            AppError::Contact(_) => "Your message could not be saved",
            AppError::Template(_) => "Page could not be rendered",
            AppError::Task(_) => "Request could not be completed",
        }
    }
}

/// Log the full error chain
fn report(error: &dyn std::error::Error) {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(inner) = current {
        messages.push(inner.to_string());
        current = inner.source();
    }
    tracing::error!("Request failed: {}", messages.join(": "));
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        report(&self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.presentation_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_error_is_500() {
        let error = AppError::from(ContentError::MissingFrontMatter {
            source_name: "a.md".to_string(),
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
