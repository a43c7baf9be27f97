//! Contact form bodies, urlencoded or multipart

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::FormRejection,
        FromRequest, Multipart, Request,
    },
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use thiserror::Error;

use crate::contact::ContactForm;

/// A contact body that could not be read; no row is written for it
#[derive(Debug, Error)]
pub enum FormBodyError {
    #[error("unreadable form body: {0}")]
    Urlencoded(#[from] FormRejection),
    #[error("unreadable multipart body: {0}")]
    Multipart(#[from] MultipartRejection),
    #[error("unreadable multipart field: {0}")]
    Field(#[from] MultipartError),
}

impl IntoResponse for FormBodyError {
    fn into_response(self) -> Response {
        match self {
            FormBodyError::Urlencoded(rejection) => rejection.into_response(),
            FormBodyError::Multipart(rejection) => rejection.into_response(),
            FormBodyError::Field(_) => {
                (StatusCode::BAD_REQUEST, "Malformed multipart form").into_response()
            }
        }
    }
}

/// Read the posted fields. File parts are ignored and a repeated key keeps its first value.
pub async fn read_contact_form(request: Request) -> Result<ContactForm, FormBodyError> {
    if !is_multipart(&request) {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &()).await?;
        return Ok(ContactForm::from_pairs(pairs));
    }

    let mut multipart = Multipart::from_request(request, &()).await?;
    let mut pairs = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        pairs.push((name, field.text().await?));
    }

    Ok(ContactForm::from_pairs(pairs))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false)
}
