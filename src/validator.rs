use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use classbook_core::AppError;

pub fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();

    // nested errors (bulk items) only show up here
    if messages.is_empty() {
        messages.push(errors.to_string());
    }
    messages.sort();
    messages.join(", ")
}

/// Validation failures as a 422.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    AppError::unprocessable(anyhow!("{}", format_errors(&errors)))
}

/// JSON body extractor that runs `validator` rules after deserializing.
///
/// Malformed JSON is a 400; a well-formed body failing validation is a 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        value.validate().map_err(validation_error)?;

        Ok(ValidatedJson(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let body = rejection.body_text();
    if let Some(field) = body
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return AppError::bad_request(anyhow!("{} is required", field));
    }

    // value type errors carry their own message, e.g. a bad "HH:MM"
    match body.split_once(": ") {
        Some((_, detail)) if !detail.is_empty() => {
            AppError::bad_request(anyhow!("Invalid request body: {}", detail))
        }
        _ => AppError::bad_request(anyhow!("Invalid request body")),
    }
}
