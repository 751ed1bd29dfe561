//! Request body validation.
//!
//! [`ValidatedJson`] deserializes a JSON body and runs its
//! [`validator::Validate`] rules before the handler sees it. Both failure
//! kinds answer `400 Bad Request` with an [`ApiValidationErrors`] body.

use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use munifor_map_models::api::{ApiFieldError, ApiValidationErrors};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// A JSON body that passed validation.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    /// Unwraps the validated value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Flattens validator output into field errors, sorted by field.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<ApiFieldError> {
    let mut out: Vec<ApiFieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| ApiFieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map_or_else(|| format!("failed {} check", e.code), ToString::to_string),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Builds the `400` error returned for invalid bodies.
fn bad_request(errors: Vec<ApiFieldError>) -> actix_web::Error {
    let summary = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ");
    log::debug!("Rejected request body: {summary}");
    InternalError::from_response(
        summary,
        HttpResponse::BadRequest().json(ApiValidationErrors { errors }),
    )
    .into()
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let json = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let web::Json(value) = json.await.map_err(|e| {
                bad_request(vec![ApiFieldError {
                    field: "body".to_string(),
                    message: e.to_string(),
                }])
            })?;
            value
                .validate()
                .map_err(|errors| bad_request(field_errors(&errors)))?;
            Ok(Self(value))
        })
    }
}
