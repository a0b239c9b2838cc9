//! JSON body extractor that also runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use pss_core::error::AppError;

use crate::error::ApiError;

/// Deserialises a JSON body and validates it.
///
/// Missing or wrong `Content-Type`, malformed JSON and rule violations all
/// become `VALIDATION_FAILED`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(ValidatedJson(value))
    }
}
