use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor that runs `validator` rules after deserializing, rejecting
/// with the per-field error map so callers can resubmit a corrected form.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, String);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

        payload.validate().map_err(|e| {
            let body = serde_json::to_string(&e).unwrap_or_else(|_| e.to_string());
            (StatusCode::UNPROCESSABLE_ENTITY, body)
        })?;

        Ok(Self(payload))
    }
}
