/*
 * Responsibility
 * - JSON body を受け、壊れた body は AppError (400 / INVALID_BODY) で返す
 *   (axum::Json のままだと text/plain の 422 になるため)
 */
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "rejected request body");
                AppError::bad_request("INVALID_BODY", rejection.body_text())
            })?;
        Ok(Self(value))
    }
}
