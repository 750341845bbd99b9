/*
 * Responsibility
 * - Path の `{region}` を Region として受ける (beijing / shanghai, bj / sh)
 * - 失敗時は AppError::bad_request へ変換
 */
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::{error::AppError, repos::records::Region};

#[derive(Debug, Clone, Copy)]
pub struct RegionPath(pub Region);

impl<S> FromRequestParts<S> for RegionPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("INVALID_REGION", "region is required"))?;

        raw.parse::<Region>()
            .map(Self)
            .map_err(|e| AppError::bad_request("INVALID_REGION", e.to_string()))
    }
}
