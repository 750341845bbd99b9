/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

use crate::services::store::StoreError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("store error")]
    Store(#[from] StoreError),
    #[error("malformed record {key}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The record was written but its time index entry was not.
    #[error("time index {index} not updated")]
    Index {
        index: String,
        #[source]
        source: StoreError,
    },
    #[error("record serialization failed")]
    Serialize(#[source] serde_json::Error),
}
