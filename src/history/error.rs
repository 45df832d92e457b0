use thiserror::Error;

use crate::api::ApiError;

/// A raw record the per-kind transform cannot classify
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("record {id} is missing field `{field}`")]
    MissingField { id: i64, field: &'static str },

    #[error("record {id} has invalid `{field}`: {value}")]
    InvalidField {
        id: i64,
        field: &'static str,
        value: String,
    },

    #[error("record {id} has unknown action: {action}")]
    UnknownAction { id: i64, action: String },

    #[error("record {id} belongs to unknown futures group {group_id}")]
    UnknownFuturesGroup { id: i64, group_id: u64 },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to transform record: {0}")]
    Transform(#[from] TransformError),

    #[error("Record id is not an integer: {0}")]
    InvalidRecordId(String),

    #[error("Record {0} is not a JSON object")]
    InvalidRecord(i64),
}
