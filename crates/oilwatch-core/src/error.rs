use thiserror::Error;

/// Validation and contract errors exposed by `oilwatch-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unrecognized date '{value}', expected YYYY-MM-DD, DD-Mon-YY or 'Mon DD, YYYY'")]
    InvalidDate { value: String },

    #[error(
        "invalid event category '{value}', expected one of Conflict, Economic, OPEC Policy, Sanctions, Health"
    )]
    InvalidCategory { value: String },
    #[error("invalid delta method '{value}', expected neighbor or segment-mean")]
    InvalidDeltaMethod { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    NonPositiveValue { field: &'static str },
    #[error("field '{field}' is not a number: '{value}'")]
    NotANumber { field: &'static str, value: String },
    #[error("field '{field}' cannot be blank")]
    BlankField { field: &'static str },

    #[error("tolerance must be a finite, non-negative number")]
    InvalidTolerance,

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}
