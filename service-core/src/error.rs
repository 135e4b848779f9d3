use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

/// Field key under which body-level (not field-specific) schema errors are filed.
pub const BODY_FIELD: &str = "__all__";

/// Param carrying the position (array index or character offset) of a schema error.
pub const INDEX_PARAM: &str = "index";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {errors}")]
    ValidationError {
        errors: ValidationErrors,
        /// Declared field order; fields not listed sort after, by name.
        field_order: &'static [&'static str],
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    /// Schema failure reported in the order the fields are declared.
    pub fn validation(errors: ValidationErrors, field_order: &'static [&'static str]) -> Self {
        AppError::ValidationError {
            errors,
            field_order,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::validation(errors, &[])
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// One entry of a 422 response body.
#[derive(Debug, Serialize, PartialEq)]
pub struct ValidationDetail {
    pub loc: Vec<Value>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Flatten validator errors into `loc`/`msg`/`type` entries. Fields come in
/// `field_order` (unlisted ones after, by name), then by position.
pub fn validation_details(
    errors: &ValidationErrors,
    field_order: &[&str],
) -> Vec<ValidationDetail> {
    let mut fields: Vec<(String, &Vec<ValidationError>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs))
        .collect();
    let rank = |field: &str| {
        field_order
            .iter()
            .position(|f| *f == field)
            .unwrap_or(field_order.len())
    };
    fields.sort_by(|a, b| (rank(a.0.as_str()), &a.0).cmp(&(rank(b.0.as_str()), &b.0)));

    let mut details = Vec::new();
    for (field, errs) in fields {
        let mut entries: Vec<(Option<u64>, ValidationDetail)> = errs
            .iter()
            .map(|err| {
                let index = err.params.get(INDEX_PARAM).and_then(Value::as_u64);

                let mut loc = vec![Value::from("body")];
                if field != BODY_FIELD {
                    loc.push(Value::from(field.as_str()));
                }
                if let Some(i) = index {
                    loc.push(Value::from(i));
                }

                let msg = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());

                (
                    index,
                    ValidationDetail {
                        loc,
                        msg,
                        kind: err.code.to_string(),
                    },
                )
            })
            .collect();
        entries.sort_by_key(|(index, _)| *index);
        details.extend(entries.into_iter().map(|(_, detail)| detail));
    }

    details
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::ValidationError {
                errors,
                field_order,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!(validation_details(&errors, field_order)),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Value::from(msg)),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Value::from("Method Not Allowed"),
            ),
            AppError::InternalError(err) => {
                tracing::error!(error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Value::from(err.to_string()))
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, Value::from(err.to_string()))
            }
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
