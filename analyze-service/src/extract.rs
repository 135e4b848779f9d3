//! Schema-checked JSON body extraction.
//!
//! `ValidatedJson<T>` reads the raw body, checks it against `T`'s declared
//! schema and only then deserializes it. Every schema violation is collected
//! into one `validator::ValidationErrors`, so the caller receives a single 422
//! listing all failing fields instead of the first serde error.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{error::Category, Map, Value};
use service_core::error::{AppError, BODY_FIELD, INDEX_PARAM};
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

/// A request body type with a declared shape.
pub trait Schema: DeserializeOwned {
    /// Declared fields, in the order errors are reported.
    const FIELDS: &'static [&'static str];

    /// Check the decoded JSON object against the declared fields.
    fn check(body: &Map<String, Value>) -> Result<(), ValidationErrors>;
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: Schema + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Body read failures (e.g. over the size limit) keep axum's own status
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        parse_body(&bytes)
            .map(ValidatedJson)
            .map_err(IntoResponse::into_response)
    }
}

/// Decode and schema-check a raw JSON body.
pub fn parse_body<T: Schema>(bytes: &[u8]) -> Result<T, AppError> {
    if bytes.is_empty() {
        return Err(body_error("missing", "Field required", None).into());
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        let offset = if e.classify() == Category::Eof {
            char_offset(bytes, bytes.len())
        } else {
            error_offset(bytes, e.line(), e.column())
        };
        body_error("json_invalid", "JSON decode error", Some(offset))
    })?;

    let object = match value {
        Value::Object(object) => object,
        Value::Null => return Err(body_error("missing", "Field required", None).into()),
        _ => {
            return Err(body_error(
                "model_attributes_type",
                "Input should be a valid dictionary or object to extract fields from",
                None,
            )
            .into())
        }
    };

    T::check(&object).map_err(|errors| AppError::validation(errors, T::FIELDS))?;

    // The schema check already guarantees the shape, so a failure here is a
    // mismatch between `check` and the serde derive.
    Ok(serde_json::from_value(Value::Object(object))?)
}

/// Require `field` to be present and to be an array whose every element is a
/// string. Violations are added to `errors`.
pub fn require_string_list(
    body: &Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) {
    match body.get(field) {
        None => errors.add(field, schema_error("missing", "Field required", None)),
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                if !item.is_string() {
                    errors.add(
                        field,
                        schema_error("string_type", "Input should be a valid string", Some(index)),
                    );
                }
            }
        }
        Some(_) => errors.add(
            field,
            schema_error("list_type", "Input should be a valid list", None),
        ),
    }
}

fn schema_error(code: &'static str, message: &'static str, index: Option<usize>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    if let Some(index) = index {
        err.add_param(Cow::from(INDEX_PARAM), &index);
    }
    err
}

fn body_error(code: &'static str, message: &'static str, index: Option<usize>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(BODY_FIELD, schema_error(code, message, index));
    errors
}

/// Convert serde_json's 1-based line/byte-column into a 0-based character
/// offset into the body.
fn error_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = bytes
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    char_offset(bytes, line_start + column.saturating_sub(1))
}

/// Number of characters in the first `byte_offset` bytes.
fn char_offset(bytes: &[u8], byte_offset: usize) -> usize {
    let end = byte_offset.min(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).chars().count()
}
