//! Response interpretation.
//!
//! The backend signals errors in-band: a JSON object with a `code` key is an
//! error record, `null` means "no result", anything else is the payload.

use rb_core::error::{ApiError, ApiResult, Status};
use rb_core::models::Blob;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Turns a decoded JSON body into the payload or the error it encodes.
pub fn interpret<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    match interpret_optional(body)? {
        Some(value) => Ok(value),
        None => Err(ApiError::Empty),
    }
}

/// Like [`interpret`], but `null` is a valid "nothing stored" answer.
pub fn interpret_optional<T: DeserializeOwned>(body: Value) -> ApiResult<Option<T>> {
    if body.is_null() {
        return Ok(None);
    }
    if let Some(status) = as_status(&body) {
        return Err(ApiError::Status(status));
    }
    serde_json::from_value(body)
        .map(Some)
        .map_err(|err| ApiError::Decode(err.to_string()))
}

/// Binary endpoints answer JSON only when something went wrong.
pub fn interpret_binary(content_type: Option<&str>, bytes: bytes::Bytes) -> ApiResult<Blob> {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
    if is_json {
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))?;
        return match as_status(&body) {
            Some(status) => Err(ApiError::Status(status)),
            None if body.is_null() => Err(ApiError::Empty),
            None => Err(ApiError::Decode("expected binary data, got JSON".to_string())),
        };
    }

    let mime = content_type
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);
    Ok(Blob { mime, bytes })
}

fn as_status(body: &Value) -> Option<Status> {
    let object = body.as_object()?;
    let code = object.get("code")?.as_i64()?;
    Some(Status {
        code,
        name: object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        description: object
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}
