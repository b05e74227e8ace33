//! Response-envelope handling for the CRM backend.
//!
//! Different endpoints wrap their records differently. All of these are
//! accepted:
//!
//! - a bare array: `[...]`
//! - a status envelope: `{"status": "success", "data": [...]}`
//! - a paginated status envelope: `{"status": "success", "data": {"results": [...], "next": ...}}`
//! - a paginated page: `{"results": [...], "next": ...}`
//! - a doubly-wrapped list: `{"data": {"data": [...]}}`
//!
//! `{"status": "error", ...}` at any level becomes
//! [`ReferenceError::Backend`].

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::ReferenceError;

/// One page of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The records on this page.
    pub records: Vec<T>,
    /// Whether the envelope advertised a following page.
    pub has_next: bool,
    /// Whether the records came from a paginated `results` envelope.
    /// Bare arrays and flat `data` lists are complete responses.
    pub paginated: bool,
}

/// Extracts the records from any supported envelope, discarding
/// pagination metadata.
///
/// # Errors
///
/// Returns [`ReferenceError::Backend`] for `status: "error"` bodies,
/// [`ReferenceError::Parse`] if no record array can be found, or
/// [`ReferenceError::Json`] if a record does not deserialize as `T`.
pub fn extract_records<T: DeserializeOwned>(
    body: &serde_json::Value,
) -> Result<Vec<T>, ReferenceError> {
    Ok(extract_page(body)?.records)
}

/// Extracts one page of records and its `next` marker.
///
/// # Errors
///
/// Same as [`extract_records`].
pub fn extract_page<T: DeserializeOwned>(
    body: &serde_json::Value,
) -> Result<Page<T>, ReferenceError> {
    let (records, next, paginated) = locate(body)?;
    let records = records
        .iter()
        .map(T::deserialize)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(Page {
        records,
        has_next: next.is_some_and(has_next),
        paginated,
    })
}

type Located<'a> = (
    &'a [serde_json::Value],
    Option<&'a serde_json::Value>,
    bool,
);

const NO_RECORDS: &[serde_json::Value] = &[];

fn locate(body: &serde_json::Value) -> Result<Located<'_>, ReferenceError> {
    match body {
        serde_json::Value::Array(records) => Ok((records.as_slice(), None, false)),
        serde_json::Value::Object(map) => {
            if map.get("status").and_then(serde_json::Value::as_str) == Some("error") {
                return Err(ReferenceError::Backend {
                    message: backend_message(body),
                });
            }
            if let Some(results) = map.get("results").and_then(serde_json::Value::as_array) {
                return Ok((results.as_slice(), map.get("next"), true));
            }
            match map.get("data") {
                Some(serde_json::Value::Null) => Ok((NO_RECORDS, None, false)),
                Some(data) => locate(data),
                None => Err(ReferenceError::Parse {
                    message: format!(
                        "response has no record array (keys: {:?})",
                        map.keys().collect::<Vec<_>>()
                    ),
                }),
            }
        }
        other => Err(ReferenceError::Parse {
            message: format!("unexpected response body: {other}"),
        }),
    }
}

fn backend_message(body: &serde_json::Value) -> String {
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| body[*key].as_str().filter(|m| !m.is_empty()))
        .unwrap_or("backend reported an error")
        .to_string()
}

fn has_next(next: &serde_json::Value) -> bool {
    match next {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
