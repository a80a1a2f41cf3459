//! Packing and unpacking of JSON-valued attributes stored as TEXT columns.
//!
//! Decoding is fallible: a stored value that does not parse is reported as a
//! [`DecodeError`] naming the entity and column instead of being replaced by a default.

use serde::{Serialize, de::DeserializeOwned};

/// A stored JSON column could not be turned back into structured data.
#[derive(Debug, thiserror::Error)]
#[error("stored {entity}.{field} is not valid JSON for its type: {source}")]
pub struct DecodeError {
    pub entity: &'static str,
    pub field: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// Decode a NOT NULL JSON column.
pub fn decode<T: DeserializeOwned>(
    entity: &'static str,
    field: &'static str,
    raw: &str,
) -> Result<T, DecodeError> {
    serde_json::from_str(raw).map_err(|source| DecodeError {
        entity,
        field,
        source,
    })
}

/// Decode a nullable JSON column. SQL NULL stays `None`.
pub fn decode_opt<T: DeserializeOwned>(
    entity: &'static str,
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, DecodeError> {
    raw.map(|text| decode(entity, field, text)).transpose()
}

/// Serialize a value for storage in a TEXT column.
///
/// Only plain data (strings, vectors, `serde_json::Value`) passes through here, for which
/// serialization cannot fail; the fallback keeps the column well-formed regardless.
pub fn encode<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "JSON encode of a stored attribute failed");
        "null".to_string()
    })
}
