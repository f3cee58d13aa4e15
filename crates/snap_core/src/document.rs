use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::core_api::{CoreError, CoreErrorCode};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Keys carrying this prefix hold schema/versioning metadata, never a card id.
pub const METADATA_KEY_PREFIX: char = '$';

/// A loaded save-state document. Holds the untyped tree only; typed records
/// are pulled out of it by the extractors.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: JsonValue,
}

impl Document {
    pub fn parse(bytes: &[u8]) -> Result<Self, CoreError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("document is not valid UTF-8: {e}"),
            )
        })?;
        let root = serde_json::from_str(text).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("malformed document: {e}"))
        })?;

        Ok(Self { root })
    }

    pub fn from_value(root: JsonValue) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &JsonValue {
        &self.root
    }

    /// Follows a chain of mapping keys. Any missing key or non-mapping hop
    /// yields `None`.
    pub fn lookup(&self, path: &[&str]) -> Option<&JsonValue> {
        path.iter()
            .try_fold(&self.root, |node, key| node.as_object()?.get(*key))
    }

    pub fn lookup_object(&self, path: &[&str]) -> Option<&JsonMap<String, JsonValue>> {
        self.lookup(path)?.as_object()
    }

    pub fn lookup_array(&self, path: &[&str]) -> Option<&[JsonValue]> {
        self.lookup(path)?.as_array().map(Vec::as_slice)
    }
}

pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with(METADATA_KEY_PREFIX)
}

/// Reads an identifier-like scalar. Empty strings, zero and non-scalars count
/// as absent; other numeric ids are stringified.
pub fn scalar_id(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}
