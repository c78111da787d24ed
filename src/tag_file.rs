//! Tag file JSON decoding.
//!
//! ```text
//! { "replace"?: bool, "values": [ "ns:id" | "#ns:tag" | {"id": ..., "required"?: bool} ] }
//! ```

use crate::types::TagValue;

/// Why a tag file could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagFileError {
    /// Content is not valid JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    /// Top-level value is not an object.
    #[error("Tag file is not a JSON object")]
    NotAnObject,
    /// `values` exists but is not an array.
    #[error("`values` is not an array")]
    ValuesNotArray,
    /// A `values` entry is neither a string nor an object with a string `id`.
    #[error("Invalid value at index {0}")]
    InvalidValue(usize),
}

/// A decoded tag file.
#[derive(Debug, Clone, PartialEq)]
pub struct TagFile {
    /// Declared `replace` flag; absent means false.
    pub replace: bool,
    /// Declared references, in file order.
    pub values: Vec<TagValue>,
    /// The whole file as parsed JSON.
    pub payload: serde_json::Value,
}

impl TagFile {
    /// Decode raw entry bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, TagFileError> {
        let payload: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| TagFileError::InvalidJson(e.to_string()))?;
        Self::from_value(payload)
    }

    /// Decode an already parsed JSON value.
    pub fn from_value(payload: serde_json::Value) -> Result<Self, TagFileError> {
        let object = payload.as_object().ok_or(TagFileError::NotAnObject)?;

        let replace = object
            .get("replace")
            .and_then(|r| r.as_bool())
            .unwrap_or(false);

        let values = match object.get("values") {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| TagValue::from_json(item).ok_or(TagFileError::InvalidValue(i)))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(TagFileError::ValuesNotArray),
        };

        Ok(Self { replace, values, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_values() {
        let file = TagFile::parse(
            br##"{"values": ["minecraft:oak_log", "#minecraft:stripped_logs", {"id": "c:x", "required": false}]}"##,
        )
        .unwrap();
        assert!(!file.replace);
        assert_eq!(file.values.len(), 3);
        assert_eq!(file.values[1].raw_id(), "#minecraft:stripped_logs");
        assert_eq!(file.values[2].required(), Some(false));
    }

    #[test]
    fn test_parse_replace_flag() {
        let file = TagFile::parse(br#"{"replace": true, "values": []}"#).unwrap();
        assert!(file.replace);
        assert!(file.values.is_empty());
    }

    #[test]
    fn test_missing_values_is_empty() {
        let file = TagFile::parse(br#"{}"#).unwrap();
        assert!(file.values.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(TagFile::parse(b"{not json"), Err(TagFileError::InvalidJson(_))));
        assert_eq!(TagFile::parse(b"[]"), Err(TagFileError::NotAnObject));
        assert_eq!(TagFile::parse(br#"{"values": "x"}"#), Err(TagFileError::ValuesNotArray));
        assert_eq!(
            TagFile::parse(br#"{"values": ["a", 3]}"#),
            Err(TagFileError::InvalidValue(1))
        );
    }
}
