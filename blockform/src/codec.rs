//! Conversion between document text and a raw key/value mapping.
//!
//! The codec is the only place that knows the text format. Parsing keeps
//! data, not presentation: comments, anchors, quoting style, and the key
//! order of external text are lost, so re-serializing an external document
//! can change its bytes even when no value changed. The round-trip contract
//! `serialize(parse(serialize(m))) == serialize(m)` holds for mappings built
//! from field values.

use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};
use tracing::warn;

use crate::error::{DecodeError, EncodeError};

/// Raw document content: string keys (normally) to arbitrary YAML values.
pub type RawMapping = Mapping;

/// Parse and serialize the document text.
pub trait DocumentCodec {
    /// Parse text into a raw mapping.
    fn parse(&self, text: &str) -> Result<RawMapping, DecodeError>;

    /// Serialize a mapping. Deterministic for a given mapping and key order.
    fn serialize(&self, raw: &RawMapping) -> Result<String, EncodeError>;
}

/// Plain YAML documents via `serde_yaml_ng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl DocumentCodec for YamlCodec {
    fn parse(&self, text: &str) -> Result<RawMapping, DecodeError> {
        let mut documents = serde_yaml_ng::Deserializer::from_str(text);
        let Some(first) = documents.next() else {
            return Ok(RawMapping::new());
        };
        let value = Value::deserialize(first)?;
        if documents.next().is_some() {
            return Err(DecodeError::new(
                "expected a single YAML document but found more than one",
            ));
        }

        match value {
            Value::Null => Ok(RawMapping::new()),
            Value::Mapping(mapping) => Ok(mapping),
            other => {
                // Not a key/value block; every field falls back to its default.
                warn!(kind = value_kind(&other), "document is not a mapping, ignoring its content");
                Ok(RawMapping::new())
            }
        }
    }

    fn serialize(&self, raw: &RawMapping) -> Result<String, EncodeError> {
        Ok(serde_yaml_ng::to_string(raw)?)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn parse_mapping() {
        let raw = YamlCodec.parse("title: hello\nsurfaces:\n  - a\n  - b\n").unwrap();
        assert_eq!(raw.get("title"), Some(&key("hello")));
        assert_eq!(
            raw.get("surfaces"),
            Some(&Value::Sequence(vec![key("a"), key("b")]))
        );
    }

    #[test]
    fn parse_empty_text_is_empty_mapping() {
        assert!(YamlCodec.parse("").unwrap().is_empty());
        assert!(YamlCodec.parse("   \n\n").unwrap().is_empty());
        assert!(YamlCodec.parse("# only a comment\n").unwrap().is_empty());
        assert!(YamlCodec.parse("~").unwrap().is_empty());
    }

    #[test]
    fn parse_non_mapping_is_empty_mapping() {
        assert!(YamlCodec.parse("just a string").unwrap().is_empty());
        assert!(YamlCodec.parse("- a\n- b\n").unwrap().is_empty());
    }

    #[test]
    fn parse_malformed_is_decode_error() {
        let err = YamlCodec.parse("title: [unclosed\n").unwrap_err();
        assert!(!err.message.is_empty());

        let err = YamlCodec.parse("a: b\n  c: d\n").unwrap_err();
        assert!(!err.message.is_empty());
    }

    #[test]
    fn parse_multiple_documents_is_decode_error() {
        let err = YamlCodec.parse("a: 1\n---\nb: 2\n").unwrap_err();
        assert!(err.message.contains("more than one"));
    }

    #[test]
    fn serialize_keeps_insertion_order() {
        let mut raw = RawMapping::new();
        raw.insert(key("zeta"), key("1"));
        raw.insert(key("alpha"), Value::Sequence(vec![key("x")]));
        let text = YamlCodec.serialize(&raw).unwrap();
        assert_eq!(text, "zeta: '1'\nalpha:\n- x\n");
    }

    #[test]
    fn serialize_quotes_ambiguous_strings() {
        let mut raw = RawMapping::new();
        raw.insert(key("a"), key("true"));
        raw.insert(key("b"), key(""));
        raw.insert(key("c"), key("my command"));
        let text = YamlCodec.serialize(&raw).unwrap();
        let back = YamlCodec.parse(&text).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn serialize_round_trip_is_stable() {
        let mut raw = RawMapping::new();
        raw.insert(key("description"), key("line one\nline two\n"));
        raw.insert(key("surfaces"), Value::Sequence(vec![]));
        let once = YamlCodec.serialize(&raw).unwrap();
        let twice = YamlCodec.serialize(&YamlCodec.parse(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }
}
