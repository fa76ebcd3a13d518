//! Parse/serialize capability supplied to a cached file.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;

type ParseFn<T> = dyn Fn(&str) -> std::result::Result<T, String> + Send + Sync;
type SerializeFn<T> = dyn Fn(&T) -> std::result::Result<String, String> + Send + Sync;

/// How a cached file's text is turned into a value and back.
///
/// `parse` is required. `serialize` is only present for formats that
/// support writing; a cached file without one rejects `write` calls.
pub struct FileFormat<T> {
    name: &'static str,
    parse: Arc<ParseFn<T>>,
    serialize: Option<Arc<SerializeFn<T>>>,
}

impl<T> Clone for FileFormat<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            parse: Arc::clone(&self.parse),
            serialize: self.serialize.clone(),
        }
    }
}

impl<T> fmt::Debug for FileFormat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileFormat")
            .field("name", &self.name)
            .field("writable", &self.is_writable())
            .finish()
    }
}

impl<T> FileFormat<T> {
    /// A format that can only be read.
    pub fn read_only<P>(name: &'static str, parse: P) -> Self
    where
        P: Fn(&str) -> std::result::Result<T, String> + Send + Sync + 'static,
    {
        Self {
            name,
            parse: Arc::new(parse),
            serialize: None,
        }
    }

    /// Add a serializer, making the format writable.
    pub fn with_serializer<S>(mut self, serialize: S) -> Self
    where
        S: Fn(&T) -> std::result::Result<String, String> + Send + Sync + 'static,
    {
        self.serialize = Some(Arc::new(serialize));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_writable(&self) -> bool {
        self.serialize.is_some()
    }

    pub(crate) fn parse(&self, content: &str) -> std::result::Result<T, String> {
        (self.parse)(content)
    }

    pub(crate) fn serialize(&self, value: &T) -> Option<std::result::Result<String, String>> {
        self.serialize.as_ref().map(|serialize| serialize(value))
    }
}

impl<T> FileFormat<T>
where
    T: Serialize + DeserializeOwned,
{
    /// JSON, written pretty-printed with two-space indentation.
    pub fn json() -> Self {
        Self::read_only("json", |content| {
            serde_json::from_str(content).map_err(|e| e.to_string())
        })
        .with_serializer(|value| serde_json::to_string_pretty(value).map_err(|e| e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_json_format_roundtrip() {
        let format = FileFormat::<Value>::json();
        assert!(format.is_writable());
        assert_eq!(format.name(), "json");

        let value = format.parse(r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));

        let text = format.serialize(&value).unwrap().unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn test_json_format_reports_syntax_errors() {
        let format = FileFormat::<Value>::json();
        let err = format.parse("{ not json").unwrap_err();
        assert!(err.contains("line 1"));
    }

    #[test]
    fn test_read_only_format() {
        let format = FileFormat::read_only("lines", |content: &str| {
            Ok(content.lines().map(str::to_string).collect::<Vec<_>>())
        });
        assert!(!format.is_writable());
        assert!(format.serialize(&vec!["x".to_string()]).is_none());
        assert_eq!(format.parse("a\nb").unwrap(), vec!["a", "b"]);
    }
}
