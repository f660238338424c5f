//! Ordered JSON documents.
//!
//! A [`Document`] is built incrementally by appending named scalars and named
//! arrays. Keys and array elements keep their insertion order, so the same
//! sequence of appends always serializes to the same bytes.

use serde::Serialize;
use serde_json::{Map, Value};

/// One element of an array-valued member.
///
/// Nested documents are carried as documents, never as pre-serialized text,
/// so there is nothing to guess when the array is written out.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(String),
    Document(Document),
}

impl From<Element> for Value {
    fn from(element: Element) -> Self {
        match element {
            Element::Text(text) => Value::String(text),
            Element::Document(document) => Value::Object(document.members),
        }
    }
}

/// An ordered JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    members: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string member. Re-setting an existing key replaces the value
    /// in place.
    pub fn set_scalar(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.members
            .insert(key.into(), Value::String(value.into()));
    }

    /// Append an array member built from `elements` in iteration order.
    pub fn set_array(&mut self, key: impl Into<String>, elements: impl IntoIterator<Item = Element>) {
        let values = elements.into_iter().map(Value::from).collect();
        self.members.insert(key.into(), Value::Array(values));
    }

    /// Number of members.
    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    /// Compact JSON text of the document.
    pub fn to_json(&self) -> String {
        Value::Object(self.members.clone()).to_string()
    }
}

#[cfg(test)]
impl Document {
    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        self.members.get(key)
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.to_json(), "{}");
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let mut doc = Document::new();
        doc.set_scalar("zeta", "1");
        doc.set_scalar("alpha", "2");
        doc.set_scalar("mid", "3");

        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(doc.to_json(), r#"{"zeta":"1","alpha":"2","mid":"3"}"#);
    }

    #[test]
    fn test_reset_scalar_keeps_position() {
        let mut doc = Document::new();
        doc.set_scalar("a", "1");
        doc.set_scalar("b", "2");
        doc.set_scalar("a", "3");

        assert_eq!(doc.to_json(), r#"{"a":"3","b":"2"}"#);
    }

    #[test]
    fn test_array_mixes_text_and_documents() {
        let mut nested = Document::new();
        nested.set_scalar("NAME", "Foo::util");

        let mut doc = Document::new();
        doc.set_array(
            "INTERFACE_LINK_LIBRARIES",
            vec![
                Element::Text("pthread".into()),
                Element::Document(nested),
                Element::Text("dl".into()),
            ],
        );

        let value: Value = serde_json::from_str(&doc.to_json()).unwrap();
        assert_eq!(
            value,
            json!({"INTERFACE_LINK_LIBRARIES": ["pthread", {"NAME": "Foo::util"}, "dl"]})
        );
    }

    #[test]
    fn test_text_starting_with_brace_stays_a_string() {
        // Text that looks like JSON is still text.
        let mut doc = Document::new();
        doc.set_array("OPTS", vec![Element::Text("{not json".into())]);

        assert_eq!(doc.to_json(), r#"{"OPTS":["{not json"]}"#);
    }

    #[test]
    fn test_serialize_is_transparent() {
        let mut doc = Document::new();
        doc.set_scalar("name", "Foo");

        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"name":"Foo"}"#);
    }
}
