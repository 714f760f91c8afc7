//! Tagged value model
//!
//! A data document is turned into a tree of [`TaggedValue`] nodes once, right
//! after parsing. Every node carries its own [`TagInfo`]; the tree is never
//! mutated afterwards, tag filtering always produces a fresh copy.
//!
//! # Examples
//!
//! ```
//! use tagrender::domain::TaggedValue;
//! use serde_json::json;
//!
//! let data = TaggedValue::from_document(&json!({
//!     "name": "Ada",
//!     "skills": { "value": ["Go", "Rust"], "tags": "backend" }
//! }))
//! .unwrap();
//! assert!(data.exists());
//! ```

use super::tags::info::{TagInfo, VALUE_KEY};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A node of the data tree
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    /// Leaf text; numbers and booleans are kept in their display form
    Text { info: TagInfo, text: String },
    /// Ordered sequence of values
    List {
        info: TagInfo,
        items: Vec<TaggedValue>,
    },
    /// Keyed entries
    Map {
        info: TagInfo,
        entries: BTreeMap<String, TaggedValue>,
    },
}

impl TaggedValue {
    /// Untagged text value
    pub fn text(text: impl Into<String>) -> Self {
        TaggedValue::Text {
            info: TagInfo::default(),
            text: text.into(),
        }
    }

    /// Untagged list value
    pub fn list(items: Vec<TaggedValue>) -> Self {
        TaggedValue::List {
            info: TagInfo::default(),
            items,
        }
    }

    /// Untagged map value
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, TaggedValue)>,
        K: Into<String>,
    {
        TaggedValue::Map {
            info: TagInfo::default(),
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Replace the tag metadata of this value
    pub fn with_info(self, info: TagInfo) -> Self {
        match self {
            TaggedValue::Text { text, .. } => TaggedValue::Text { info, text },
            TaggedValue::List { items, .. } => TaggedValue::List { info, items },
            TaggedValue::Map { entries, .. } => TaggedValue::Map { info, entries },
        }
    }

    /// Build the tree for a whole parsed document.
    ///
    /// Returns `None` when the document has no representable content (e.g. `null`).
    pub fn from_document(raw: &Value) -> Option<Self> {
        Self::unmarshal(raw, &TagInfo::default())
    }

    /// Build a node from a generic value, inheriting from `inherited`.
    ///
    /// The interpretations are tried in a fixed order: text envelope, list
    /// envelope, then plain map. An object without a usable `value` key is
    /// always a map.
    pub fn unmarshal(raw: &Value, inherited: &TagInfo) -> Option<Self> {
        if let Some(text) = Self::unmarshal_text(raw, inherited) {
            return Some(text);
        }
        if let Some(list) = Self::unmarshal_list(raw, inherited) {
            return Some(list);
        }
        Self::unmarshal_map(raw, inherited)
    }

    fn unmarshal_text(raw: &Value, inherited: &TagInfo) -> Option<Self> {
        if let Some(text) = scalar_text(raw) {
            return Some(TaggedValue::Text {
                info: TagInfo::default().inherit(inherited),
                text,
            });
        }

        let object = raw.as_object()?;
        let text = scalar_text(object.get(VALUE_KEY)?)?;
        Some(TaggedValue::Text {
            info: TagInfo::from_envelope(object).inherit(inherited),
            text,
        })
    }

    fn unmarshal_list(raw: &Value, inherited: &TagInfo) -> Option<Self> {
        let (info, items) = match raw {
            Value::Array(items) => (TagInfo::default().inherit(inherited), items),
            Value::Object(object) => match object.get(VALUE_KEY) {
                Some(Value::Array(items)) => {
                    (TagInfo::from_envelope(object).inherit(inherited), items)
                }
                _ => return None,
            },
            _ => return None,
        };

        let items = items
            .iter()
            .filter_map(|item| Self::unmarshal(item, &info))
            .collect();
        Some(TaggedValue::List { info, items })
    }

    fn unmarshal_map(raw: &Value, inherited: &TagInfo) -> Option<Self> {
        let object: &Map<String, Value> = raw.as_object()?;
        let info = TagInfo::from_envelope(object).inherit(inherited);

        let entries = object
            .iter()
            .filter(|(key, _)| !key.trim().is_empty())
            .filter_map(|(key, value)| {
                Self::unmarshal(value, &info).map(|node| (key.clone(), node))
            })
            .collect();
        Some(TaggedValue::Map { info, entries })
    }

    pub fn info(&self) -> &TagInfo {
        match self {
            TaggedValue::Text { info, .. }
            | TaggedValue::List { info, .. }
            | TaggedValue::Map { info, .. } => info,
        }
    }

    /// Link target of this node, if any
    pub fn url(&self) -> Option<&str> {
        self.info().url()
    }

    /// Empty text, lists and maps count as non-existent
    pub fn exists(&self) -> bool {
        match self {
            TaggedValue::Text { text, .. } => !text.is_empty(),
            TaggedValue::List { items, .. } => !items.is_empty(),
            TaggedValue::Map { entries, .. } => !entries.is_empty(),
        }
    }

    /// Text representation used for substitution.
    ///
    /// Lists are flattened recursively and joined with `", "`; maps have no
    /// text form and flatten to an empty string.
    pub fn flatten(&self) -> String {
        match self {
            TaggedValue::Text { text, .. } => text.clone(),
            TaggedValue::List { items, .. } => items
                .iter()
                .map(TaggedValue::flatten)
                .collect::<Vec<_>>()
                .join(", "),
            TaggedValue::Map { .. } => String::new(),
        }
    }
}

/// Display form of a scalar, `None` for null, arrays and objects
fn scalar_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| f.to_string())
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
