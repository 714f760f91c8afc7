//! Tag metadata carried by every data node

use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Envelope keys recognised on data objects
pub const TAGS_KEY: &str = "tags";
pub const URL_KEY: &str = "url";
pub const EXCLUSIVE_KEY: &str = "exclusive";
pub const VALUE_KEY: &str = "value";

/// Tags, link target and exclusivity of a single data node.
///
/// Tags are stored lowercase and deduplicated, so comparisons are
/// case-insensitive by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagInfo {
    tags: BTreeSet<String>,
    url: Option<String>,
    exclusive: bool,
}

impl TagInfo {
    pub fn new<I, S>(tags: I, url: Option<String>, exclusive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TagInfo {
            tags: normalize_tags(tags),
            url: url.filter(|u| !u.is_empty()),
            exclusive,
        }
    }

    /// Parse tag metadata from the envelope keys of a data object.
    ///
    /// `tags` may be a list of strings or a single comma-separated string,
    /// `exclusive` accepts `true`, `"true"`, `"1"` or `1`.
    pub fn from_envelope(object: &Map<String, Value>) -> Self {
        let tags: Vec<String> = match object.get(TAGS_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(list)) => list.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        };

        let url = object
            .get(URL_KEY)
            .and_then(Value::as_str)
            .map(str::to_string);

        let exclusive = match object.get(EXCLUSIVE_KEY) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag == "true" || flag == "1",
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        };

        TagInfo::new(tags, url, exclusive)
    }

    /// Fill in what this node did not set itself from the enclosing node.
    ///
    /// Only the url is inherited, and it is copied: later changes to the
    /// parent never reach the child.
    pub fn inherit(mut self, parent: &TagInfo) -> Self {
        if self.url.is_none() {
            self.url = parent.url.clone();
        }
        self
    }

    /// Tags of this node, as an owned list.
    pub fn tags(&self) -> Vec<String> {
        self.tags.iter().cloned().collect()
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    /// True if any of this node's tags is in `requested`
    pub fn matches_any(&self, requested: &BTreeSet<String>) -> bool {
        self.tags.iter().any(|tag| requested.contains(tag))
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub(crate) fn collect_tags_into(&self, output: &mut BTreeSet<String>) {
        output.extend(self.tags.iter().cloned());
    }
}

/// Lowercase, trim and deduplicate tags, dropping blank entries
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}
