//! Tag filtering over the value tree
//!
//! Filtering never touches the source tree: every call builds a new tree, so
//! one loaded document can be filtered once per tag, from several threads.

use super::info::{normalize_tags, TagInfo};
use crate::domain::TaggedValue;
use std::collections::BTreeSet;

/// Decide whether a node passes on its own tags.
///
/// Untagged nodes pass by default, tagged nodes need at least one requested
/// tag. An exclusive node without a hit always fails, tagged or not.
pub fn pass_own(info: &TagInfo, requested: &BTreeSet<String>) -> bool {
    if info.matches_any(requested) {
        return true;
    }
    if info.is_exclusive() {
        return false;
    }
    !info.has_tags()
}

impl TaggedValue {
    /// Filter a copy of this tree by `requested` tags.
    ///
    /// Children that fail are dropped (list order is kept); the returned
    /// verdict is the container's own [`pass_own`] result, whatever survived
    /// underneath.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagrender::domain::{TagInfo, TaggedValue};
    ///
    /// let data = TaggedValue::map([
    ///     ("a", TaggedValue::text("kept").with_info(TagInfo::new(["x"], None, false))),
    ///     ("b", TaggedValue::text("dropped").with_info(TagInfo::new(["y"], None, false))),
    /// ]);
    /// let (filtered, passed) = data.filter(&["X"]);
    /// assert!(passed);
    /// assert_eq!(filtered.every_tag().into_iter().collect::<Vec<_>>(), vec!["x".to_string()]);
    /// ```
    pub fn filter<S: AsRef<str>>(&self, requested: &[S]) -> (TaggedValue, bool) {
        let requested = normalize_tags(requested);
        self.filter_set(&requested)
    }

    fn filter_set(&self, requested: &BTreeSet<String>) -> (TaggedValue, bool) {
        let copy = match self {
            TaggedValue::Text { info, text } => TaggedValue::Text {
                info: info.clone(),
                text: text.clone(),
            },
            TaggedValue::List { info, items } => TaggedValue::List {
                info: info.clone(),
                items: items
                    .iter()
                    .map(|item| item.filter_set(requested))
                    .filter(|(_, passed)| *passed)
                    .map(|(item, _)| item)
                    .collect(),
            },
            TaggedValue::Map { info, entries } => TaggedValue::Map {
                info: info.clone(),
                entries: entries
                    .iter()
                    .filter_map(|(key, value)| {
                        let (value, passed) = value.filter_set(requested);
                        passed.then(|| (key.clone(), value))
                    })
                    .collect(),
            },
        };

        let passed = pass_own(copy.info(), requested);
        (copy, passed)
    }

    /// Every tag used anywhere in this tree, deduplicated.
    ///
    /// The set is freshly built; callers may keep it while copying or
    /// filtering the tree.
    pub fn every_tag(&self) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        self.collect_tags(&mut tags);
        tags
    }

    fn collect_tags(&self, output: &mut BTreeSet<String>) {
        self.info().collect_tags_into(output);
        match self {
            TaggedValue::Text { .. } => {}
            TaggedValue::List { items, .. } => {
                for item in items {
                    item.collect_tags(output);
                }
            }
            TaggedValue::Map { entries, .. } => {
                for value in entries.values() {
                    value.collect_tags(output);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(text: &str, tags: &[&str], exclusive: bool) -> TaggedValue {
        TaggedValue::text(text).with_info(TagInfo::new(tags, None, exclusive))
    }

    fn requested(tags: &[&str]) -> BTreeSet<String> {
        normalize_tags(tags)
    }

    #[test]
    fn test_untagged_passes_any_request() {
        let info = TagInfo::default();
        assert!(pass_own(&info, &requested(&[])));
        assert!(pass_own(&info, &requested(&["work"])));
        assert!(pass_own(&info, &requested(&["work", "oss"])));
    }

    #[test]
    fn test_tagged_needs_hit() {
        let info = TagInfo::new(["work"], None, false);
        assert!(pass_own(&info, &requested(&["work"])));
        assert!(!pass_own(&info, &requested(&["oss"])));
        assert!(!pass_own(&info, &requested(&[])));
    }

    #[test]
    fn test_exclusive_without_hit_fails() {
        let value = tagged("secret", &["private"], true);
        let (_, passed) = value.filter(&["work"]);
        assert!(!passed);

        let (_, passed) = value.filter(&["private"]);
        assert!(passed);
    }

    #[test]
    fn test_untagged_exclusive_fails() {
        let info = TagInfo::new(Vec::<String>::new(), None, true);
        assert!(!pass_own(&info, &requested(&["work"])));
    }

    #[test]
    fn test_request_is_case_insensitive() {
        let value = tagged("x", &["Work"], false);
        let (_, passed) = value.filter(&["WORK"]);
        assert!(passed);
    }

    #[test]
    fn test_map_keeps_untagged_and_matching_children() {
        let data = TaggedValue::map([
            ("a", tagged("A", &["x"], false)),
            ("b", tagged("B", &[], false)),
        ]);

        let (filtered, passed) = data.filter(&["x"]);
        assert!(passed);
        assert_eq!(filtered, data);
    }

    #[test]
    fn test_map_drops_failing_children() {
        let data = TaggedValue::map([
            ("a", tagged("A", &["x"], false)),
            ("b", tagged("B", &["y"], false)),
        ]);

        let (filtered, passed) = data.filter(&["y"]);
        assert!(passed);
        assert_eq!(filtered, TaggedValue::map([("b", tagged("B", &["y"], false))]));
    }

    #[test]
    fn test_list_preserves_order() {
        let data = TaggedValue::list(vec![
            tagged("1", &["a"], false),
            tagged("2", &["b"], false),
            tagged("3", &[], false),
            tagged("4", &["a", "b"], false),
        ]);

        let (filtered, passed) = data.filter(&["a"]);
        assert!(passed);
        assert_eq!(filtered.flatten(), "1, 3, 4");
    }

    #[test]
    fn test_container_verdict_ignores_children() {
        // Every child fails, the untagged container still passes
        let data = TaggedValue::list(vec![tagged("1", &["a"], false)]);
        let (filtered, passed) = data.filter(&["b"]);
        assert!(passed);
        assert!(!filtered.exists());

        // Children pass, the tagged container does not
        let data =
            TaggedValue::list(vec![tagged("1", &[], false)]).with_info(TagInfo::new(["a"], None, false));
        let (filtered, passed) = data.filter(&["b"]);
        assert!(!passed);
        assert!(filtered.exists());
    }

    #[test]
    fn test_filter_leaves_source_untouched() {
        let data = TaggedValue::list(vec![tagged("1", &["a"], false), tagged("2", &["b"], false)]);
        let before = data.clone();

        let (filtered, _) = data.filter(&["a"]);
        assert_eq!(data, before);
        assert_ne!(filtered, before);
    }

    #[test]
    fn test_every_tag_three_levels() {
        let data = TaggedValue::map([
            (
                "work",
                TaggedValue::list(vec![
                    TaggedValue::map([("title", tagged("Dev", &["backend", "work"], false))])
                        .with_info(TagInfo::new(["work"], None, false)),
                    tagged("Ops", &["ops"], false),
                ])
                .with_info(TagInfo::new(["career"], None, false)),
            ),
            ("name", tagged("Ada", &["Work"], false)),
        ])
        .with_info(TagInfo::new(["root"], None, false));

        let tags = data.every_tag();
        assert_eq!(
            tags.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["backend", "career", "ops", "root", "work"]
        );

        // Filtering and then changing the source leaves the taken set alone
        let (filtered, _) = data.filter(&["career", "ops"]);
        let mut data = data;
        if let TaggedValue::Map { entries, .. } = &mut data {
            entries.remove("work");
            entries.insert("extra".to_string(), tagged("x", &["extra"], false));
        }

        assert_eq!(
            tags.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["backend", "career", "ops", "root", "work"]
        );
        assert_eq!(
            data.every_tag().iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["extra", "root", "work"]
        );
        assert_eq!(
            filtered.every_tag().iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["career", "ops", "root"]
        );
    }
}
