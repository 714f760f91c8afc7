//! Dot-separated path resolution against a [`TaggedValue`] tree

use super::TaggedValue;

/// Resolve `path` (e.g. `work.0.company`) starting at `root`.
///
/// Numeric segments index into lists, any other segment is a map key.
/// Returns `None` for an empty path or whenever a segment does not apply.
pub fn resolve<'a>(root: &'a TaggedValue, path: &str) -> Option<&'a TaggedValue> {
    if path.is_empty() {
        return None;
    }

    path.split('.').try_fold(root, |current, segment| {
        if let Ok(index) = segment.parse::<usize>() {
            return match current {
                TaggedValue::List { items, .. } => items.get(index),
                _ => None,
            };
        }

        match current {
            TaggedValue::Map { entries, .. } => entries.get(segment),
            TaggedValue::Text { .. } | TaggedValue::List { .. } => None,
        }
    })
}

/// Final dot-segment of a path (the whole path if it has no dot)
pub fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
