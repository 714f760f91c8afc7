//! Directive resolution over a markup tree
//!
//! Single depth-first pass. Missing data never fails the render: an
//! unresolved `value-of` leaves the element alone, while `if-exists`, an
//! empty `repeat-for` and blank repeat items drop their element.

use super::{MarkupTree, IF_EXISTS, REPEAT_FOR, VALUE_OF};
use crate::domain::path::{last_segment, resolve};
use crate::domain::{TagInfo, TaggedValue};
use tracing::{debug, warn};

/// Walks a markup tree together with a data context
pub struct DirectiveProcessor;

impl DirectiveProcessor {
    /// Process the whole document against `data`
    pub fn process_document<M: MarkupTree>(document: &mut M, data: &TaggedValue) {
        let root = document.root();
        Self::process(document, root, data);
    }

    /// Process `node` and its subtree with `context` as the data root
    pub fn process<M: MarkupTree>(document: &mut M, node: M::Node, context: &TaggedValue) {
        if let Some(path) = document.attr(node, IF_EXISTS) {
            if !Self::exists(context, &path) {
                debug!(path = %path, "if-exists: removing element");
                document.remove(node);
                return;
            }
            document.remove_attr(node, IF_EXISTS);
        }

        if let Some(path) = document.attr(node, REPEAT_FOR) {
            Self::repeat(document, node, context, &path);
            return;
        }

        if let Some(path) = document.attr(node, VALUE_OF) {
            match resolve(context, &path) {
                Some(value) => Self::write_value(document, node, value, &value.flatten()),
                None => debug!(path = %path, "value-of: unresolved, content kept"),
            }
            document.remove_attr(node, VALUE_OF);
        }

        for child in document.children(node) {
            Self::process(document, child, context);
        }
    }

    fn exists(context: &TaggedValue, path: &str) -> bool {
        resolve(context, path).is_some_and(TaggedValue::exists)
    }

    /// Replace `node` by one processed clone per collection item
    fn repeat<M: MarkupTree>(document: &mut M, node: M::Node, context: &TaggedValue, path: &str) {
        let items = Self::collect_items(context, path);
        if items.is_empty() {
            debug!(path = %path, "repeat-for: empty collection, removing element");
            document.remove(node);
            return;
        }

        let stamp = document.outer_markup(node);
        let parent = document.parent(node);
        document.remove(node);

        let Some(parent) = parent else {
            warn!(path = %path, "repeat-for on a detached element, nothing to append to");
            return;
        };

        debug!(path = %path, count = items.len(), "repeat-for: stamping");
        for item in &items {
            let mut clone = match M::parse(&stamp) {
                Ok(clone) => clone,
                Err(e) => {
                    warn!(path = %path, error = %e, "repeat-for: clone failed to parse, skipping");
                    continue;
                }
            };
            let Some(root) = clone.first_element() else {
                warn!(path = %path, "repeat-for: clone has no element, skipping");
                continue;
            };
            clone.remove_attr(root, REPEAT_FOR);

            if !Self::rebase(&mut clone, root, path, item) {
                debug!(path = %path, "repeat-for: blank item, skipping");
                continue;
            }

            Self::process(&mut clone, root, item);

            let markup = clone.outer_markup(root);
            if let Err(e) = document.append_markup(parent, &markup) {
                warn!(path = %path, error = %e, "repeat-for: clone failed to re-parse, skipping");
            }
        }
    }

    /// Turn the resolved collection into one context per iteration
    fn collect_items(context: &TaggedValue, path: &str) -> Vec<TaggedValue> {
        let resolved = resolve(context, path).or_else(|| {
            // A short local name can reach into a just-entered item
            if path.contains('.') {
                resolve(context, last_segment(path))
            } else {
                None
            }
        });

        match resolved {
            None => Vec::new(),
            Some(TaggedValue::List { items, .. }) => items.clone(),
            Some(TaggedValue::Text { info, text }) => {
                if text.is_empty() {
                    return Vec::new();
                }
                text.split(',')
                    .map(|piece| TaggedValue::Text {
                        info: TagInfo::default().inherit(info),
                        text: piece.trim().to_string(),
                    })
                    .collect()
            }
            Some(map @ TaggedValue::Map { .. }) => {
                if map.exists() {
                    vec![map.clone()]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Rewrite the `value-of` paths of a clone for its item.
    ///
    /// Paths ending like the repeat path are the item itself and get
    /// substituted now; paths below the repeat path become relative to the
    /// item; anything else is left for the surrounding context. Returns
    /// `false` if the item substitutes to blank text.
    fn rebase<M: MarkupTree>(
        clone: &mut M,
        root: M::Node,
        repeat_path: &str,
        item: &TaggedValue,
    ) -> bool {
        let repeat_last = last_segment(repeat_path);
        let nested_prefix = format!("{}.", repeat_path);

        for target in clone.select_with_attr(root, VALUE_OF) {
            let Some(value_path) = clone.attr(target, VALUE_OF) else {
                continue;
            };

            if last_segment(&value_path) == repeat_last {
                let text = item.flatten();
                if text.trim().is_empty() {
                    return false;
                }
                Self::write_value(clone, target, item, &text);
                clone.remove_attr(target, VALUE_OF);
            } else if let Some(relative) = value_path.strip_prefix(&nested_prefix) {
                if !relative.is_empty() {
                    clone.set_attr(target, VALUE_OF, relative);
                }
            }
        }

        true
    }

    fn write_value<M: MarkupTree>(document: &mut M, node: M::Node, value: &TaggedValue, text: &str) {
        match value.url() {
            Some(url) => document.set_inner_link(node, url, text),
            None => document.set_inner_text(node, text),
        }
    }
}
