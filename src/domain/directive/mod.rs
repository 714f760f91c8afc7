//! Template directives
//!
//! Templates are plain markup whose elements may carry three attributes:
//!
//! - `if-exists="path"` keeps the element only if the path resolves to a non-empty value
//! - `repeat-for="path"` stamps the element once per item of a collection
//! - `value-of="path"` replaces the element's content with the resolved value
//!
//! The processor works against any [`MarkupTree`].

pub mod processor;

pub use processor::DirectiveProcessor;

pub const IF_EXISTS: &str = "if-exists";
pub const REPEAT_FOR: &str = "repeat-for";
pub const VALUE_OF: &str = "value-of";

/// Mutable markup tree the directive processor operates on
pub trait MarkupTree: Sized {
    /// Handle to a node of this tree
    type Node: Copy + std::fmt::Debug;

    type Error: std::fmt::Display;

    /// Parse markup into a fresh tree
    fn parse(markup: &str) -> Result<Self, Self::Error>;

    /// The document node holding all top-level content
    fn root(&self) -> Self::Node;

    /// First top-level element, e.g. the root of a parsed fragment
    fn first_element(&self) -> Option<Self::Node>;

    /// Parent of a node, `None` for the document node and detached nodes
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Element children of a node, in document order
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Elements carrying `name`, including `node` itself, in document order
    fn select_with_attr(&self, node: Self::Node, name: &str) -> Vec<Self::Node>;

    fn attr(&self, node: Self::Node, name: &str) -> Option<String>;

    fn set_attr(&mut self, node: Self::Node, name: &str, value: &str);

    fn remove_attr(&mut self, node: Self::Node, name: &str);

    /// Replace the content of a node with plain text
    fn set_inner_text(&mut self, node: Self::Node, text: &str);

    /// Replace the content of a node with a hyperlink around `text`
    fn set_inner_link(&mut self, node: Self::Node, href: &str, text: &str);

    /// Serialized content of a node, without the node itself
    fn inner_markup(&self, node: Self::Node) -> String;

    /// Serialized node including its own tag
    fn outer_markup(&self, node: Self::Node) -> String;

    /// Detach a node and its subtree from its parent
    fn remove(&mut self, node: Self::Node);

    /// Parse `markup` and append it as the last children of `parent`
    fn append_markup(&mut self, parent: Self::Node, markup: &str) -> Result<(), Self::Error>;
}
