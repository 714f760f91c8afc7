//! tagrender - Render markup templates from tagged data
//!
//! Loads a JSON or YAML document into a tree of tagged values, optionally
//! narrows it to a set of tags, resolves `if-exists`, `repeat-for` and
//! `value-of` attributes in an HTML template against it and writes HTML or
//! PDF output, one document or one per tag.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::TagRenderError;
