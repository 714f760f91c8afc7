//! Domain layer - Data model, path resolution, tag filtering and directives

pub mod directive;
pub mod path;
pub mod tags;
pub mod value;

pub use directive::{DirectiveProcessor, MarkupTree};
pub use tags::TagInfo;
pub use value::TaggedValue;
