//! Application layer - Use cases and orchestration

pub mod list_tags;
pub mod manage_config;
pub mod render_document;
pub mod render_variants;

pub use list_tags::ListTagsService;
pub use manage_config::ConfigService;
pub use render_document::{render_template, RenderOptions, RenderService};
pub use render_variants::{VariantOptions, VariantReport, VariantService};
