//! Infrastructure layer - External I/O, markup trees and renderers

pub mod config;
pub mod loader;
pub mod markup;
pub mod renderer;

pub use config::{PdfOptions, RenderConfig};
pub use loader::load_data;
pub use markup::HtmlDocument;
pub use renderer::{renderer_for, DocumentRenderer, OutputFormat};
