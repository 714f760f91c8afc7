//! Single document rendering use case
//!
//! Load data, optionally narrow it to a set of tags, resolve the template's
//! directives against it and write one rendered artifact.

use crate::domain::{DirectiveProcessor, TaggedValue};
use crate::error::{Result, TagRenderError};
use crate::infrastructure::{load_data, renderer_for, DocumentRenderer, HtmlDocument};
use crate::infrastructure::{OutputFormat, RenderConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options for a single render
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Markup template
    pub template: PathBuf,

    /// JSON or YAML data document
    pub data: PathBuf,

    /// Output file (None = `output.<ext>` in the current directory)
    pub output: Option<PathBuf>,

    /// Output format
    pub format: OutputFormat,

    /// Keep only data visible under these tags (empty = no filtering)
    pub tags: Vec<String>,
}

/// Service rendering one template against one data document
pub struct RenderService {
    config: RenderConfig,
}

impl RenderService {
    pub fn new(config: RenderConfig) -> Self {
        RenderService { config }
    }

    /// Execute the render
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The template or data file is missing
    /// - The data is neither JSON nor YAML
    /// - The data root does not pass the tag filter
    /// - The template cannot be parsed or rendered
    /// - File I/O fails
    pub fn execute(&self, options: RenderOptions) -> Result<PathBuf> {
        validate_inputs(&options.template, &options.data)?;

        let template = read_template(&options.template)?;
        let mut data = load_data(&options.data)?;
        info!(data = %options.data.display(), "data loaded");

        if !options.tags.is_empty() {
            data = select_tags(&data, &options.tags)?;
        }

        let renderer = renderer_for(options.format, &self.config);
        let bytes = render_template(&template, &data, renderer.as_ref())?;

        let output = options
            .output
            .unwrap_or_else(|| PathBuf::from(format!("output.{}", options.format.extension())));
        write_output(&output, &bytes)?;

        info!(output = %output.display(), format = %options.format, "document rendered");
        Ok(output)
    }
}

/// Check that both input files exist before doing any work
pub fn validate_inputs(template: &Path, data: &Path) -> Result<()> {
    if !template.is_file() {
        return Err(TagRenderError::TemplateNotFound(template.to_path_buf()));
    }
    if !data.is_file() {
        return Err(TagRenderError::DataNotFound(data.to_path_buf()));
    }
    Ok(())
}

pub fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TagRenderError::TemplateNotFound(path.to_path_buf())
        } else {
            TagRenderError::Io(e)
        }
    })
}

/// Filter `data` by `tags`, failing when the root itself is filtered out
pub fn select_tags(data: &TaggedValue, tags: &[String]) -> Result<TaggedValue> {
    let (filtered, passed) = data.filter(tags);
    if !passed {
        return Err(TagRenderError::NoDataForTags(tags.to_vec()));
    }
    debug!(?tags, "data filtered by tags");
    Ok(filtered)
}

/// Resolve the template's directives against `data` and render the result
pub fn render_template(
    template: &str,
    data: &TaggedValue,
    renderer: &dyn DocumentRenderer,
) -> Result<Vec<u8>> {
    let mut document =
        HtmlDocument::parse(template).map_err(|e| TagRenderError::Markup(e.to_string()))?;
    DirectiveProcessor::process_document(&mut document, data);
    renderer.render(&document.to_markup())
}

/// Write `bytes` to `path`, creating parent directories
pub(crate) fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}
