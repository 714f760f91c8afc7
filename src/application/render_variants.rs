//! Multi-artifact rendering use case
//!
//! Renders one document per tag found in the data. Each variant is filtered
//! from the same loaded tree and rendered on the rayon pool.

use super::render_document::{read_template, render_template, validate_inputs, write_output};
use crate::error::{Result, TagRenderError};
use crate::infrastructure::{load_data, renderer_for, OutputFormat, RenderConfig};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Options for per-tag rendering
#[derive(Debug, Clone)]
pub struct VariantOptions {
    pub template: PathBuf,
    pub data: PathBuf,

    /// Directory receiving `<tag>.<ext>` files
    pub output_dir: PathBuf,

    pub format: OutputFormat,
}

/// Outcome of a variant run
#[derive(Debug, Default)]
pub struct VariantReport {
    /// Written files, in tag order
    pub succeeded: Vec<PathBuf>,

    /// Tags whose filtered data did not pass at the root
    pub skipped: Vec<String>,

    /// Tags that failed to render or write
    pub failures: Vec<(String, TagRenderError)>,
}

impl VariantReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    /// Convert failures into the aggregate error
    pub fn into_result(self) -> Result<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(TagRenderError::Variants {
                failed: self.failures.len(),
                total: self.total(),
            })
        }
    }
}

/// Service rendering one variant per tag
pub struct VariantService {
    config: RenderConfig,
}

impl VariantService {
    pub fn new(config: RenderConfig) -> Self {
        VariantService { config }
    }

    /// Execute the variant run
    ///
    /// Input problems (missing files, bad data) fail the whole run. Per-tag
    /// render failures are collected in the report instead.
    pub fn execute(&self, options: VariantOptions) -> Result<VariantReport> {
        validate_inputs(&options.template, &options.data)?;

        let template = read_template(&options.template)?;
        let data = load_data(&options.data)?;

        let mut report = VariantReport::default();
        let mut used_names = HashSet::new();
        let mut jobs = Vec::new();

        for tag in data.every_tag() {
            let (filtered, passed) = data.filter(&[tag.as_str()]);
            if !passed {
                info!(tag = %tag, "no data visible under tag, skipping");
                report.skipped.push(tag);
                continue;
            }

            let name = unique_name(&sanitize_filename(&tag), &mut used_names);
            let path = options
                .output_dir
                .join(format!("{}.{}", name, options.format.extension()));
            jobs.push((tag, filtered, path));
        }

        if jobs.is_empty() {
            info!("no tagged data to render");
            return Ok(report);
        }

        fs::create_dir_all(&options.output_dir)?;
        let renderer = renderer_for(options.format, &self.config);
        info!(count = jobs.len(), "rendering variants");

        let outcomes: Vec<(String, Result<PathBuf>)> = jobs
            .into_par_iter()
            .map(|(tag, filtered, path)| {
                let result = render_template(&template, &filtered, renderer.as_ref())
                    .and_then(|bytes| write_output(&path, &bytes))
                    .map(|()| path);
                (tag, result)
            })
            .collect();

        for (tag, outcome) in outcomes {
            match outcome {
                Ok(path) => {
                    debug!(tag = %tag, path = %path.display(), "variant rendered");
                    report.succeeded.push(path);
                }
                Err(e) => {
                    warn!(tag = %tag, error = %e, "variant failed");
                    report.failures.push((tag, e));
                }
            }
        }

        Ok(report)
    }
}

/// Sanitize a tag for use as a file stem
///
/// Converts spaces to hyphens, keeps alphanumeric characters and hyphens/underscores,
/// replaces other characters with underscores.
fn sanitize_filename(tag: &str) -> String {
    let sanitized = tag
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c.to_ascii_lowercase(),
            ' ' => '-',
            _ => '_',
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string();

    if sanitized.is_empty() {
        "tag".to_string()
    } else {
        sanitized
    }
}

/// Suffix `-2`, `-3`, ... until the stem is unused
fn unique_name(stem: &str, used: &mut HashSet<String>) -> String {
    let mut name = stem.to_string();
    let mut counter = 2;
    while !used.insert(name.clone()) {
        name = format!("{}-{}", stem, counter);
        counter += 1;
    }
    name
}
