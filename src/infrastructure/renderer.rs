//! Output renderers
//!
//! Renderers turn processed markup into the bytes written to disk. PDF output
//! is printed by a headless Chromium-family browser.

use crate::error::{Result, TagRenderError};
use crate::infrastructure::config::{PdfOptions, RenderConfig};
use std::fmt;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;
use tracing::debug;

/// Output format of a rendered document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Html,
    #[default]
    Pdf,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" | "htm" => Ok(OutputFormat::Html),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(format!("Invalid format: {} (use 'pdf' or 'html')", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Converts serialized markup into document bytes
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, markup: &str) -> Result<Vec<u8>>;
}

/// Pick the renderer for `format`
pub fn renderer_for(format: OutputFormat, config: &RenderConfig) -> Box<dyn DocumentRenderer> {
    match format {
        OutputFormat::Html => Box::new(HtmlRenderer),
        OutputFormat::Pdf => Box::new(BrowserPdfRenderer::new(
            config.browser_command(),
            config.pdf.clone(),
        )),
    }
}

/// Writes the markup as-is
pub struct HtmlRenderer;

impl DocumentRenderer for HtmlRenderer {
    fn render(&self, markup: &str) -> Result<Vec<u8>> {
        Ok(markup.as_bytes().to_vec())
    }
}

/// Prints markup to PDF through a headless browser process
pub struct BrowserPdfRenderer {
    command: String,
    options: PdfOptions,
}

impl BrowserPdfRenderer {
    pub fn new(command: String, options: PdfOptions) -> Self {
        BrowserPdfRenderer { command, options }
    }

    /// Parse command into program and arguments
    fn parse_command(&self) -> (String, Vec<String>) {
        let parts: Vec<&str> = self.command.split_whitespace().collect();

        if parts.is_empty() {
            return ("chromium".to_string(), vec![]);
        }

        let program = parts[0].to_string();
        let args = parts[1..].iter().map(|s| s.to_string()).collect();

        (program, args)
    }

    /// Print setup expressed as CSS, since browsers take no page flags
    fn page_style(&self) -> String {
        let pdf = &self.options;
        let mut page = String::new();
        if !pdf.prefer_css_page_size {
            let (width, height) = pdf.page_size();
            page.push_str(&format!("size: {}in {}in; ", width, height));
        }
        page.push_str(&format!(
            "margin: {}in {}in {}in {}in;",
            pdf.margin_top, pdf.margin_right, pdf.margin_bottom, pdf.margin_left
        ));

        let mut style = format!("@page {{ {} }}", page);
        if pdf.print_background {
            style.push_str(
                " html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }",
            );
        }
        style
    }

    /// Insert the page style before `</head>`, or in front of the markup
    fn inject_page_style(&self, markup: &str) -> String {
        let style = format!("<style>{}</style>", self.page_style());
        match markup.to_ascii_lowercase().find("</head>") {
            Some(pos) => format!("{}{}{}", &markup[..pos], style, &markup[pos..]),
            None => format!("{}{}", style, markup),
        }
    }

    fn browser_args(&self, html_path: &Path, pdf_path: &Path) -> Vec<String> {
        let mut args = vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ];
        if !self.options.display_header_footer {
            args.push("--no-pdf-header-footer".to_string());
        }
        args.push(format!("--print-to-pdf={}", pdf_path.display()));
        args.push(file_url(html_path));
        args
    }
}

impl DocumentRenderer for BrowserPdfRenderer {
    fn render(&self, markup: &str) -> Result<Vec<u8>> {
        let workdir = tempfile::tempdir()?;
        let html_path = workdir.path().join("document.html");
        let pdf_path = workdir.path().join("document.pdf");
        fs::write(&html_path, self.inject_page_style(markup))?;

        let (program, mut args) = self.parse_command();
        args.extend(self.browser_args(&html_path, &pdf_path));
        debug!(program = %program, ?args, "launching headless browser");

        let output = Command::new(&program).args(&args).output().map_err(|e| {
            TagRenderError::Render(format!("Failed to launch browser '{}': {}", program, e))
        })?;

        if !output.status.success() {
            return Err(TagRenderError::Render(format!(
                "browser '{}' exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        fs::read(&pdf_path).map_err(|e| {
            TagRenderError::Render(format!("browser '{}' produced no PDF: {}", program, e))
        })
    }
}

/// `file://` URL for a local path
fn file_url(path: &Path) -> String {
    let path = path.display().to_string().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}
