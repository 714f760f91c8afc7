//! Config management use case

use crate::error::{Result, TagRenderError};
use crate::infrastructure::config::{PaperSize, CONFIG_FILE};
use crate::infrastructure::RenderConfig;
use std::path::PathBuf;
use std::str::FromStr;

pub const VALID_KEYS: &str = "paper, paper_width, paper_height, margin, margin_top, margin_bottom, \
margin_left, margin_right, landscape, print_background, display_header_footer, \
prefer_css_page_size, browser";

/// Service for managing the `tagrender.toml` of a directory
pub struct ConfigService {
    dir: PathBuf,
}

impl ConfigService {
    /// Create a new config service for `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ConfigService { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Effective configuration (defaults when no file exists)
    pub fn list(&self) -> Result<RenderConfig> {
        RenderConfig::discover(None, &self.dir)
    }

    /// Effective configuration rendered as TOML
    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.list()?)?)
    }

    /// Write a default config file
    pub fn init(&self) -> Result<PathBuf> {
        RenderConfig::default().init_in_dir(&self.dir)
    }

    /// Get a single config value
    pub fn get(&self, key: &str) -> Result<String> {
        let config = self.list()?;
        let pdf = &config.pdf;

        let value = match key {
            "paper" => format!("{:?}", pdf.paper).to_lowercase(),
            "paper_width" => pdf.paper_width.unwrap_or(pdf.paper.dimensions().0).to_string(),
            "paper_height" => pdf.paper_height.unwrap_or(pdf.paper.dimensions().1).to_string(),
            "margin" => {
                let margins = [pdf.margin_top, pdf.margin_right, pdf.margin_bottom, pdf.margin_left];
                if margins.iter().all(|m| *m == margins[0]) {
                    margins[0].to_string()
                } else {
                    // CSS order: top right bottom left
                    margins.map(|m| m.to_string()).join(" ")
                }
            }
            "margin_top" => pdf.margin_top.to_string(),
            "margin_bottom" => pdf.margin_bottom.to_string(),
            "margin_left" => pdf.margin_left.to_string(),
            "margin_right" => pdf.margin_right.to_string(),
            "landscape" => pdf.landscape.to_string(),
            "print_background" => pdf.print_background.to_string(),
            "display_header_footer" => pdf.display_header_footer.to_string(),
            "prefer_css_page_size" => pdf.prefer_css_page_size.to_string(),
            "browser" => config.browser_command(),
            _ => return Err(unknown_key(key)),
        };

        Ok(value)
    }

    /// Set a config value, creating the config file if needed
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut config = self.list()?;
        let pdf = &mut config.pdf;

        match key {
            "paper" => pdf.paper = PaperSize::from_str(value).map_err(TagRenderError::Config)?,
            "paper_width" => pdf.paper_width = Some(parse_inches(key, value)?),
            "paper_height" => pdf.paper_height = Some(parse_inches(key, value)?),
            "margin" => pdf.set_margins(parse_inches(key, value)?),
            "margin_top" => pdf.margin_top = parse_inches(key, value)?,
            "margin_bottom" => pdf.margin_bottom = parse_inches(key, value)?,
            "margin_left" => pdf.margin_left = parse_inches(key, value)?,
            "margin_right" => pdf.margin_right = parse_inches(key, value)?,
            "landscape" => pdf.landscape = parse_flag(key, value)?,
            "print_background" => pdf.print_background = parse_flag(key, value)?,
            "display_header_footer" => pdf.display_header_footer = parse_flag(key, value)?,
            "prefer_css_page_size" => pdf.prefer_css_page_size = parse_flag(key, value)?,
            "browser" => {
                config.browser.command = Some(value.to_string()).filter(|v| !v.trim().is_empty())
            }
            _ => return Err(unknown_key(key)),
        }

        config.save_to_file(&self.path())
    }
}

fn unknown_key(key: &str) -> TagRenderError {
    TagRenderError::Config(format!(
        "Unknown config key: '{}'. Valid keys are: {}",
        key, VALID_KEYS
    ))
}

fn parse_inches(key: &str, value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(inches) if inches.is_finite() && inches >= 0.0 => Ok(inches),
        _ => Err(TagRenderError::Config(format!(
            "Invalid value for '{}': {} (expected a non-negative number of inches)",
            key, value
        ))),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(TagRenderError::Config(format!(
            "Invalid value for '{}': {} (expected true or false)",
            key, value
        ))),
    }
}
