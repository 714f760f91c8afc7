//! Configuration management

use crate::error::{Result, TagRenderError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "tagrender.toml";

/// Environment variable overriding the browser command
pub const BROWSER_ENV: &str = "TAGRENDER_BROWSER";

const DEFAULT_BROWSER: &str = "chromium";

/// Paper presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
}

impl PaperSize {
    /// Width and height in inches
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (8.27, 11.69),
            PaperSize::Letter => (8.5, 11.0),
        }
    }
}

impl FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "letter" => Ok(PaperSize::Letter),
            _ => Err(format!("Invalid paper size: {} (use 'a4' or 'letter')", s)),
        }
    }
}

/// Page setup handed to the PDF renderer; dimensions in inches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptions {
    pub paper: PaperSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_height: Option<f64>,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub print_background: bool,
    pub landscape: bool,
    pub display_header_footer: bool,
    pub prefer_css_page_size: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        PdfOptions {
            paper: PaperSize::A4,
            paper_width: None,
            paper_height: None,
            margin_top: 0.39,
            margin_bottom: 0.39,
            margin_left: 0.39,
            margin_right: 0.39,
            print_background: true,
            landscape: false,
            display_header_footer: false,
            prefer_css_page_size: false,
        }
    }
}

impl PdfOptions {
    /// Effective (width, height) after explicit sizes and orientation
    pub fn page_size(&self) -> (f64, f64) {
        let (preset_width, preset_height) = self.paper.dimensions();
        let width = self.paper_width.unwrap_or(preset_width);
        let height = self.paper_height.unwrap_or(preset_height);
        if self.landscape {
            (height, width)
        } else {
            (width, height)
        }
    }

    pub fn set_margins(&mut self, inches: f64) {
        self.margin_top = inches;
        self.margin_bottom = inches;
        self.margin_left = inches;
        self.margin_right = inches;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Browser program and leading arguments, e.g. `google-chrome --disable-extensions`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub pdf: PdfOptions,
    pub browser: BrowserConfig,
}

impl RenderConfig {
    /// Load config from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TagRenderError::Config(format!("Config file not found: {}", path.display()))
            } else {
                TagRenderError::Io(e)
            }
        })?;

        toml::from_str(&contents).map_err(|e| {
            TagRenderError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load an explicit config file, else `tagrender.toml` in `dir`, else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let candidate = dir.join(CONFIG_FILE);
        if candidate.exists() {
            Self::load_from_file(&candidate)
        } else {
            Ok(RenderConfig::default())
        }
    }

    /// Write config to `path`
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Write a new `tagrender.toml` into `dir`, refusing to overwrite one
    pub fn init_in_dir(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            return Err(TagRenderError::Config(format!(
                "Config file already exists: {}",
                path.display()
            )));
        }

        self.save_to_file(&path)?;
        Ok(path)
    }

    /// Get the browser command, checking the environment first
    pub fn browser_command(&self) -> String {
        std::env::var(BROWSER_ENV)
            .ok()
            .filter(|cmd| !cmd.trim().is_empty())
            .or_else(|| self.browser.command.clone())
            .unwrap_or_else(|| DEFAULT_BROWSER.to_string())
    }
}
