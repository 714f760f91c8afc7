//! Error types for tagrender

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tagrender
#[derive(Debug, Error)]
pub enum TagRenderError {
    #[error("Data file not found: {0}")]
    DataNotFound(PathBuf),

    #[error("Template file not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Failed to load data: {0}")]
    DataLoad(String),

    #[error("Markup error: {0}")]
    Markup(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("No data found for tags: {}", .0.join(", "))]
    NoDataForTags(Vec<String>),

    #[error("{failed} of {total} variants failed to render")]
    Variants { failed: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl TagRenderError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TagRenderError::DataNotFound(_) | TagRenderError::TemplateNotFound(_) => 2,
            TagRenderError::DataLoad(_) => 3,
            TagRenderError::NoDataForTags(_) => 4,
            TagRenderError::Render(_) | TagRenderError::Variants { .. } => 5,
            _ => 1,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            TagRenderError::DataNotFound(path) | TagRenderError::TemplateNotFound(path) => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Check the path passed to --data / --template\n\
                    • Relative paths are resolved from the current directory ({})",
                    self,
                    path.parent()
                        .map(|p| p.display().to_string())
                        .filter(|p| !p.is_empty())
                        .unwrap_or_else(|| ".".to_string())
                )
            }
            TagRenderError::DataLoad(msg) => {
                format!(
                    "Failed to load data: {}\n\n\
                    Suggestions:\n\
                    • The data file must be valid JSON or YAML\n\
                    • Envelope objects look like: {{ value: ..., tags: [work], url: ..., exclusive: true }}",
                    msg
                )
            }
            TagRenderError::NoDataForTags(tags) => {
                format!(
                    "No data found for tags: {}\n\n\
                    Suggestions:\n\
                    • Tags are case-insensitive\n\
                    • Run 'tagrender tags --data <file>' to see available tags\n\
                    • Use --iterate to render one document per tag",
                    tags.join(", ")
                )
            }
            TagRenderError::Render(msg) => {
                format!(
                    "Render error: {}\n\n\
                    Suggestions:\n\
                    • Check that a Chromium-based browser is installed and in PATH\n\
                    • Set TAGRENDER_BROWSER (e.g., export TAGRENDER_BROWSER=google-chrome)\n\
                    • Use --format html to skip PDF conversion",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using TagRenderError
pub type Result<T> = std::result::Result<T, TagRenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_exit_code() {
        assert_eq!(
            TagRenderError::DataNotFound(PathBuf::from("cv.yaml")).exit_code(),
            2
        );
        assert_eq!(
            TagRenderError::TemplateNotFound(PathBuf::from("cv.html")).exit_code(),
            2
        );
    }

    #[test]
    fn test_data_load_suggestions() {
        let err = TagRenderError::DataLoad("expected value".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("expected value"));
        assert!(msg.contains("JSON or YAML"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_no_data_for_tags_suggestions() {
        let err = TagRenderError::NoDataForTags(vec!["work".to_string(), "oss".to_string()]);
        let msg = err.display_with_suggestions();
        assert!(msg.contains("work, oss"));
        assert!(msg.contains("tagrender tags"));
        assert!(msg.contains("case-insensitive"));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_render_error_suggestions() {
        let err = TagRenderError::Render("browser exited with status 1".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("TAGRENDER_BROWSER"));
        assert!(msg.contains("--format html"));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_variants_message() {
        let err = TagRenderError::Variants {
            failed: 2,
            total: 5,
        };
        assert_eq!(err.to_string(), "2 of 5 variants failed to render");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_other_errors_fallback() {
        let err = TagRenderError::Config("bad key".to_string());
        let msg = err.display_with_suggestions();
        assert_eq!(msg, "Configuration error: bad key");
        assert_eq!(err.exit_code(), 1);
    }
}
