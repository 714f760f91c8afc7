//! Data document loading

use crate::domain::TaggedValue;
use crate::error::{Result, TagRenderError};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a JSON or YAML data file into a value tree
pub fn load_data(path: &Path) -> Result<TaggedValue> {
    let contents = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TagRenderError::DataNotFound(path.to_path_buf())
        } else {
            TagRenderError::Io(e)
        }
    })?;

    parse_data(&contents)
}

/// Parse document text, trying JSON first and YAML second
pub fn parse_data(contents: &str) -> Result<TaggedValue> {
    let raw: serde_json::Value = match serde_json::from_str(contents) {
        Ok(raw) => raw,
        Err(json_err) => {
            debug!(error = %json_err, "data is not JSON, trying YAML");
            serde_yaml::from_str(contents).map_err(|yaml_err| {
                TagRenderError::DataLoad(format!(
                    "not valid JSON ({}) or YAML ({})",
                    json_err, yaml_err
                ))
            })?
        }
    };

    TaggedValue::from_document(&raw)
        .ok_or_else(|| TagRenderError::DataLoad("document has no content".to_string()))
}
