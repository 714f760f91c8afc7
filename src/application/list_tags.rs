//! List tags use case

use crate::error::Result;
use crate::infrastructure::load_data;
use std::path::Path;

/// Service listing every tag used in a data document.
pub struct ListTagsService;

impl ListTagsService {
    /// Load `data` and return its tags, sorted and deduplicated.
    pub fn execute(data: &Path) -> Result<Vec<String>> {
        let data = load_data(data)?;
        Ok(data.every_tag().into_iter().collect())
    }
}
