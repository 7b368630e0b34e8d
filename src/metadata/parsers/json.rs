use std::path::Path;

use super::DescriptorParser;
use crate::error::{PhotodeckError, Result};
use crate::metadata::MetadataRecord;

/// JSON sidecars, the format Google Takeout writes
pub struct JsonDescriptorParser;

impl DescriptorParser for JsonDescriptorParser {
    fn can_parse(&self, extension: &str) -> bool {
        extension == "json"
    }

    fn parse(&self, content: &str, path: &Path) -> Result<MetadataRecord> {
        serde_json::from_str(content).map_err(|e| PhotodeckError::DescriptorParse {
            path: path.to_path_buf(),
            message: format!("JSON parse error: {}", e),
        })
    }
}
