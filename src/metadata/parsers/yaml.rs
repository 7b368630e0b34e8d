use std::path::Path;

use super::DescriptorParser;
use crate::error::{PhotodeckError, Result};
use crate::metadata::MetadataRecord;

/// Hand-written YAML sidecars using the same field names as Takeout JSON
pub struct YamlDescriptorParser;

impl DescriptorParser for YamlDescriptorParser {
    fn can_parse(&self, extension: &str) -> bool {
        extension == "yaml" || extension == "yml"
    }

    fn parse(&self, content: &str, path: &Path) -> Result<MetadataRecord> {
        serde_yaml_ng::from_str(content).map_err(|e| PhotodeckError::DescriptorParse {
            path: path.to_path_buf(),
            message: format!("YAML parse error: {}", e),
        })
    }
}
