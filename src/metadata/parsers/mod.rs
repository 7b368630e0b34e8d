pub mod json;
pub mod yaml;

use std::path::Path;

use super::MetadataRecord;
use crate::error::{PhotodeckError, Result};

/// Trait for sidecar descriptor parsers
pub trait DescriptorParser: Send + Sync {
    /// Check if this parser can handle the given (lowercase) file extension
    fn can_parse(&self, extension: &str) -> bool;

    /// Parse descriptor content into a metadata record
    fn parse(&self, content: &str, path: &Path) -> Result<MetadataRecord>;
}

/// Parser registry that selects the descriptor parser by extension
pub struct ParserRegistry {
    parsers: Vec<Box<dyn DescriptorParser>>,
}

impl ParserRegistry {
    /// Create a new parser registry with all built-in parsers
    pub fn new() -> Self {
        let mut registry = Self {
            parsers: Vec::new(),
        };

        registry.register(Box::new(json::JsonDescriptorParser));
        registry.register(Box::new(yaml::YamlDescriptorParser));

        registry
    }

    /// Register a parser
    pub fn register(&mut self, parser: Box<dyn DescriptorParser>) {
        self.parsers.push(parser);
    }

    /// Find a parser that can handle the given extension
    pub fn find_parser(&self, extension: &str) -> Option<&dyn DescriptorParser> {
        let extension = extension.to_lowercase();
        self.parsers
            .iter()
            .find(|p| p.can_parse(&extension))
            .map(|p| p.as_ref())
    }

    /// Whether `path` is a descriptor file any registered parser claims
    pub fn is_descriptor(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| self.find_parser(e).is_some())
    }

    /// Read and parse the descriptor at `path`
    pub fn parse_file(&self, path: &Path) -> Result<MetadataRecord> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let parser = self.find_parser(extension).ok_or_else(|| {
            PhotodeckError::DescriptorParse {
                path: path.to_path_buf(),
                message: format!("No parser found for extension: {}", extension),
            }
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| PhotodeckError::DescriptorParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(parser.parse(&content, path)?.with_sidecar_path(path))
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
