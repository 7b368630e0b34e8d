pub mod parsers;
pub mod record;

pub use parsers::{DescriptorParser, ParserRegistry};
pub use record::{GeoData, MetadataRecord, PhotosOrigin, Timestamp};

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::config::ScanConfig;
use crate::error::Result;
use crate::naming::descriptor_base_name;
use crate::scan::walk::{walk_tree, WalkOptions};

/// Which descriptor wins when two share a base name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The descriptor deeper in the tree wins; at equal depth the later one in
    /// traversal order wins
    #[default]
    DeepestWins,
    /// The first descriptor in traversal order wins
    FirstWins,
    /// The last descriptor in traversal order wins
    LastWins,
}

/// Lookup from normalized base name to parsed sidecar metadata
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    records: HashMap<String, MetadataRecord>,
    rejected: usize,
}

impl MetadataIndex {
    pub fn get(&self, base_name: &str) -> Option<&MetadataRecord> {
        self.records.get(base_name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Descriptors that were found but could not be read or parsed
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Accumulates records while honouring the collision policy
struct IndexBuilder {
    policy: CollisionPolicy,
    entries: HashMap<String, (usize, MetadataRecord)>,
    rejected: usize,
}

impl IndexBuilder {
    fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
            rejected: 0,
        }
    }

    fn insert(&mut self, key: String, depth: usize, record: MetadataRecord) {
        let replace = match self.entries.get(&key) {
            None => true,
            Some((existing_depth, existing)) => {
                let wins = match self.policy {
                    CollisionPolicy::DeepestWins => depth >= *existing_depth,
                    CollisionPolicy::FirstWins => false,
                    CollisionPolicy::LastWins => true,
                };
                log::debug!(
                    "Descriptor key collision on {:?}: {} vs {} ({})",
                    key,
                    display_sidecar(existing),
                    display_sidecar(&record),
                    if wins { "replaced" } else { "kept" }
                );
                wins
            }
        };
        if replace {
            self.entries.insert(key, (depth, record));
        }
    }

    fn finish(self) -> MetadataIndex {
        MetadataIndex {
            records: self
                .entries
                .into_iter()
                .map(|(key, (_, record))| (key, record))
                .collect(),
            rejected: self.rejected,
        }
    }
}

fn display_sidecar(record: &MetadataRecord) -> String {
    record
        .sidecar_path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

/// Build the metadata index for every descriptor under `root`.
///
/// Only an unreadable `root` is an error. Descriptors that fail to parse and
/// subdirectories that cannot be read are logged and skipped.
pub fn build_index(root: &Path, options: &ScanConfig) -> Result<MetadataIndex> {
    build_index_with(root, options, &ParserRegistry::new())
}

/// [`build_index`] with a caller-provided parser registry
pub fn build_index_with(
    root: &Path,
    options: &ScanConfig,
    registry: &ParserRegistry,
) -> Result<MetadataIndex> {
    let mut builder = IndexBuilder::new(options.collision_policy);
    let walk_options = WalkOptions::collect().with_follow_links(options.follow_links);

    let report = walk_tree(root, walk_options, |entry| {
        let path = entry.path();
        if !registry.is_descriptor(path) {
            return;
        }
        match registry.parse_file(path) {
            Ok(record) => {
                let name = entry.file_name().to_string_lossy();
                let key = descriptor_base_name(&name).to_string();
                builder.insert(key, entry.depth(), record);
            }
            Err(e) => {
                log::warn!("Skipping descriptor: {}", e);
                builder.rejected += 1;
            }
        }
    })?;

    let index = builder.finish();
    log::info!(
        "Indexed {} descriptors in {} ({} rejected, {} paths skipped)",
        index.len(),
        root.display(),
        index.rejected(),
        report.skipped.len()
    );
    Ok(index)
}
