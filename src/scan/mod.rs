pub mod links;
pub mod media;
pub mod shallow;
pub mod walk;

pub use links::LinkBuilder;
pub use media::{walk_media, MediaRecord};
pub use shallow::{scan_single, ShallowListing};
pub use walk::{walk_tree, ErrorPolicy, WalkOptions, WalkReport};

use std::path::{Component, Path, PathBuf};

use crate::config::{Config, ScanConfig};
use crate::error::{PhotodeckError, Result};
use crate::metadata::build_index;

/// Index `metadata_root`, then walk `media_root` joining each file with its sidecar.
///
/// Read-only and uncached: every call walks both trees again.
pub fn list_all(
    media_root: &Path,
    metadata_root: &Path,
    links: &LinkBuilder,
    options: &ScanConfig,
) -> Result<Vec<MediaRecord>> {
    let index = build_index(metadata_root, options)?;
    walk_media(media_root, &index, links, options)
}

/// Resolve a request target below `root`.
///
/// The target is a relative path; empty means `root` itself. Anything that would
/// leave `root` (`..`, absolute paths, drive prefixes) is rejected.
pub fn resolve_target(root: &Path, target: &str) -> Result<PathBuf> {
    Ok(root.join(relative_target(target)?))
}

/// Normalized relative form of a request target
pub fn relative_target(target: &str) -> Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(target.trim_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PhotodeckError::InvalidPath(target.to_string()));
            }
        }
    }
    Ok(relative)
}

/// The configured library: roots, scan options and link base in one place
#[derive(Debug, Clone)]
pub struct Library {
    media_root: PathBuf,
    metadata_root: PathBuf,
    options: ScanConfig,
    links: LinkBuilder,
}

impl Library {
    pub fn new(
        media_root: impl Into<PathBuf>,
        metadata_root: impl Into<PathBuf>,
        options: ScanConfig,
        links: LinkBuilder,
    ) -> Self {
        Self {
            media_root: media_root.into(),
            metadata_root: metadata_root.into(),
            options,
            links,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.media_root(),
            config.metadata_root(),
            config.scan.clone(),
            LinkBuilder::new(&config.public_url())?,
        ))
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    pub fn metadata_root(&self) -> &Path {
        &self.metadata_root
    }

    /// Full listing of `target` below the media root, joined with the whole
    /// metadata tree
    pub fn list_all(&self, target: &str) -> Result<Vec<MediaRecord>> {
        let relative = relative_target(target)?;
        let links = self.links.nested(&relative);
        list_all(
            &self.media_root.join(&relative),
            &self.metadata_root,
            &links,
            &self.options,
        )
    }

    /// Shallow listing of `target` below the media root
    pub fn scan_single(&self, target: &str) -> Result<ShallowListing> {
        scan_single(&resolve_target(&self.media_root, target)?)
    }

    /// Path of a media file below the media root; `FileNotFound` unless it is an
    /// existing regular file.
    ///
    /// Blocking. With `follow_links` off, a file whose real location is outside
    /// the media root is treated as missing, matching what the walk would list.
    pub fn media_file(&self, target: &str) -> Result<PathBuf> {
        let path = resolve_target(&self.media_root, target)
            .map_err(|_| PhotodeckError::FileNotFound(PathBuf::from(target)))?;
        if target.trim_matches('/').is_empty() || !path.is_file() {
            return Err(PhotodeckError::FileNotFound(path));
        }
        if !self.options.follow_links && !self.contains(&path)? {
            log::warn!("Refusing to serve {} outside the media root", path.display());
            return Err(PhotodeckError::FileNotFound(path));
        }
        Ok(path)
    }

    fn contains(&self, path: &Path) -> Result<bool> {
        let root = std::fs::canonicalize(&self.media_root)?;
        let real = std::fs::canonicalize(path)?;
        Ok(real.starts_with(root))
    }
}
