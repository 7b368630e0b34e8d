use std::path::{Component, Path};
use url::Url;

use crate::error::{PhotodeckError, Result};

/// Route prefix of the raw file endpoint
pub const IMAGE_ROUTE: &str = "image";

/// Builds the `fetch` URL of a media file.
///
/// `<public_url>/image/<prefix segments>/<relative path segments>`, every segment
/// percent-encoded. The prefix is the listing target below the media root, so a
/// URL built during a scan of a subdirectory still resolves from the root.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: Url,
}

impl LinkBuilder {
    pub fn new(public_url: &str) -> Result<Self> {
        let mut base = Url::parse(public_url)
            .map_err(|e| PhotodeckError::Config(format!("Invalid public URL {}: {}", public_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(PhotodeckError::Config(format!(
                "Public URL cannot be used as a base: {}",
                public_url
            )));
        }
        base.set_query(None);
        base.set_fragment(None);
        base.path_segments_mut()
            .map_err(|_| PhotodeckError::Config(format!("Invalid public URL: {}", public_url)))?
            .pop_if_empty()
            .push(IMAGE_ROUTE);
        Ok(Self { base })
    }

    /// Builder for files listed relative to `target` below the media root
    pub fn nested(&self, target: &Path) -> Self {
        Self {
            base: self.with_segments(target),
        }
    }

    /// URL for a file at `relative` (to the walked root)
    pub fn link(&self, relative: &Path) -> String {
        self.with_segments(relative).into()
    }

    fn with_segments(&self, path: &Path) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            for component in path.components() {
                if let Component::Normal(part) = component {
                    segments.push(&part.to_string_lossy());
                }
            }
        }
        url
    }
}
