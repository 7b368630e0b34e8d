use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::metadata::CollisionPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Library roots
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// Root of the photo/video tree served by the browser.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
    /// Root of the sidecar descriptor tree. Falls back to `media_root` when unset,
    /// which is the usual layout of a Google Takeout export.
    #[serde(default)]
    pub metadata_root: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            metadata_root: None,
            log_level: default_log_level(),
        }
    }
}

/// Scan behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
    #[serde(default = "default_follow_links")]
    pub follow_links: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            collision_policy: CollisionPolicy::default(),
            follow_links: default_follow_links(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    /// Base address used when building `fetch` URLs. Defaults to
    /// `http://localhost:<port>`.
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            public_url: None,
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_media_root() -> PathBuf {
    PathBuf::from("photos")
}

fn default_follow_links() -> bool {
    true
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    // Empty means any origin; list origins here to restrict browser access
    vec![]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in PHOTODECK_CONFIG environment variable
    /// 2. ./config.toml in current directory
    ///
    /// A missing file is not an error when PHOTODECK_CONFIG is unset: defaults are used
    /// and the PHOTODECK_* environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let explicit = std::env::var("PHOTODECK_CONFIG").ok().map(PathBuf::from);
        let config_path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from("config.toml"));

        let mut config = if explicit.is_some() || config_path.exists() {
            Self::from_file(&config_path)?
        } else {
            log::info!("No config file at {}, using defaults", config_path.display());
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML config file without applying overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(root) = std::env::var("PHOTODECK_MEDIA_ROOT") {
            self.library.media_root = PathBuf::from(root);
        }
        if let Ok(root) = std::env::var("PHOTODECK_METADATA_ROOT") {
            self.library.metadata_root = Some(PathBuf::from(root));
        }
        if let Ok(port) = std::env::var("PHOTODECK_PORT") {
            self.http_server.port = port
                .parse()
                .with_context(|| format!("PHOTODECK_PORT is not a valid port: {}", port))?;
        }
        if let Ok(url) = std::env::var("PHOTODECK_PUBLIC_URL") {
            self.http_server.public_url = Some(url);
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (name, root) in [
            ("media_root", self.media_root()),
            ("metadata_root", self.metadata_root()),
        ] {
            if !root.exists() {
                anyhow::bail!(
                    "{} path does not exist: {}. Set it in config.toml or PHOTODECK_{}.",
                    name,
                    root.display(),
                    name.to_uppercase()
                );
            }
            if !root.is_dir() {
                anyhow::bail!("{} must be a directory, not a file: {}", name, root.display());
            }
        }

        if self.http_server.port == 0 {
            anyhow::bail!("http_server.port must be greater than 0");
        }

        let public_url = self.public_url();
        let parsed = url::Url::parse(&public_url)
            .with_context(|| format!("http_server.public_url is not a valid URL: {}", public_url))?;
        if parsed.cannot_be_a_base() {
            anyhow::bail!("http_server.public_url must be an http(s) base URL: {}", public_url);
        }

        Ok(())
    }

    /// Get the media root path
    pub fn media_root(&self) -> &Path {
        &self.library.media_root
    }

    /// Get the metadata root path (media root when not configured separately)
    pub fn metadata_root(&self) -> &Path {
        self.library
            .metadata_root
            .as_deref()
            .unwrap_or(&self.library.media_root)
    }

    /// Base address for access URLs
    pub fn public_url(&self) -> String {
        self.http_server
            .public_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.http_server.port))
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_server.host, self.http_server.port)
    }
}
