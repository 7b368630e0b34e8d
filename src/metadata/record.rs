//! Sidecar metadata as exported by Google Photos Takeout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Parsed sidecar descriptor for one media file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub photo_taken_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_views: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_data: Option<GeoData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_data_exif: Option<GeoData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_photos_origin: Option<PhotosOrigin>,
    /// Descriptor file this record was read from; set by the indexer
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub sidecar_path: Option<PathBuf>,
    /// Fields this struct does not model, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Epoch-seconds timestamp with Google's preformatted rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    #[serde(deserialize_with = "epoch_string")]
    pub timestamp: String,
    #[serde(default)]
    pub formatted: String,
}

impl Timestamp {
    pub fn epoch_seconds(&self) -> Option<i64> {
        self.timestamp.trim().parse().ok()
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.epoch_seconds()?, 0)
    }
}

/// Geolocation block; Google writes all zeros when the location is unknown
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoData {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub latitude_span: f64,
    #[serde(default)]
    pub longitude_span: f64,
}

impl GeoData {
    pub fn is_known(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotosOrigin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_shared_album: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MetadataRecord {
    /// Attach the descriptor path. A `sidecarPath` key inside the descriptor itself
    /// is dropped so it cannot shadow the real one.
    pub fn with_sidecar_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra.remove("sidecarPath");
        self.sidecar_path = Some(path.into());
        self
    }

    /// Capture time as epoch seconds
    pub fn taken_at_epoch(&self) -> Option<i64> {
        self.photo_taken_time.epoch_seconds()
    }

    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        self.photo_taken_time.to_datetime()
    }

    /// First known location, preferring the value Google edited over the EXIF one
    pub fn location(&self) -> Option<GeoData> {
        [self.geo_data, self.geo_data_exif]
            .into_iter()
            .flatten()
            .find(GeoData::is_known)
    }

    /// Shared album this item was saved from, if any
    pub fn source_album(&self) -> Option<&serde_json::Value> {
        self.google_photos_origin
            .as_ref()
            .and_then(|origin| origin.from_shared_album.as_ref())
    }
}

/// Takeout writes timestamps as strings; older exports and hand-written sidecars
/// use plain numbers. Both end up as the decimal string.
fn epoch_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Epoch {
        Text(String),
        Int(i64),
    }

    match Epoch::deserialize(deserializer)? {
        Epoch::Text(s) => {
            if s.trim().parse::<i64>().is_err() {
                return Err(serde::de::Error::custom(format!(
                    "timestamp is not epoch seconds: {:?}",
                    s
                )));
            }
            Ok(s)
        }
        Epoch::Int(n) => Ok(n.to_string()),
    }
}
