use serde::{Deserialize, Serialize};
use std::path::Path;

use super::links::LinkBuilder;
use super::walk::{walk_tree, WalkOptions};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::metadata::{MetadataIndex, MetadataRecord};
use crate::naming::{is_media_file, media_base_name};

/// One media file in a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// File name with extension
    pub name: String,
    /// Filesystem path as walked
    pub path: String,
    /// Address the file is served from
    pub fetch: String,
    pub metadata: Option<MetadataRecord>,
}

/// Recursively list the media files under `root`, joined with `index`.
///
/// Fail-fast: any directory below `root` that cannot be read aborts the whole
/// walk with `DirectoryUnreadable`, no partial list is returned.
pub fn walk_media(
    root: &Path,
    index: &MetadataIndex,
    links: &LinkBuilder,
    options: &ScanConfig,
) -> Result<Vec<MediaRecord>> {
    let mut records = Vec::new();
    let mut matched = 0usize;
    let walk_options = WalkOptions::fail_fast().with_follow_links(options.follow_links);

    walk_tree(root, walk_options, |entry| {
        let name = entry.file_name().to_string_lossy();
        if !is_media_file(&name) {
            return;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let metadata = index.get(media_base_name(&name)).cloned();
        if metadata.is_some() {
            matched += 1;
        }

        records.push(MediaRecord {
            name: name.to_string(),
            path: path.to_string_lossy().to_string(),
            fetch: links.link(relative),
            metadata,
        });
    })?;

    log::info!(
        "Found {} media files in {} ({} with metadata)",
        records.len(),
        root.display(),
        matched
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhotodeckError;
    use crate::metadata::build_index;
    use std::fs;
    use tempfile::TempDir;

    fn links() -> LinkBuilder {
        LinkBuilder::new("http://localhost:3000").unwrap()
    }

    #[test]
    fn test_walk_media_filters_allowlist() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("2023/trip.jpg")).unwrap(); // directory with a media-like name
        fs::write(root.join("a.png"), b"\x89PNG").unwrap();
        fs::write(root.join("B.JPEG"), b"\xff\xd8").unwrap();
        fs::write(root.join("2023/clip.MOV"), b"mov").unwrap();
        fs::write(root.join("2023/trip.jpg/c.heif"), b"heif").unwrap();
        fs::write(root.join("2023/notes.txt"), "text").unwrap();
        fs::write(root.join("2023/c.heif.json"), "{}").unwrap();
        fs::write(root.join("raw.cr2"), b"raw").unwrap();

        let records =
            walk_media(root, &MetadataIndex::default(), &links(), &ScanConfig::default()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["clip.MOV", "c.heif", "B.JPEG", "a.png"]);
        assert!(records.iter().all(|r| r.metadata.is_none()));
        assert!(records.iter().all(|r| Path::new(&r.path).is_file()));
    }

    #[test]
    fn test_walk_media_paths_and_links() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Summer 2023")).unwrap();
        fs::write(root.join("Summer 2023/IMG_1.jpg"), b"\xff\xd8").unwrap();

        let records =
            walk_media(root, &MetadataIndex::default(), &links(), &ScanConfig::default()).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "IMG_1.jpg");
        assert_eq!(
            Path::new(&record.path),
            root.join("Summer 2023/IMG_1.jpg").as_path()
        );
        assert_eq!(
            record.fetch,
            "http://localhost:3000/image/Summer%202023/IMG_1.jpg"
        );
    }

    #[test]
    fn test_walk_media_joins_metadata() {
        let media = TempDir::new().unwrap();
        let meta = TempDir::new().unwrap();
        fs::create_dir_all(meta.path().join("Takeout/Photos from 2023")).unwrap();
        fs::write(media.path().join("IMG_1.jpg"), b"\xff\xd8").unwrap();
        fs::write(media.path().join("IMG_2.jpg"), b"\xff\xd8").unwrap();
        fs::write(media.path().join("img_3.jpg"), b"\xff\xd8").unwrap();
        fs::write(
            meta.path().join("Takeout/Photos from 2023/IMG_1.jpg.json"),
            r#"{"photoTakenTime":{"timestamp":"1700000000","formatted":"X"}}"#,
        )
        .unwrap();
        fs::write(
            meta.path().join("IMG_2.json"),
            r#"{"photoTakenTime":{"timestamp":"1600000000","formatted":"Y"}}"#,
        )
        .unwrap();
        fs::write(
            meta.path().join("IMG_3.json"),
            r#"{"photoTakenTime":{"timestamp":"1500000000","formatted":"Z"}}"#,
        )
        .unwrap();

        let options = ScanConfig::default();
        let index = build_index(meta.path(), &options).unwrap();
        let records = walk_media(media.path(), &index, &links(), &options).unwrap();
        assert_eq!(records.len(), 3);

        let by_name = |name: &str| records.iter().find(|r| r.name == name).unwrap();
        let img1 = by_name("IMG_1.jpg").metadata.as_ref().unwrap();
        assert_eq!(img1.photo_taken_time.timestamp, "1700000000");
        assert_eq!(img1, index.get("IMG_1").unwrap());
        assert_eq!(
            by_name("IMG_2.jpg").metadata.as_ref().unwrap().taken_at_epoch(),
            Some(1_600_000_000)
        );
        // Join keys are case-sensitive
        assert!(by_name("img_3.jpg").metadata.is_none());
    }

    #[test]
    fn test_walk_media_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = walk_media(
            &temp_dir.path().join("missing"),
            &MetadataIndex::default(),
            &links(),
            &ScanConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PhotodeckError::DirectoryUnreadable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_media_fails_fast_on_unreadable_subdir() {
        use crate::scan::walk::tests::{lock_dir, unlock_dir};

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("locked")).unwrap();
        fs::write(root.join("locked/secret.jpg"), b"x").unwrap();
        fs::write(root.join("a.jpg"), b"x").unwrap();
        fs::write(root.join("z.jpg"), b"x").unwrap();

        if !lock_dir(&root.join("locked")) {
            return;
        }
        let result = walk_media(root, &MetadataIndex::default(), &links(), &ScanConfig::default());
        unlock_dir(&root.join("locked"));

        assert!(matches!(
            result,
            Err(PhotodeckError::DirectoryUnreadable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_media_fails_fast_on_unstatable_entry() {
        use crate::scan::walk::tests::plant_broken_link;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("album")).unwrap();
        fs::write(root.join("album/a.jpg"), b"x").unwrap();
        fs::write(root.join("z.jpg"), b"x").unwrap();
        plant_broken_link(&root.join("album"));

        let result = walk_media(root, &MetadataIndex::default(), &links(), &ScanConfig::default());
        match result {
            Err(PhotodeckError::DirectoryUnreadable { path, .. }) => {
                assert!(path.ends_with("album/self"));
            }
            other => panic!("expected DirectoryUnreadable, got {:?}", other),
        }
    }
}
