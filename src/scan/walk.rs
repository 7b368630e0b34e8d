//! Recursive directory walk shared by the metadata indexer and the media walker.
//!
//! Both callers walk the same way and only differ in how they treat an entry that
//! cannot be read: the indexer keeps going, the media walker gives up.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{PhotodeckError, Result};

/// What a walk does when a directory or entry below the root cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort on the first unreadable entry with `DirectoryUnreadable`
    FailFast,
    /// Log, record in the report and continue with the siblings
    Collect,
}

/// Options for [`walk_tree`]
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    pub policy: ErrorPolicy,
    pub follow_links: bool,
}

impl WalkOptions {
    pub fn fail_fast() -> Self {
        Self {
            policy: ErrorPolicy::FailFast,
            follow_links: true,
        }
    }

    pub fn collect() -> Self {
        Self {
            policy: ErrorPolicy::Collect,
            follow_links: true,
        }
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
}

/// An entry the walk did not descend into or visit
#[derive(Debug, Clone)]
pub struct SkippedPath {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of a finished walk
#[derive(Debug, Default)]
pub struct WalkReport {
    pub files_visited: usize,
    pub skipped: Vec<SkippedPath>,
}

/// Walk `root` depth-first and call `visit` for every regular file.
///
/// Entries are visited sorted by file name. The root must be a listable directory
/// under either policy. Symlink cycles (only reachable with `follow_links`) and
/// entries that vanish mid-walk are always skipped with a warning.
pub fn walk_tree<F>(root: &Path, options: WalkOptions, mut visit: F) -> Result<WalkReport>
where
    F: FnMut(&DirEntry),
{
    std::fs::read_dir(root).map_err(|e| PhotodeckError::unreadable(root, e))?;

    let mut report = WalkReport::default();

    for result in WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name()
    {
        let err = match result {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    report.files_visited += 1;
                    visit(&entry);
                }
                continue;
            }
            Err(err) => err,
        };

        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        let reason = err.to_string();

        if let Some(ancestor) = err.loop_ancestor() {
            log::warn!(
                "Skipping symlink cycle at {} (points back to {})",
                path.display(),
                ancestor.display()
            );
            report.skipped.push(SkippedPath { path, reason });
            continue;
        }

        let vanished = err
            .io_error()
            .map_or(false, |e| e.kind() == io::ErrorKind::NotFound);
        if vanished {
            log::warn!("Skipping missing entry {}: {}", path.display(), reason);
            report.skipped.push(SkippedPath { path, reason });
            continue;
        }

        match options.policy {
            ErrorPolicy::FailFast => {
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, reason));
                return Err(PhotodeckError::unreadable(path, source));
            }
            ErrorPolicy::Collect => {
                log::warn!("Skipping unreadable entry {}: {}", path.display(), reason);
                report.skipped.push(SkippedPath { path, reason });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Make `dir` unlistable. Returns false when the process can read it anyway
    /// (running as root), in which case permission tests have nothing to check.
    #[cfg(unix)]
    pub(crate) fn lock_dir(dir: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(dir).is_ok() {
            unlock_dir(dir);
            return false;
        }
        true
    }

    #[cfg(unix)]
    pub(crate) fn unlock_dir(dir: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Plant a symlink that resolves to itself, so stat-ing it fails with ELOOP
    /// even for root
    #[cfg(unix)]
    pub(crate) fn plant_broken_link(dir: &Path) -> PathBuf {
        let link = dir.join("self");
        std::os::unix::fs::symlink("self", &link).unwrap();
        link
    }

    fn visited_names(root: &Path, options: WalkOptions) -> Result<Vec<String>> {
        let mut names = Vec::new();
        walk_tree(root, options, |entry| {
            names.push(
                entry
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/"),
            );
        })?;
        Ok(names)
    }

    #[test]
    fn test_walk_visits_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("z.txt"), "z").unwrap();
        fs::write(root.join("b/nested/x.jpg"), "x").unwrap();
        fs::write(root.join("a/y.png"), "y").unwrap();

        let names = visited_names(root, WalkOptions::fail_fast()).unwrap();
        assert_eq!(names, vec!["a/y.png", "b/nested/x.jpg", "z.txt"]);
    }

    #[test]
    fn test_walk_missing_root_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        for options in [WalkOptions::fail_fast(), WalkOptions::collect()] {
            let err = walk_tree(&missing, options, |_| {}).unwrap_err();
            assert!(matches!(err, PhotodeckError::DirectoryUnreadable { .. }));
        }
    }

    #[test]
    fn test_walk_file_root_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("photo.jpg");
        fs::write(&file, "x").unwrap();

        let err = walk_tree(&file, WalkOptions::collect(), |_| {}).unwrap_err();
        assert!(matches!(err, PhotodeckError::DirectoryUnreadable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_policies_on_unreadable_subdir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("locked")).unwrap();
        fs::write(root.join("locked/hidden.jpg"), "x").unwrap();
        fs::write(root.join("open.jpg"), "x").unwrap();

        if !lock_dir(&root.join("locked")) {
            return;
        }
        let strict = visited_names(root, WalkOptions::fail_fast());
        let tolerant = walk_tree(root, WalkOptions::collect(), |_| {});
        unlock_dir(&root.join("locked"));

        match strict {
            Err(PhotodeckError::DirectoryUnreadable { path, .. }) => {
                assert!(path.ends_with("locked"));
            }
            other => panic!("expected DirectoryUnreadable, got {:?}", other),
        }

        let report = tolerant.unwrap();
        assert_eq!(report.files_visited, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("locked"));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_policies_on_unstatable_entry() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("bad")).unwrap();
        fs::write(root.join("bad/hidden.jpg"), "x").unwrap();
        fs::write(root.join("open.jpg"), "x").unwrap();
        plant_broken_link(&root.join("bad"));

        match visited_names(root, WalkOptions::fail_fast()) {
            Err(PhotodeckError::DirectoryUnreadable { path, .. }) => {
                assert!(path.ends_with("bad/self"));
            }
            other => panic!("expected DirectoryUnreadable, got {:?}", other),
        }

        let mut names = Vec::new();
        let report = walk_tree(root, WalkOptions::collect(), |entry| {
            names.push(entry.file_name().to_string_lossy().into_owned());
        })
        .unwrap();
        assert_eq!(names, vec!["hidden.jpg", "open.jpg"]);
        assert_eq!(report.files_visited, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("bad/self"));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_symlink_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("album")).unwrap();
        fs::write(root.join("album/photo.jpg"), "x").unwrap();
        std::os::unix::fs::symlink(root, root.join("album/loop")).unwrap();

        let mut count = 0;
        let report = walk_tree(root, WalkOptions::fail_fast(), |_| count += 1).unwrap();
        assert_eq!(count, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("loop"));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_without_follow_links_ignores_symlinked_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("elsewhere.jpg"), "x").unwrap();
        fs::write(temp_dir.path().join("here.jpg"), "x").unwrap();
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("linked")).unwrap();

        let followed = visited_names(temp_dir.path(), WalkOptions::collect()).unwrap();
        assert_eq!(followed, vec!["here.jpg", "linked/elsewhere.jpg"]);

        let unfollowed = visited_names(
            temp_dir.path(),
            WalkOptions::collect().with_follow_links(false),
        )
        .unwrap();
        assert_eq!(unfollowed, vec!["here.jpg"]);
    }
}
