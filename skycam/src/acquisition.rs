//! Picking up new frames from a directory the camera writes into
//!
//! The camera may rewrite a file without changing its content, so a frame
//! only counts as new when its modification time moved forward and its
//! content hash differs from the last accepted frame.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::SkycamError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif"];

/// Why a candidate frame was rejected, or that it was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    New,
    /// Modification time did not advance
    NotModified,
    /// Newer file with identical content
    SameContent,
}

/// Remembers the last accepted frame
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last_modified: Option<SystemTime>,
    last_hash: Option<String>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the file's modification time is newer than the last one
    /// seen. Records it if so.
    pub fn check_modified(&mut self, modified: SystemTime) -> Change {
        if self.last_modified.is_some_and(|last| modified <= last) {
            return Change::NotModified;
        }
        self.last_modified = Some(modified);
        Change::New
    }

    /// Check whether `hash` differs from the last accepted content. Records it
    /// if so.
    pub fn check_content(&mut self, hash: &str) -> Change {
        if self.last_hash.as_deref() == Some(hash) {
            return Change::SameContent;
        }
        self.last_hash = Some(hash.to_string());
        Change::New
    }

    pub fn last_hash(&self) -> Option<&str> {
        self.last_hash.as_deref()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Most recently modified image file in `dir`
pub fn newest_image(dir: &Path) -> Result<Option<(PathBuf, SystemTime)>, SkycamError> {
    let entries = fs::read_dir(dir).map_err(|e| SkycamError::io(dir, e))?;
    let mut newest: Option<(PathBuf, SystemTime)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| SkycamError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| SkycamError::io(&path, e))?;
        if newest.as_ref().map_or(true, |(_, t)| modified > *t) {
            newest = Some((path, modified));
        }
    }
    Ok(newest)
}

/// Image files in `dir` sorted by name
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, SkycamError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| SkycamError::io(dir, e))? {
        let path = entry.map_err(|e| SkycamError::io(dir, e))?.path();
        if path.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Same order as the watch loop: the hash is only checked for a newer file
    fn accept(detector: &mut ChangeDetector, modified: SystemTime, hash: &str) -> Change {
        match detector.check_modified(modified) {
            Change::New => detector.check_content(hash),
            rejected => rejected,
        }
    }

    #[test]
    fn test_first_frame_is_new() {
        let mut detector = ChangeDetector::new();
        assert_eq!(accept(&mut detector, SystemTime::UNIX_EPOCH, "abc"), Change::New);
        assert_eq!(detector.last_hash(), Some("abc"));
    }

    #[test]
    fn test_unmodified_rejected() {
        let mut detector = ChangeDetector::new();
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        accept(&mut detector, t, "abc");
        assert_eq!(accept(&mut detector, t, "def"), Change::NotModified);
        assert_eq!(
            accept(&mut detector, t - Duration::from_secs(1), "def"),
            Change::NotModified
        );
        assert_eq!(detector.last_hash(), Some("abc"));
    }

    #[test]
    fn test_same_content_rejected() {
        let mut detector = ChangeDetector::new();
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        accept(&mut detector, t, "abc");
        assert_eq!(
            accept(&mut detector, t + Duration::from_secs(60), "abc"),
            Change::SameContent
        );
        assert_eq!(accept(&mut detector, t + Duration::from_secs(120), "def"), Change::New);
    }

    #[test]
    fn test_list_and_newest_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a.JPG"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let names: Vec<String> = list_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png"]);

        let (newest, _) = newest_image(dir.path()).unwrap().unwrap();
        assert!(is_image(&newest));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(newest_image(dir.path()).unwrap().is_none());
        assert!(list_images(&dir.path().join("missing")).is_err());
    }
}
