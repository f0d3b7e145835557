//! On-disk cache for opaque icon bytes.
//!
//! StatusNotifierItem hosts load icons by name from a theme path, so the raw
//! bytes are written to a file named after their content hash and the host is
//! pointed at that file. Theme lookup only searches `.png`, `.svg` and `.xpm`,
//! so ICO bytes are never cached; the backend shows its fallback icon instead.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An icon stored in the cache, addressed the way SNI expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedIcon {
    /// Directory to use as `icon_theme_path`.
    pub theme_path: PathBuf,
    /// File stem to use as `icon_name`.
    pub name: String,
}

/// Writes icon bytes into a directory under content-hash file names.
#[derive(Clone, Debug)]
pub struct IconCache {
    dir: PathBuf,
}

impl IconCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores `bytes` unless an identical icon is already cached.
    pub fn store(&self, bytes: &[u8]) -> Result<CachedIcon> {
        let name = hex::encode(&Sha256::digest(bytes)[..8]);
        let path = self
            .dir
            .join(format!("{name}.{}", icon_extension(bytes)));

        if !path.exists() {
            fs::create_dir_all(&self.dir)?;
            fs::write(&path, bytes)?;
            debug!(path = %path.display(), "cached tray icon");
        }

        Ok(CachedIcon {
            theme_path: self.dir.clone(),
            name,
        })
    }
}

/// Whether an SNI host can load `bytes` through an icon theme path.
pub fn theme_loadable(bytes: &[u8]) -> bool {
    icon_extension(bytes) != "ico"
}

/// Guesses a file extension from the leading bytes of an image.
pub fn icon_extension(bytes: &[u8]) -> &'static str {
    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
    const ICO_MAGIC: &[u8] = b"\x00\x00\x01\x00";

    if bytes.starts_with(PNG_MAGIC) {
        return "png";
    }
    if bytes.starts_with(ICO_MAGIC) {
        return "ico";
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return "svg";
    }
    "png"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_known_formats() {
        assert_eq!(icon_extension(b"\x89PNG\r\n\x1a\nrest"), "png");
        assert_eq!(icon_extension(b"\x00\x00\x01\x00\x01\x00"), "ico");
        assert_eq!(icon_extension(b"  <svg xmlns=\"x\"></svg>"), "svg");
        assert_eq!(icon_extension(b"<?xml version=\"1.0\"?><svg/>"), "svg");
        assert_eq!(icon_extension(b"garbage"), "png");
    }

    #[test]
    fn ico_is_not_theme_loadable() {
        assert!(!theme_loadable(b"\x00\x00\x01\x00\x01\x00"));
        assert!(theme_loadable(b"\x89PNG\r\n\x1a\n"));
        assert!(theme_loadable(b"<svg/>"));
    }

    #[test]
    fn store_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IconCache::new(dir.path().join("icons"));

        let first = cache.store(b"\x89PNG\r\n\x1a\none").unwrap();
        let again = cache.store(b"\x89PNG\r\n\x1a\none").unwrap();
        let other = cache.store(b"\x89PNG\r\n\x1a\ntwo").unwrap();

        assert_eq!(first, again);
        assert_ne!(first.name, other.name);
        assert_eq!(first.theme_path, cache.dir());
        assert!(cache.dir().join(format!("{}.png", first.name)).exists());
    }
}
