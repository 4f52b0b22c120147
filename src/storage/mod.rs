//! Filesystem-backed media object store.
//!
//! Stands in for the external object storage the public site serves
//! images from: objects live under a root directory keyed by the owning
//! slug, and every stored object has a publicly resolvable URL derived
//! from the configured base. The catalog keeps only the storage path
//! and URL; nothing else is tracked about the binary.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::StorageConfig;
use crate::db::Database;

pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
}

/// Handle to a stored binary: the store key and its public URL.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub storage_path: String,
    pub url: String,
}

/// Result of an orphan sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepResult {
    pub files_deleted: usize,
    pub bytes_freed: u64,
}

/// Outcome of a batch import. Failures are per-file and never abort the
/// rest of the batch.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub added: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl MediaStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.media_root.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Generate a unique object name to avoid collisions. Uses a global
    /// atomic counter to stay unique even when called from multiple
    /// threads within the same second.
    fn object_name(original: &Path) -> String {
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let timestamp = chrono::Utc::now().timestamp();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let stem = original
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "object".to_string());
        let extension = original
            .extension()
            .map(|s| format!(".{}", s.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        format!("{}_{}_{}{}", stem, timestamp, seq, extension)
    }

    /// Store a binary under the given slug and return its handle.
    pub fn put(&self, slug: &str, original_name: &Path, bytes: &[u8]) -> Result<StoredObject> {
        let dir = self.root.join(slug);
        fs::create_dir_all(&dir).context("Failed to create media directory")?;

        let name = Self::object_name(original_name);
        let storage_path = format!("{}/{}", slug, name);
        fs::write(dir.join(&name), bytes).context("Failed to write stored object")?;

        Ok(StoredObject {
            url: self.public_url(&storage_path),
            storage_path,
        })
    }

    /// Copy a local file into the store.
    pub fn import_file(&self, slug: &str, path: &Path) -> Result<StoredObject> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.put(slug, path, &bytes)
    }

    /// Public URL for a storage path.
    pub fn public_url(&self, storage_path: &str) -> String {
        format!("{}/{}", self.public_base_url, storage_path)
    }

    /// Delete a stored object. Callers treat failure as best-effort:
    /// the catalog removal proceeds and the object becomes an orphan
    /// for the next sweep.
    pub fn delete(&self, storage_path: &str) -> Result<()> {
        fs::remove_file(self.root.join(storage_path))
            .with_context(|| format!("Failed to delete stored object {}", storage_path))?;
        Ok(())
    }

    /// Absolute path of the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the store and delete every object the catalog no longer
    /// references.
    pub fn sweep_orphans(&self, referenced: &HashSet<String>) -> Result<SweepResult> {
        let mut result = SweepResult::default();
        if !self.root.exists() {
            return Ok(result);
        }

        for entry in WalkDir::new(&self.root) {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => rel.to_string_lossy().to_string(),
                Err(_) => continue,
            };
            if referenced.contains(&rel) {
                continue;
            }
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    result.files_deleted += 1;
                    result.bytes_freed += size;
                }
                Err(e) => {
                    warn!("Failed to delete orphan {}: {}", rel, e);
                }
            }
        }

        Ok(result)
    }
}

/// Find image files directly inside a directory, filtered by extension.
pub fn discover_images(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_default();
            extensions.iter().any(|e| e.to_lowercase() == ext)
        })
        .collect();
    files.sort();
    files
}

/// Import a batch of files for a project: copies run in parallel, each
/// failure is reported and skipped, and catalog rows are appended for
/// the successes on the calling thread.
pub fn import_batch(
    db: &Database,
    store: &MediaStore,
    project_id: i64,
    slug: &str,
    files: &[PathBuf],
) -> Result<ImportReport> {
    let stored: Vec<(PathBuf, Result<StoredObject>)> = files
        .par_iter()
        .map(|path| (path.clone(), store.import_file(slug, path)))
        .collect();

    let mut report = ImportReport::default();
    for (path, outcome) in stored {
        match outcome {
            Ok(object) => {
                db.insert_project_image(
                    project_id,
                    &object.url,
                    Some(&object.storage_path),
                    None,
                    None,
                )?;
                report.added += 1;
            }
            Err(e) => {
                warn!("Failed to import {}: {}", path.display(), e);
                report.failed.push((path, e.to_string()));
            }
        }
    }

    info!(
        "Imported {} image(s) for {} ({} failed)",
        report.added,
        slug,
        report.failed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    fn test_store(root: &Path) -> MediaStore {
        MediaStore::new(&StorageConfig {
            media_root: root.to_path_buf(),
            public_base_url: "https://media.example.com/".to_string(),
        })
    }

    #[test]
    fn test_put_and_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let object = store
            .put("villa-aurelia", Path::new("kitchen.JPG"), b"bytes")
            .unwrap();
        assert!(object.storage_path.starts_with("villa-aurelia/kitchen_"));
        assert!(object.storage_path.ends_with(".jpg"));
        assert_eq!(
            object.url,
            format!("https://media.example.com/{}", object.storage_path)
        );
        assert!(dir.path().join(&object.storage_path).exists());
    }

    #[test]
    fn test_object_names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let a = store.put("s", Path::new("a.jpg"), b"1").unwrap();
        let b = store.put("s", Path::new("a.jpg"), b"2").unwrap();
        assert_ne!(a.storage_path, b.storage_path);
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let object = store.put("s", Path::new("a.jpg"), b"1").unwrap();

        store.delete(&object.storage_path).unwrap();
        assert!(!dir.path().join(&object.storage_path).exists());
        // Deleting again fails; callers log and move on.
        assert!(store.delete(&object.storage_path).is_err());
    }

    #[test]
    fn test_sweep_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let kept = store.put("s", Path::new("kept.jpg"), b"keep").unwrap();
        let orphan = store.put("s", Path::new("orphan.jpg"), b"drop me").unwrap();

        let referenced: HashSet<String> = [kept.storage_path.clone()].into_iter().collect();
        let result = store.sweep_orphans(&referenced).unwrap();

        assert_eq!(result.files_deleted, 1);
        assert_eq!(result.bytes_freed, 7);
        assert!(dir.path().join(&kept.storage_path).exists());
        assert!(!dir.path().join(&orphan.storage_path).exists());
    }

    #[test]
    fn test_discover_images_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"1").unwrap();
        std::fs::write(dir.path().join("b.PNG"), b"2").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"3").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c.jpg"), b"4").unwrap();

        let extensions = vec!["jpg".to_string(), "png".to_string()];
        let found = discover_images(dir.path(), &extensions);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        // Non-recursive: nested files are not picked up.
        assert_eq!(names, vec!["a.jpg", "b.PNG"]);
    }

    #[test]
    fn test_import_batch_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path().join("media").as_path());
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let project_id = db.create_project("casa", "Casa").unwrap();

        let good = dir.path().join("good.jpg");
        std::fs::write(&good, b"image bytes").unwrap();
        let missing = dir.path().join("missing.jpg");

        let report =
            import_batch(&db, &store, project_id, "casa", &[good, missing.clone()]).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, missing);

        let (images, _, _) = db.get_project_media(project_id).unwrap();
        assert_eq!(images.len(), 1);
        assert!(images[0].url.starts_with("https://media.example.com/casa/good_"));
    }
}
