use async_trait::async_trait;
use fd_lock::RwLock;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{DocumentStore, StoreError};
use crate::roster::RosterDocument;

/// Roster document stored as pretty-printed JSON on disk.
///
/// Writes go to a sibling `.tmp` file that is renamed over the document, so
/// readers never observe a partially written file. An advisory lock on a
/// sibling `.lock` file keeps other processes sharing the document from
/// interleaving with us: reads take it shared, writes exclusive.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn read_document(&self) -> Result<RosterDocument, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_or_initialize(&path)).await?
    }

    async fn write_document(&self, doc: &RosterDocument) -> Result<(), StoreError> {
        let path = self.path.clone();
        let doc = doc.clone();
        tokio::task::spawn_blocking(move || {
            ensure_parent_dir(&path)?;
            let mut lock = RwLock::new(open_lock_file(&path)?);
            let _guard = lock.write().map_err(|source| lock_error(&path, source))?;
            write_atomically(&path, &doc)
        })
        .await?
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn read_or_initialize(path: &Path) -> Result<RosterDocument, StoreError> {
    ensure_parent_dir(path)?;
    let mut lock = RwLock::new(open_lock_file(path)?);

    if !path.exists() {
        let _guard = lock.write().map_err(|source| lock_error(path, source))?;
        // Another process may have created it while we waited for the lock
        if path.exists() {
            return parse_document(path);
        }
        let doc = RosterDocument::default();
        write_atomically(path, &doc)?;
        info!(file = %path.display(), "Initialized roster document with defaults");
        return Ok(doc);
    }

    let _guard = lock.read().map_err(|source| lock_error(path, source))?;
    parse_document(path)
}

fn parse_document(path: &Path) -> Result<RosterDocument, StoreError> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| StoreError::CorruptStore {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomically(path: &Path, doc: &RosterDocument) -> Result<(), StoreError> {
    let serialized = serde_json::to_string_pretty(doc).map_err(StoreError::Serialize)?;
    let temp_file = sibling(path, "tmp");
    fs::write(&temp_file, serialized)?;
    fs::rename(&temp_file, path)?;

    debug!(
        file = %path.display(),
        registrants = doc.students.len(),
        "Roster document written"
    );
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn open_lock_file(path: &Path) -> Result<File, StoreError> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(sibling(path, "lock"))?;
    Ok(file)
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn lock_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Lock {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Registrant;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_first_read_creates_default_document_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("db.json");
        let store = JsonFileStore::new(&path);

        let doc = store.read_document().await.unwrap();

        assert_eq!(doc, RosterDocument::default());
        assert!(path.exists());
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["settings"]["activeGame"], 1);
        assert_eq!(on_disk["students"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_write_then_read_preserves_registrants() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("db.json"));

        let mut doc = store.read_document().await.unwrap();
        doc.settings.registrations_closed = true;
        doc.students.push(Registrant {
            id: "lx1abc".to_string(),
            name: "Ann".to_string(),
            phone: "5551234567".to_string(),
            game: Some(1),
            turn_number: Some(1),
            created_at: Utc::now(),
        });
        store.write_document(&doc).await.unwrap();

        let reloaded = store.read_document().await.unwrap();
        assert!(reloaded.settings.registrations_closed);
        assert_eq!(reloaded.students.len(), 1);
        assert_eq!(reloaded.students[0].phone, "5551234567");
        assert!(!sibling(store.path(), "tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_document_fails_loudly() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.read_document().await.unwrap_err();

        assert!(matches!(err, StoreError::CorruptStore { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_document_with_wrong_shape_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        fs::write(&path, r#"{"settings": {"registrationsClosed": "nope", "activeGame": 1}, "students": []}"#)
            .unwrap();

        let err = JsonFileStore::new(&path).read_document().await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptStore { .. }));
    }

    #[test]
    fn test_sibling_paths() {
        let path = Path::new("data/db.json");
        assert_eq!(sibling(path, "lock"), PathBuf::from("data/db.json.lock"));
        assert_eq!(sibling(path, "tmp"), PathBuf::from("data/db.json.tmp"));
    }
}
