//! Persistence for the roster document.
//!
//! The whole roster lives in one document that is read and rewritten in full.
//! [`DocumentStore`] abstracts where it lives so the roster service can run
//! against a JSON file in production and [`MemoryStore`] in tests.

mod json_file;

pub use json_file::JsonFileStore;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

#[cfg(test)]
use mockall::automock;

use crate::roster::RosterDocument;

/// Errors that can occur while reading or writing the roster document
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster document at {path} is corrupt: {source}")]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Lock acquisition failed on {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Storage for the single roster document
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document, creating and persisting a default one if none exists
    async fn read_document(&self) -> Result<RosterDocument, StoreError>;

    /// Replace the persisted document
    async fn write_document(&self, doc: &RosterDocument) -> Result<(), StoreError>;

    /// Human-readable location, used in logs
    fn location(&self) -> String;
}

/// In-process store with no durability
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Option<RosterDocument>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document instead of the defaults
    pub fn with_document(doc: RosterDocument) -> Self {
        Self {
            document: RwLock::new(Some(doc)),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of writes issued so far, including the implicit initialization
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read_document(&self) -> Result<RosterDocument, StoreError> {
        if let Some(doc) = self.document.read().await.as_ref() {
            return Ok(doc.clone());
        }

        let mut slot = self.document.write().await;
        let doc = slot.get_or_insert_with(|| {
            self.writes.fetch_add(1, Ordering::Relaxed);
            RosterDocument::default()
        });
        Ok(doc.clone())
    }

    async fn write_document(&self, doc: &RosterDocument) -> Result<(), StoreError> {
        *self.document.write().await = Some(doc.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
