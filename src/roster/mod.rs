//! Registration roster: the data model, the visitor-facing registration
//! workflow and the administrator controls.
//!
//! Every mutation is a read-modify-write of the whole document. [`Roster`]
//! serializes those cycles behind one process-wide lock so concurrent
//! registrations cannot observe the same pre-mutation state.

pub mod admin;
pub mod csv_export;
mod errors;
pub mod phone;
pub mod registration;
mod types;

pub use admin::{AdminConsole, AdminOverview};
pub use csv_export::{render_csv, CSV_HEADER};
pub use errors::RosterError;
pub use phone::{is_valid_phone, normalize_phone};
pub use types::{iso_millis, Registrant, RosterDocument, Settings, MAX_GAME, NO_ACTIVE_GAME};

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::store::DocumentStore;

/// Result of a transactional closure: whether the document must be persisted
pub(crate) enum Outcome<T> {
    Changed(T),
    Unchanged(T),
}

/// Shared roster service wrapping the document store
pub struct Roster {
    store: Arc<dyn DocumentStore>,
    write_lock: Mutex<()>,
}

impl Roster {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Current document, for display. Does not wait for in-flight mutations.
    pub async fn snapshot(&self) -> Result<RosterDocument, RosterError> {
        Ok(self.store.read_document().await?)
    }

    pub async fn settings(&self) -> Result<Settings, RosterError> {
        Ok(self.snapshot().await?.settings)
    }

    pub async fn find_registrant(&self, id: &str) -> Result<Option<Registrant>, RosterError> {
        Ok(self.snapshot().await?.find(id).cloned())
    }

    /// Run `apply` against the document while holding the roster lock,
    /// persisting only when it reports a change.
    pub(crate) async fn transact<T, F>(&self, apply: F) -> Result<T, RosterError>
    where
        F: FnOnce(&mut RosterDocument) -> Result<Outcome<T>, RosterError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.store.read_document().await?;

        match apply(&mut doc)? {
            Outcome::Changed(value) => {
                self.store.write_document(&doc).await?;
                Ok(value)
            }
            Outcome::Unchanged(value) => {
                debug!(store = %self.store.location(), "Roster unchanged, skipping write");
                Ok(value)
            }
        }
    }

    pub(crate) async fn toggle_registrations(&self) -> Result<bool, RosterError> {
        self.transact(|doc| {
            doc.settings.registrations_closed = !doc.settings.registrations_closed;
            Ok(Outcome::Changed(doc.settings.registrations_closed))
        })
        .await
    }

    /// Select the active game. Values outside 1..=MAX_GAME are ignored.
    pub(crate) async fn set_active_game(&self, game: i64) -> Result<Settings, RosterError> {
        self.transact(|doc| match u8::try_from(game) {
            Ok(g) if (1..=MAX_GAME).contains(&g) => {
                doc.settings.active_game = g;
                Ok(Outcome::Changed(doc.settings))
            }
            _ => Ok(Outcome::Unchanged(doc.settings)),
        })
        .await
    }
}
