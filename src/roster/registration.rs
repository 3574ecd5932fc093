use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{normalize_phone, phone::is_valid_phone, Outcome, Registrant, Roster, RosterDocument, RosterError};

impl Roster {
    /// Admit a visitor into the active game.
    ///
    /// Validation, turn assignment and the append happen under the roster
    /// lock, so turn numbers stay gapless per game under concurrent requests.
    pub async fn register(&self, name: &str, raw_phone: &str) -> Result<Registrant, RosterError> {
        let result = self
            .transact(|doc| admit(doc, name, raw_phone, Utc::now()).map(Outcome::Changed))
            .await;

        match &result {
            Ok(registrant) => info!(
                registrant.id = %registrant.id,
                game = ?registrant.game,
                turn = ?registrant.turn_number,
                "Registrant admitted"
            ),
            Err(e) if e.is_user_facing() => info!(reason = %e, "Registration rejected"),
            Err(e) => warn!(error = %e, "Registration failed"),
        }

        result
    }
}

/// Validate a registration against `doc` and append it on success.
///
/// Checks run in a fixed order and stop at the first failure: closed,
/// no active game, missing name, malformed phone, duplicate phone in game.
pub fn admit(
    doc: &mut RosterDocument,
    name: &str,
    raw_phone: &str,
    now: DateTime<Utc>,
) -> Result<Registrant, RosterError> {
    let active_game = doc.settings.active_game;
    let name = name.trim();
    let phone = normalize_phone(raw_phone);

    if doc.settings.registrations_closed {
        return Err(RosterError::RegistrationsClosed);
    }
    if !doc.settings.has_active_game() {
        return Err(RosterError::NoActiveGame);
    }
    if name.is_empty() {
        return Err(RosterError::MissingName);
    }
    if !is_valid_phone(&phone) {
        return Err(RosterError::InvalidPhone);
    }
    if doc.has_registration(&phone, active_game) {
        return Err(RosterError::DuplicateRegistration { game: active_game });
    }

    let registrant = Registrant {
        id: Registrant::generate_id(now),
        name: name.to_string(),
        phone,
        game: Some(active_game),
        turn_number: Some(doc.next_turn_number(active_game)),
        created_at: now,
    };
    doc.students.push(registrant.clone());
    Ok(registrant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore, MockDocumentStore, StoreError};
    use std::sync::Arc;

    fn open_doc(game: u8) -> RosterDocument {
        let mut doc = RosterDocument::default();
        doc.settings.active_game = game;
        doc
    }

    #[test]
    fn test_admit_normalizes_and_numbers() {
        let mut doc = open_doc(1);
        let now = Utc::now();

        let ann = admit(&mut doc, "  Ann ", "555-123-4567", now).unwrap();

        assert_eq!(ann.name, "Ann");
        assert_eq!(ann.phone, "5551234567");
        assert_eq!(ann.game, Some(1));
        assert_eq!(ann.turn_number, Some(1));
        assert_eq!(ann.created_at, now);
        assert_eq!(doc.students, vec![ann]);
    }

    #[test]
    fn test_closed_check_wins_over_every_other_failure() {
        let mut doc = open_doc(0);
        doc.settings.registrations_closed = true;

        let err = admit(&mut doc, "", "12", Utc::now()).unwrap_err();
        assert!(matches!(err, RosterError::RegistrationsClosed));
        assert!(doc.students.is_empty());
    }

    #[test]
    fn test_validation_order() {
        let now = Utc::now();

        let err = admit(&mut open_doc(0), "", "12", now).unwrap_err();
        assert!(matches!(err, RosterError::NoActiveGame));

        let err = admit(&mut open_doc(2), "   ", "12", now).unwrap_err();
        assert!(matches!(err, RosterError::MissingName));

        let err = admit(&mut open_doc(2), "Bo", "555-12", now).unwrap_err();
        assert!(matches!(err, RosterError::InvalidPhone));
    }

    #[test]
    fn test_duplicate_phone_in_same_game_is_rejected() {
        let mut doc = open_doc(1);
        admit(&mut doc, "Ann", "5551234567", Utc::now()).unwrap();

        let err = admit(&mut doc, "Ann again", "(555) 123-4567", Utc::now()).unwrap_err();

        assert!(matches!(err, RosterError::DuplicateRegistration { game: 1 }));
        assert!(err.to_string().contains("Game 1"));
        assert_eq!(doc.students.len(), 1);
    }

    #[test]
    fn test_turn_numbers_interleave_across_games() {
        let mut doc = open_doc(1);
        let now = Utc::now();
        admit(&mut doc, "A", "5550000001", now).unwrap();
        doc.settings.active_game = 2;
        admit(&mut doc, "B", "5550000002", now).unwrap();
        doc.settings.active_game = 1;
        let c = admit(&mut doc, "C", "5550000003", now).unwrap();
        doc.settings.active_game = 2;
        let d = admit(&mut doc, "D", "5550000001", now).unwrap();

        assert_eq!(c.turn_number, Some(2));
        assert_eq!(d.turn_number, Some(2));
    }

    #[tokio::test]
    async fn test_register_persists_through_store() {
        let store = Arc::new(MemoryStore::new());
        let roster = Roster::new(store.clone());

        let created = roster.register("Ann", "555-123-4567").await.unwrap();

        let doc = store.read_document().await.unwrap();
        assert_eq!(doc.students, vec![created]);
    }

    #[tokio::test]
    async fn test_rejected_registration_does_not_write() {
        let mut doc = RosterDocument::default();
        doc.settings.registrations_closed = true;
        let store = Arc::new(MemoryStore::with_document(doc));
        let roster = Roster::new(store.clone());

        let err = roster.register("Ann", "5551234567").await.unwrap_err();

        assert!(matches!(err, RosterError::RegistrationsClosed));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_propagates_as_store_error() {
        let mut store = MockDocumentStore::new();
        store
            .expect_read_document()
            .times(1)
            .returning(|| Ok(RosterDocument::default()));
        store.expect_write_document().times(1).returning(|_| {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            )))
        });
        store.expect_location().return_const("mock".to_string());
        let roster = Roster::new(Arc::new(store));

        let err = roster.register("Ann", "5551234567").await.unwrap_err();

        assert!(matches!(err, RosterError::Store(StoreError::Io(_))));
        assert!(!err.is_user_facing());
    }
}
