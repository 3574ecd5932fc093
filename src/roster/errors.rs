use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by roster operations.
///
/// The registration variants carry the message shown to the visitor, so their
/// `Display` output is user-facing text.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Registrations are closed.")]
    RegistrationsClosed,

    #[error("No game is open for registration.")]
    NoActiveGame,

    #[error("Name is required.")]
    MissingName,

    #[error("Enter a valid 10-digit phone number.")]
    InvalidPhone,

    #[error("This phone is already registered for Game {game}.")]
    DuplicateRegistration { game: u8 },

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RosterError {
    /// Registration failures that are reported back to the visitor instead of
    /// being treated as a server fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            RosterError::RegistrationsClosed
                | RosterError::NoActiveGame
                | RosterError::MissingName
                | RosterError::InvalidPhone
                | RosterError::DuplicateRegistration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_names_the_game() {
        let err = RosterError::DuplicateRegistration { game: 1 };
        assert_eq!(err.to_string(), "This phone is already registered for Game 1.");
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(RosterError::MissingName.is_user_facing());
        assert!(RosterError::DuplicateRegistration { game: 4 }.is_user_facing());
        assert!(!RosterError::Unauthorized.is_user_facing());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert!(!RosterError::Store(StoreError::Io(io)).is_user_facing());
    }
}
