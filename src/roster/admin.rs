use std::sync::Arc;
use tracing::info;

use super::{render_csv, Registrant, Roster, RosterError, Settings};
use crate::auth::AdminGuard;

/// What the administrator dashboard shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminOverview {
    pub settings: Settings,
    pub registrants: Vec<Registrant>,
}

/// Administrator operations. Each one checks the caller's trust token first
/// and fails with [`RosterError::Unauthorized`] when it is missing or stale.
pub struct AdminConsole {
    roster: Arc<Roster>,
    guard: Arc<AdminGuard>,
}

impl AdminConsole {
    pub fn new(roster: Arc<Roster>, guard: Arc<AdminGuard>) -> Self {
        Self { roster, guard }
    }

    /// Flip the registrations-closed flag, returning the new value
    pub async fn toggle_registrations(&self, token: Option<&str>) -> Result<bool, RosterError> {
        self.guard.require_trust(token).await?;
        let closed = self.roster.toggle_registrations().await?;
        info!(registrations_closed = closed, "Registrations toggled");
        Ok(closed)
    }

    /// Select the active game; out-of-range values leave settings unchanged
    pub async fn set_active_game(&self, token: Option<&str>, game: i64) -> Result<Settings, RosterError> {
        self.guard.require_trust(token).await?;
        let settings = self.roster.set_active_game(game).await?;
        if i64::from(settings.active_game) == game {
            info!(active_game = settings.active_game, "Active game selected");
        } else {
            info!(requested = game, active_game = settings.active_game, "Ignored out-of-range game");
        }
        Ok(settings)
    }

    pub async fn list_registrants(&self, token: Option<&str>) -> Result<Vec<Registrant>, RosterError> {
        self.guard.require_trust(token).await?;
        Ok(self.roster.snapshot().await?.sorted_registrants())
    }

    pub async fn overview(&self, token: Option<&str>) -> Result<AdminOverview, RosterError> {
        self.guard.require_trust(token).await?;
        let doc = self.roster.snapshot().await?;
        Ok(AdminOverview {
            settings: doc.settings,
            registrants: doc.sorted_registrants(),
        })
    }

    pub async fn export_csv(&self, token: Option<&str>) -> Result<String, RosterError> {
        let registrants = self.list_registrants(token).await?;
        info!(rows = registrants.len(), "Exporting registrants");
        Ok(render_csv(&registrants))
    }

    pub async fn logout(&self, token: Option<&str>) -> Result<(), RosterError> {
        self.guard.require_trust(token).await?;
        self.guard.revoke_trust(token).await;
        info!("Admin logged out");
        Ok(())
    }
}
