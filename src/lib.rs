// Game Roster Library - event registration with a PIN-guarded admin console
// This exposes the core components for testing and integration

pub mod auth;
pub mod config;
pub mod http;
pub mod roster;
pub mod shutdown;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use auth::{
    AdminGuard, LoginError, LoginThrottle, PinCheck, SessionTrustStore, TrustStore, TrustToken,
    UNKNOWN_CLIENT,
};
pub use config::GameRosterConfig;
pub use http::{build_router, serve, AppState};
pub use roster::{
    render_csv, AdminConsole, AdminOverview, Registrant, Roster, RosterDocument, RosterError, Settings,
};
pub use store::{DocumentStore, JsonFileStore, MemoryStore, StoreError};
pub use telemetry::{generate_correlation_id, init_telemetry};
