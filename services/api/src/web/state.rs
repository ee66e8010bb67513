//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-request session handle.

use crate::config::Config;
use bloodreach_core::{
    purge_expired_sessions, session_key, session_key_prefix, AdminPolicy, DonorRepository,
    KeyValueStore, PortResult, SessionContext, SessionLifetime,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<DonorRepository>,
    /// Persisted session records, one slot per session token.
    pub sessions: Arc<dyn KeyValueStore>,
    pub admin_policy: Arc<AdminPolicy>,
    pub session_lifetime: SessionLifetime,
    pub config: Arc<Config>,
}

impl AppState {
    /// Restores the session stored for `token`, empty if none exists or it has expired.
    pub async fn open_session(&self, token: &str) -> PortResult<SessionContext> {
        SessionContext::restore_with(
            self.sessions.clone(),
            session_key(&self.config.app_name, Some(token)),
            self.admin_policy.clone(),
            self.session_lifetime.clone(),
        )
        .await
    }

    /// Drops every expired session slot. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> PortResult<usize> {
        purge_expired_sessions(
            self.sessions.as_ref(),
            &session_key_prefix(&self.config.app_name),
            &self.session_lifetime,
        )
        .await
    }
}

//=========================================================================================
// CurrentSession (Specific to One Request)
//=========================================================================================

/// The authenticated session of the current request, inserted by `require_auth`.
#[derive(Clone)]
pub struct CurrentSession {
    pub context: SessionContext,
}
