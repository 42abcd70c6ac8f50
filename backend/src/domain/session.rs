//! In-memory UI session state.
//!
//! Holds the signed-in user, the active project selection and the theme
//! preference. Kept in memory only, never persisted; a restart starts a
//! fresh session.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Signed-in user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub plan: String,
}

/// UI theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SessionState {
    user: Option<UserProfile>,
    active_project_id: Option<String>,
    theme: Theme,
}

/// Session service holding the current UI state behind a shared lock.
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.lock().unwrap().user.clone()
    }

    pub fn set_user(&self, user: UserProfile) {
        self.state.lock().unwrap().user = Some(user);
    }

    pub fn active_project_id(&self) -> Option<String> {
        self.state.lock().unwrap().active_project_id.clone()
    }

    pub fn set_active_project(&self, project_id: Option<String>) {
        self.state.lock().unwrap().active_project_id = project_id;
    }

    pub fn theme(&self) -> Theme {
        self.state.lock().unwrap().theme
    }

    pub fn set_theme(&self, theme: Theme) {
        self.state.lock().unwrap().theme = theme;
    }

    /// Clear the user and project selection. The theme preference survives
    /// logout.
    pub fn logout(&self) {
        let mut state = self.state.lock().unwrap();
        state.user = None;
        state.active_project_id = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
