use crate::config::Config;
use crate::error::{GymError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: String,
    pub display_name: String,
}

/// Who is using the app. Identity itself comes from config or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    LoggedOut,
    LoggedIn(Member),
}

impl AuthState {
    pub fn from_config(cfg: &Config) -> Self {
        match cfg.user_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => AuthState::LoggedIn(Member {
                user_id: id.to_string(),
                display_name: cfg.display_name.clone(),
            }),
            _ => AuthState::LoggedOut,
        }
    }

    pub fn member(&self) -> Option<&Member> {
        match self {
            AuthState::LoggedIn(m) => Some(m),
            AuthState::LoggedOut => None,
        }
    }

    /// Gate for actions that need an identity.
    pub fn require_member(&self) -> Result<&Member> {
        self.member().ok_or(GymError::NotLoggedIn)
    }

    pub fn is_logged_in(&self) -> bool {
        self.member().is_some()
    }
}
