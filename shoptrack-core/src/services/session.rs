//! Session service - login, registration, logout and session restore

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Credentials, Registration, Session, User};
use crate::ports::{Notice, TokenStore, View};
use crate::services::ApiClient;

/// Authentication state of the running client
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated { user: User },
}

/// Owns the persisted token and the current user
pub struct SessionManager {
    api: Arc<ApiClient>,
    tokens: Arc<dyn TokenStore>,
    view: Arc<dyn View>,
    state: Mutex<AuthState>,
}

impl SessionManager {
    /// Create the manager and restore a persisted session if there is one
    pub fn new(api: Arc<ApiClient>, tokens: Arc<dyn TokenStore>, view: Arc<dyn View>) -> Self {
        let manager = Self {
            api,
            tokens,
            view,
            state: Mutex::new(AuthState::Unauthenticated),
        };
        manager.check_auth_status();
        manager
    }

    fn state(&self) -> MutexGuard<'_, AuthState> {
        // State is a plain value; a panicked holder cannot leave it half-written
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: AuthState) {
        *self.state() = state;
    }

    /// Probe `/auth/validate` once if a token is persisted
    fn check_auth_status(&self) {
        let token = match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read stored session");
                None
            }
        };

        if token.is_none() {
            debug!("No stored session");
            self.view.show_auth_section();
            return;
        }

        match self.api.validate().and_then(|envelope| envelope.into_data()) {
            Ok(validated) => {
                info!(user_id = %validated.user.id, "Restored session");
                self.view.show_main_app(Some(&validated.user));
                self.set_state(AuthState::Authenticated {
                    user: validated.user,
                });
            }
            Err(e) => {
                // Any failure means the stored token is no good
                debug!(error = %e, "Stored session rejected");
                self.discard_token();
                self.set_state(AuthState::Unauthenticated);
                self.view.show_auth_section();
            }
        }
    }

    pub fn login(&self, credentials: &Credentials) -> Result<User> {
        if let Err(e) = credentials.validate() {
            self.view.notify(Notice::error(e.to_string()));
            return Err(e);
        }

        let result = self
            .api
            .login(credentials)
            .and_then(|envelope| envelope.into_data())
            .and_then(|session| self.establish(session));

        match result {
            Ok(user) => {
                info!(user_id = %user.id, "Logged in");
                self.view.notify(Notice::success("Login successful!"));
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.view.notify(Notice::error(failure_message(&e, "Login failed")));
                Err(e)
            }
        }
    }

    pub fn register(&self, registration: &Registration) -> Result<User> {
        if let Err(e) = registration.validate() {
            self.view.notify(Notice::error(e.to_string()));
            return Err(e);
        }

        let result = self
            .api
            .register(registration)
            .and_then(|envelope| envelope.into_data())
            .and_then(|session| self.establish(session));

        match result {
            Ok(user) => {
                info!(user_id = %user.id, "Registered");
                self.view.notify(Notice::success("Registration successful!"));
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.view
                    .notify(Notice::error(failure_message(&e, "Registration failed")));
                Err(e)
            }
        }
    }

    /// Persist the token and switch to the authenticated state
    fn establish(&self, session: Session) -> Result<User> {
        self.tokens.save(&session.token)?;
        let user = User::new(session.user_id);
        self.set_state(AuthState::Authenticated { user: user.clone() });
        self.view.show_main_app(Some(&user));
        Ok(user)
    }

    /// Log out. Local state is cleared even when the server call fails.
    pub fn logout(&self) {
        if let Err(e) = self.api.logout() {
            warn!(error = %e, "Logout request failed");
        }

        self.discard_token();
        self.set_state(AuthState::Unauthenticated);
        self.view.show_auth_section();
        self.view.notify(Notice::success("Logged out successfully"));
    }

    fn discard_token(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state(), AuthState::Authenticated { .. })
    }

    pub fn current_user(&self) -> Option<User> {
        match &*self.state() {
            AuthState::Authenticated { user } => Some(user.clone()),
            AuthState::Unauthenticated => None,
        }
    }

    /// The persisted bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.tokens.load().ok().flatten()
    }

    pub fn welcome_message(&self) -> Option<String> {
        self.current_user()
            .map(|user| format!("Welcome, {}!", user.display_name()))
    }

    /// The current user, or `NotAuthenticated`
    pub fn require_user(&self) -> Result<User> {
        self.current_user().ok_or(Error::NotAuthenticated)
    }
}

/// Server or transport messages pass through; the fallback covers blank ones
fn failure_message(error: &Error, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
