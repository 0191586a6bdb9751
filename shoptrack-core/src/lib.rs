//! ShopTrack Core - Client library for the ShopTrack inventory service
//!
//! This crate implements the client-side logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Product, HistoryEntry, User, etc.)
//! - **ports**: Trait definitions for external dependencies (Transport, TokenStore, View)
//! - **services**: API client, session management and the inventory controller
//! - **adapters**: Concrete implementations (reqwest, session file, etc.)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use adapters::{FileTokenStore, ReqwestTransport};
use config::Config;
use ports::{TokenStore, Transport, View};
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    Action, Credentials, HistoryEntry, HistoryFilter, HistoryInput, Product, ProductInput,
    Registration, StockOperation, User,
};
pub use domain::result::{Envelope, Error};
pub use ports::{Notice, NoticeKind, Section};

/// Main context for ShopTrack operations
///
/// This is the primary entry point for all client logic. It holds the
/// configuration and one instance of each service, and moves the inventory
/// controller along with the session.
pub struct ShopTrackContext {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub session: SessionManager,
    pub app: InventoryApp,
}

impl ShopTrackContext {
    /// Create a context over the data directory, restoring any saved session
    pub fn new(data_dir: &Path, view: Arc<dyn View>) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let transport = ReqwestTransport::new(config.request_timeout())?;
        let tokens = FileTokenStore::new(data_dir);

        Self::with_parts(config, Arc::new(transport), Arc::new(tokens), view)
    }

    /// Create a context from explicit adapters
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
        view: Arc<dyn View>,
    ) -> Result<Self> {
        let api = Arc::new(
            ApiClient::new(&config.api_base_url, transport, Arc::clone(&tokens))
                .context("Failed to create API client")?,
        );
        debug!(base_url = api.base_url(), "API client ready");

        let session = SessionManager::new(Arc::clone(&api), tokens, Arc::clone(&view));
        let app = InventoryApp::new(Arc::clone(&api), view);

        Ok(Self {
            config,
            api,
            session,
            app,
        })
    }

    /// Load the main app if a restored session is valid
    pub fn start(&self) -> bool {
        if self.session.is_authenticated() {
            self.app.enter_main_app();
            true
        } else {
            false
        }
    }

    pub fn login(&self, credentials: &Credentials) -> domain::result::Result<User> {
        let user = self.session.login(credentials)?;
        self.app.enter_main_app();
        Ok(user)
    }

    pub fn register(&self, registration: &Registration) -> domain::result::Result<User> {
        let user = self.session.register(registration)?;
        self.app.enter_main_app();
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.logout();
        self.app.reset();
    }

    /// Fail fast for commands that need a session
    pub fn require_session(&self) -> domain::result::Result<User> {
        self.session.require_user()
    }
}
