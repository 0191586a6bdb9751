//! CLI command implementations

pub mod auth;
pub mod config;
pub mod history;
pub mod products;
pub mod shell;
pub mod stock;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use shoptrack_core::ShopTrackContext;
use tracing::debug;

use crate::view::TerminalView;

/// An error the view has already shown to the user
#[derive(Debug)]
pub struct Reported(pub shoptrack_core::Error);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Reported {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Convert a service result; its failure was already pushed to the view
pub fn reported<T>(result: shoptrack_core::domain::result::Result<T>) -> Result<T> {
    result.map_err(|e| Reported(e).into())
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SHOPTRACK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".shoptrack"))
        .context("Could not find home directory; set SHOPTRACK_DIR")
}

/// Build a context; restoring a saved session may hit the network
pub fn get_context(view: &Arc<TerminalView>) -> Result<ShopTrackContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
    debug!(data_dir = %data_dir.display(), "Using data directory");

    let dyn_view: Arc<dyn shoptrack_core::ports::View> = view.clone();
    view.spin("Connecting to ShopTrack...", || {
        ShopTrackContext::new(&data_dir, dyn_view)
    })
    .context("Failed to initialize ShopTrack context")
}

/// Context for commands that need a logged-in user
pub fn get_session_context(view: &Arc<TerminalView>) -> Result<ShopTrackContext> {
    let ctx = get_context(view)?;
    ctx.require_session()
        .context("Not logged in. Run 'shoptrack login' first.")?;
    Ok(ctx)
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
