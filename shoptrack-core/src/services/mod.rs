//! Services - the API client, the session and the inventory screens
//!
//! All three share one `ApiClient` and report to the same `View`.

mod api;
mod inventory;
mod sequence;
mod session;

pub use api::{ApiClient, DEFAULT_LOW_STOCK_THRESHOLD};
pub use inventory::InventoryApp;
pub use session::SessionManager;
