//! Core domain entities
//!
//! Plain data structures with validation logic - no I/O.

mod history;
mod product;
pub mod result;
pub(crate) mod serde_util;
mod user;

pub use history::{Action, HistoryEntry, HistoryFilter, HistoryInput};
pub use product::{
    parse_quantity, validate_quantity, Product, ProductInput, StockOperation, LOW_STOCK_LEVEL,
};
pub use user::{is_valid_email, Credentials, Registration, Session, User, ValidatedSession};
