//! Presentation port
//!
//! The services push plain data into a view and never read anything back.
//! The terminal front end implements this; tests use a recording view.

use crate::domain::{HistoryEntry, Product, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Which list the main app is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Products,
    History,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Products => "products",
            Section::History => "history",
        }
    }
}

pub trait View: Send + Sync {
    fn render_products(&self, products: &[Product]);

    fn render_history(&self, history: &[HistoryEntry]);

    fn notify(&self, notice: Notice);

    /// Logged-out state: show login/register
    fn show_auth_section(&self);

    /// Logged-in state
    fn show_main_app(&self, user: Option<&User>);

    fn show_section(&self, section: Section);

    /// `None` opens an empty form for a new product
    fn show_product_form(&self, product: Option<&Product>);

    fn hide_product_form(&self);
}
