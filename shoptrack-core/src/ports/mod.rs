//! Port definitions
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, not on concrete implementations.

mod token_store;
mod transport;
mod view;

pub use token_store::{TokenStore, TOKEN_KEY};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
pub use view::{Notice, NoticeKind, Section, View};
