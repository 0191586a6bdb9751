//! Persisted session token port

use crate::domain::result::Result;

/// Storage key the token is persisted under
pub const TOKEN_KEY: &str = "authToken";

/// Holds at most one bearer token; `save` replaces any previous one.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, token: &str) -> Result<()>;

    /// Remove the token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}
