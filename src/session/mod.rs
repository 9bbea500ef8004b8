//! Session
//!
//! Auth token and user identity shared between the transport (which reads
//! the token for every request) and the views (which show who is logged in).

mod store;
mod token_store;

pub use store::{Session, SessionStore};
pub use token_store::TokenStore;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from token persistence
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Token file {path:?}: {error}")]
    Io { path: PathBuf, error: String },
}
