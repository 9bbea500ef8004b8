//! # Incubator Portal
//!
//! Client side of the incubator's public and administrative portal: a typed
//! REST client, a session store, a paginating startup cache, a month
//! calendar view-model and the state behind each screen.
//!
//! ## Modules
//!
//! - [`transport`]: HTTP transport with base URL, auth header and error mapping
//! - [`api`]: typed client, one method per backend resource and action
//! - [`session`]: current token and user, with change notifications
//! - [`cache`]: read-through cache aggregating every startup page
//! - [`calendar`]: month grid that buckets dated records by day
//! - [`views`]: filters, popups, forms, admin console, auth flows, widgets
//! - [`config`]: TOML, environment and runtime configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use incubator_portal::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let session = SessionStore::new();
//!
//!     let transport = HttpTransport::with_session(config.transport_config(), session.clone())?;
//!     let client = IncubatorClient::new(Arc::new(transport));
//!
//!     // Every startup, loaded page by page and sorted by name
//!     let cache = StartupCache::new(Arc::new(client.clone()), config.api.page_size);
//!     let startups = cache.get_all().await;
//!     println!("{} startups", startups.len());
//!
//!     // Events for March 2024
//!     let events = client.list_events(None, None).await?;
//!     let calendar = CalendarView::new(&events, MonthCursor::new(2024, 2));
//!     println!("{}", calendar.month_label());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod session;
pub mod transport;
pub mod views;

#[cfg(test)]
mod test_support;

// Re-export top-level types for convenience
pub use api::{IncubatorClient, Resource};

pub use cache::{StartupCache, StartupList, StartupSource};

pub use calendar::{CalendarCell, CalendarView, DatedRecord, MonthCursor};

pub use config::{Config, ConfigError, RuntimeConfig};

pub use session::{Session, SessionError, SessionStore, TokenStore};

pub use transport::{ApiError, ApiResult, HttpTransport, Page, TransportConfig};
