//! View Components
//!
//! Plain state containers for each screen of the portal. Each one owns its
//! inputs, a loading flag and an optional user-facing error; async methods
//! take the client or cache they need explicitly.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod filters;
pub mod forms;
pub mod popup;

pub use admin::AdminConsole;
pub use auth::{LoginForm, RegisterFlow, RegisterPhase};
pub use chat::{ChatWidget, ConversationView};
pub use dashboard::Dashboard;
pub use filters::{DatedListFilter, SortOrder, StartupFilter};
pub use forms::{EditPopup, EntityForm, ValidationErrors};
pub use popup::DetailPopup;
