//! Domain Client
//!
//! Typed access to the incubator backend:
//!
//! - **IncubatorClient**: one method per resource action (list, get, create, update, delete, image)
//! - **Resource**: the backend entity kinds and their collection paths
//! - **dto**: records and per-endpoint payloads
//!
//! Paths follow a single convention: no trailing slash (`/startups`, `/startups/{id}`).

mod client;
pub mod dto;
mod resource;

pub use client::IncubatorClient;
pub use resource::Resource;
