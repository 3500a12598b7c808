//! `storeadmin-client`
//!
//! **Responsibility:** the admin panel as a terminal client over the store's
//! REST backend.
//!
//! This crate provides:
//! - A typed REST client carrying the session's bearer token
//! - The role-gated route table and its guard
//! - Sequenced polling of realtime inventory and the inventory report
//! - Dashboard state and table rendering
//!
//! The backend stays the authority; nothing is cached across polls.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod poll;
pub mod render;
pub mod routes;

pub use api::{ApiClient, ApiMessage, ClientError};
pub use config::{ClientConfig, ConfigError};
pub use dashboard::DashboardState;
pub use poll::{InventoryPoller, InventorySource, SequencedSlot, Ticket};
pub use routes::{Resolution, Route, resolve};
