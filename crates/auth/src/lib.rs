//! `storeadmin-auth` — roles, role-gated navigation and the session context.
//!
//! Decoupled from HTTP: the client crate fetches roles and tokens, this crate
//! decides what the admin may see and holds the credentials.

pub mod navigation;
pub mod roles;
pub mod session;

use thiserror::Error;

pub use navigation::{AdminRoles, Dashboard, landing_route, visible_navigation};
pub use roles::Role;
pub use session::{Credentials, LoginResponse, Session, SessionStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("No accessible dashboards for this user.")]
    NoAccessibleDashboard,
}
