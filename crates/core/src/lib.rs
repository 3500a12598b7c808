//! `storeadmin-core`: identifiers and client-side rule errors shared by every
//! admin crate. No IO, no HTTP.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AdminId, CategoryId, OrderId, ProductId, ReturnId, WarehouseId};
