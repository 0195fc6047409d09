//! Domain DTOs for the library backend.
//!
//! # Design
//! These types mirror the backend's JSON schema but are defined independently
//! of the mock-server crate; integration tests catch schema drift. Optional
//! fields default when absent and are skipped when `None`, so "absent" never
//! goes over the wire as `null`.

pub mod auth;
pub mod book;
pub mod borrow;
pub mod common;
pub mod menu;
pub mod role;
pub mod user;

pub use auth::*;
pub use book::*;
pub use borrow::*;
pub use common::*;
pub use menu::*;
pub use role::*;
pub use user::*;
