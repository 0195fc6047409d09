//! Async facade over `library-core`.
//!
//! `library-core` only builds and parses; this crate owns the I/O. A
//! [`Transport`] executes each `HttpRequest`, [`ReqwestTransport`] being the
//! production one, and [`LibraryApi`] strings build, execute and parse
//! together into one `async fn` per backend operation.

mod api;
mod config;
mod transport;

pub use api::LibraryApi;
pub use config::{ClientConfig, ConfigError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use library_core::{self, ApiError};
pub use transport::{ReqwestTransport, Transport};
