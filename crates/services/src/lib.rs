#![forbid(unsafe_code)]

pub mod auth;
pub mod catalog;
pub mod error;
pub mod resources;
pub mod watch;

pub use course_core::Clock;

pub use auth::{AuthService, OAuthConfig};
pub use catalog::CatalogService;
pub use error::{AuthError, CatalogError, ResourceError};
pub use resources::ResourceService;
pub use watch::{WatchSession, WatchState};
