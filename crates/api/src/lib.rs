#![forbid(unsafe_code)]

//! Backend gateway layer: trait seams for every API collaborator, a reqwest
//! client implementing them against the platform's REST routes, and an
//! in-memory fake for tests.

pub mod credentials;
pub mod error;
pub mod fake;
pub mod gateway;
pub mod http;

pub use credentials::{AuthToken, Credentials};
pub use error::ApiError;
pub use fake::InMemoryGateway;
pub use gateway::{
    AccountGateway, AuthGateway, CourseGateway, CoursePage, NewAccount, ProgressGateway,
    ResourceGateway,
};
pub use http::HttpGateway;
