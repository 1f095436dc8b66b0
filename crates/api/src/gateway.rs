//! Trait seams for every backend collaborator.
//!
//! Services hold these as `Arc<dyn Trait>` so tests can substitute
//! [`crate::fake::InMemoryGateway`] for the HTTP client.

use async_trait::async_trait;

use course_core::model::{
    Account, Course, CourseDetail, CourseId, CourseProgress, CourseResource, LessonId,
    LessonProgress, ProgressUpdate,
};

use crate::credentials::AuthToken;
use crate::error::ApiError;

/// Registration payload for a password account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// One page of the course catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CoursePage {
    pub courses: Vec<Course>,
    pub total: u64,
}

/// Authentication endpoints: password login, registration, Google OAuth code
/// exchange, and password recovery.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange email/password for a bearer token.
    ///
    /// # Errors
    ///
    /// `ApiError::Unauthorized` for bad credentials, `ApiError::Validation`
    /// for malformed input.
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ApiError>;

    /// Create a password account.
    ///
    /// # Errors
    ///
    /// `ApiError::Validation` when the email or username is taken or invalid.
    async fn register(&self, account: NewAccount) -> Result<Account, ApiError>;

    /// Profile of the currently authenticated user.
    ///
    /// # Errors
    ///
    /// `ApiError::Unauthorized` without a valid token.
    async fn me(&self) -> Result<Account, ApiError>;

    /// Exchange a Google OAuth authorization code for a bearer token.
    ///
    /// # Errors
    ///
    /// `ApiError::Validation` for a rejected code.
    async fn google_callback(&self, code: &str) -> Result<AuthToken, ApiError>;

    /// Request a password-reset email. Always acks for unknown addresses.
    ///
    /// # Errors
    ///
    /// `ApiError` variants for transport or server failures.
    async fn forgot_password(&self, email: &str) -> Result<(), ApiError>;

    /// Set a new password using an emailed reset token.
    ///
    /// # Errors
    ///
    /// `ApiError::Validation` for an expired or unknown token.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError>;
}

/// Course catalog endpoints.
#[async_trait]
pub trait CourseGateway: Send + Sync {
    /// Page through active courses.
    ///
    /// # Errors
    ///
    /// `ApiError` variants for transport or server failures.
    async fn list_courses(&self, skip: u64, limit: u64) -> Result<CoursePage, ApiError>;

    /// Full module/lesson tree for one course.
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` for an unknown or inactive course.
    async fn course_detail(&self, id: CourseId) -> Result<CourseDetail, ApiError>;

    /// Courses available to the authenticated user.
    ///
    /// # Errors
    ///
    /// `ApiError::Unauthorized` without a valid token.
    async fn my_courses(&self) -> Result<Vec<Course>, ApiError>;
}

/// Per-lesson watch progress endpoints.
#[async_trait]
pub trait ProgressGateway: Send + Sync {
    /// Last persisted progress for a lesson.
    ///
    /// Callers treat any failure, including `NotFound`, as "no prior
    /// progress".
    ///
    /// # Errors
    ///
    /// `ApiError` variants for transport or server failures.
    async fn lesson_progress(&self, lesson_id: LessonId) -> Result<LessonProgress, ApiError>;

    /// Persist a watch-progress update and return the stored record.
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` for an unknown lesson, `ApiError::Unauthorized`
    /// without a valid token.
    async fn update_progress(&self, update: ProgressUpdate) -> Result<LessonProgress, ApiError>;
}

/// Account-scoped aggregates.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    /// Server-derived completion aggregate for a course.
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` for an unknown course.
    async fn course_progress(&self, course_id: CourseId) -> Result<CourseProgress, ApiError>;
}

/// Course resource library endpoints.
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// All resources attached to a course.
    ///
    /// # Errors
    ///
    /// `ApiError` variants for transport or server failures.
    async fn course_resources(&self, course_id: CourseId)
    -> Result<Vec<CourseResource>, ApiError>;
}
