use std::sync::Arc;

use api::{CourseGateway, CoursePage};
use course_core::model::{Course, CourseDetail, CourseId};

use crate::error::CatalogError;

/// Read-only course browsing.
#[derive(Clone)]
pub struct CatalogService {
    courses: Arc<dyn CourseGateway>,
}

impl CatalogService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseGateway>) -> Self {
        Self { courses }
    }

    /// One page of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Api` for transport or server failures.
    pub async fn list_courses(&self, skip: u64, limit: u64) -> Result<CoursePage, CatalogError> {
        Ok(self.courses.list_courses(skip, limit).await?)
    }

    /// Full content tree for one course.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` for an unknown or inactive
    /// course.
    pub async fn course_detail(&self, id: CourseId) -> Result<CourseDetail, CatalogError> {
        Ok(self.courses.course_detail(id).await?)
    }

    /// Courses available to the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Api` for transport or auth failures.
    pub async fn my_courses(&self) -> Result<Vec<Course>, CatalogError> {
        Ok(self.courses.my_courses().await?)
    }
}
