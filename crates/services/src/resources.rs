use std::sync::Arc;

use api::ResourceGateway;
use course_core::model::{CourseId, CourseResource};

use crate::error::ResourceError;

/// Resource library for a course, served in display order.
#[derive(Clone)]
pub struct ResourceService {
    resources: Arc<dyn ResourceGateway>,
}

impl ResourceService {
    #[must_use]
    pub fn new(resources: Arc<dyn ResourceGateway>) -> Self {
        Self { resources }
    }

    /// Resources attached to a course, sorted by their `order` field.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError` for transport or server failures.
    pub async fn course_resources(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<CourseResource>, ResourceError> {
        let mut resources = self.resources.course_resources(course_id).await?;
        resources.sort_by_key(|resource| resource.order);
        Ok(resources)
    }
}
