use crate::model::ids::{CourseId, LessonId};

/// Server-persisted watch progress for one (user, lesson) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonProgress {
    pub lesson_id: LessonId,
    pub watched_duration: u32,
    pub is_completed: bool,
}

impl LessonProgress {
    /// The "not started" record used when the server has no prior progress.
    #[must_use]
    pub fn none(lesson_id: LessonId) -> Self {
        Self {
            lesson_id,
            watched_duration: 0,
            is_completed: false,
        }
    }
}

/// Payload sent to the persistence endpoint.
///
/// `watched_duration` must be the maximum of the previously persisted value
/// and the newly observed one; the client never sends a regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub lesson_id: LessonId,
    pub watched_duration: u32,
    pub is_completed: bool,
}

/// Server-derived aggregate over all lessons of a course.
///
/// Never recomputed locally from lesson percentages; always re-fetched after
/// a persisted update so the client cannot drift from the server.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseProgress {
    pub course_id: CourseId,
    pub total_lessons: u32,
    pub completed_lessons: u32,
    pub total_duration: u32,
    pub watched_duration: u32,
    pub percentage: f64,
}

impl CourseProgress {
    /// Zero-progress aggregate for a course.
    #[must_use]
    pub fn empty(course_id: CourseId) -> Self {
        Self {
            course_id,
            total_lessons: 0,
            completed_lessons: 0,
            total_duration: 0,
            watched_duration: 0,
            percentage: 0.0,
        }
    }
}
