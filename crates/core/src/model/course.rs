use chrono::{DateTime, Utc};
use url::Url;

use crate::model::ids::{CourseId, LessonId, ModuleId};

//
// ─── COURSE TYPES ──────────────────────────────────────────────────────────────
//

/// Catalog-level view of a course, without its content tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub image_url: Option<Url>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A single video lesson.
///
/// `video_duration` is the server-declared nominal length in seconds. It may
/// be absent or drift from the encoded media; the duration reported by the
/// player is authoritative once observed.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Url,
    pub video_duration: Option<u32>,
    pub order: u32,
}

/// An ordered group of lessons within a course.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub description: Option<String>,
    pub order: u32,
    pub lessons: Vec<Lesson>,
}

/// A course together with its full module/lesson tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDetail {
    pub course: Course,
    pub modules: Vec<Module>,
}

impl CourseDetail {
    /// Total number of lessons across all modules.
    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Iterate over all lessons in module order.
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }

    /// Look up a lesson anywhere in the course.
    #[must_use]
    pub fn find_lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons().find(|lesson| lesson.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: u64) -> Lesson {
        Lesson {
            id: LessonId::new(id),
            title: format!("Lesson {id}"),
            description: None,
            video_url: Url::parse("https://videos.example.com/1.mp4").unwrap(),
            video_duration: Some(120),
            order: 0,
        }
    }

    #[test]
    fn counts_lessons_across_modules() {
        let detail = CourseDetail {
            course: Course {
                id: CourseId::new(1),
                title: "Rust".into(),
                description: None,
                short_description: None,
                price: 0.0,
                currency: "USD".into(),
                image_url: None,
                is_active: true,
                created_at: Utc::now(),
            },
            modules: vec![
                Module {
                    id: ModuleId::new(1),
                    title: "Basics".into(),
                    description: None,
                    order: 0,
                    lessons: vec![lesson(1), lesson(2)],
                },
                Module {
                    id: ModuleId::new(2),
                    title: "Advanced".into(),
                    description: None,
                    order: 1,
                    lessons: vec![lesson(3)],
                },
            ],
        };

        assert_eq!(detail.total_lessons(), 3);
        assert!(detail.find_lesson(LessonId::new(3)).is_some());
        assert!(detail.find_lesson(LessonId::new(4)).is_none());
    }
}
