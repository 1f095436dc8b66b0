mod account;
mod course;
mod ids;
mod progress;
mod resource;

pub use ids::{CourseId, LessonId, ModuleId, ResourceId, UserId};

pub use account::Account;
pub use course::{Course, CourseDetail, Lesson, Module};
pub use progress::{CourseProgress, LessonProgress, ProgressUpdate};
pub use resource::{CourseResource, ResourceType, ResourceTypeError};
