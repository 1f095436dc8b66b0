//! Wire shapes for the platform's REST API and their conversions into the
//! domain model.
//!
//! Field names mirror the backend's snake_case JSON exactly; conversion is
//! where URL parsing and enum validation happen, so the rest of the codebase
//! never sees raw strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use course_core::model::{
    Account, Course, CourseDetail, CourseId, CourseProgress, CourseResource, Lesson, LessonId,
    LessonProgress, Module, ModuleId, ProgressUpdate, ResourceId, UserId,
};

use crate::error::ApiError;

fn parse_url(raw: &str, field: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::UnexpectedPayload(format!("{field}: {e}")))
}

//
// ─── AUTH ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoogleCallbackRequest<'a> {
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[allow(dead_code)]
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: u64,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

impl UserResponse {
    pub fn into_account(self) -> Account {
        Account {
            id: UserId::new(self.id),
            email: self.email,
            username: self.username,
            full_name: self.full_name,
            is_active: self.is_active,
        }
    }
}

//
// ─── COURSES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub struct LessonResponse {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub video_duration: Option<u32>,
    pub order: u32,
}

impl LessonResponse {
    pub fn into_lesson(self) -> Result<Lesson, ApiError> {
        Ok(Lesson {
            id: LessonId::new(self.id),
            title: self.title,
            description: self.description,
            video_url: parse_url(&self.video_url, "video_url")?,
            video_duration: self.video_duration,
            order: self.order,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ModuleResponse {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub order: u32,
    pub lessons: Vec<LessonResponse>,
}

impl ModuleResponse {
    pub fn into_module(self) -> Result<Module, ApiError> {
        Ok(Module {
            id: ModuleId::new(self.id),
            title: self.title,
            description: self.description,
            order: self.order,
            lessons: self
                .lessons
                .into_iter()
                .map(LessonResponse::into_lesson)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CourseResponse {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl CourseResponse {
    pub fn into_course(self) -> Result<Course, ApiError> {
        let image_url = self
            .image_url
            .as_deref()
            .map(|raw| parse_url(raw, "image_url"))
            .transpose()?;
        Ok(Course {
            id: CourseId::new(self.id),
            title: self.title,
            description: self.description,
            short_description: self.short_description,
            price: self.price,
            currency: self.currency,
            image_url,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CourseListResponse {
    pub courses: Vec<CourseResponse>,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub modules: Vec<ModuleResponse>,
}

impl CourseDetailResponse {
    pub fn into_detail(self) -> Result<CourseDetail, ApiError> {
        Ok(CourseDetail {
            course: self.course.into_course()?,
            modules: self
                .modules
                .into_iter()
                .map(ModuleResponse::into_module)
                .collect::<Result<_, _>>()?,
        })
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub struct ProgressUpdateRequest {
    pub lesson_id: u64,
    pub watched_duration: u32,
    pub is_completed: bool,
}

impl ProgressUpdateRequest {
    pub fn from_update(update: &ProgressUpdate) -> Self {
        Self {
            lesson_id: update.lesson_id.value(),
            watched_duration: update.watched_duration,
            is_completed: update.is_completed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProgressResponse {
    pub lesson_id: u64,
    pub watched_duration: u32,
    pub is_completed: bool,
}

impl ProgressResponse {
    pub fn into_progress(self) -> LessonProgress {
        LessonProgress {
            lesson_id: LessonId::new(self.lesson_id),
            watched_duration: self.watched_duration,
            is_completed: self.is_completed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CourseProgressResponse {
    pub course_id: u64,
    pub total_lessons: u32,
    pub completed_lessons: u32,
    pub total_duration: u32,
    pub watched_duration: u32,
    pub progress_percentage: f64,
}

impl CourseProgressResponse {
    pub fn into_progress(self) -> CourseProgress {
        CourseProgress {
            course_id: CourseId::new(self.course_id),
            total_lessons: self.total_lessons,
            completed_lessons: self.completed_lessons,
            total_duration: self.total_duration,
            watched_duration: self.watched_duration,
            percentage: self.progress_percentage,
        }
    }
}

//
// ─── RESOURCES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub struct ResourceResponse {
    pub id: u64,
    pub course_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub resource_type: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

impl ResourceResponse {
    pub fn into_resource(self) -> Result<CourseResource, ApiError> {
        let resource_type = self
            .resource_type
            .parse()
            .map_err(|e| ApiError::UnexpectedPayload(format!("resource_type: {e}")))?;
        let file_url = self
            .file_url
            .as_deref()
            .map(|raw| parse_url(raw, "file_url"))
            .transpose()?;
        Ok(CourseResource {
            id: ResourceId::new(self.id),
            course_id: CourseId::new(self.course_id),
            title: self.title,
            description: self.description,
            resource_type,
            file_url,
            file_name: self.file_name,
            order: self.order,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::ResourceType;

    #[test]
    fn course_detail_parses_nested_tree() {
        let json = serde_json::json!({
            "id": 1,
            "title": "Rust for Web",
            "description": "desc",
            "short_description": null,
            "price": 0.0,
            "currency": "USD",
            "image_url": "https://cdn.example.com/c1.png",
            "is_active": true,
            "created_at": "2024-05-01T12:00:00Z",
            "modules": [{
                "id": 10,
                "title": "Intro",
                "description": null,
                "order": 0,
                "lessons": [{
                    "id": 100,
                    "title": "Hello",
                    "description": null,
                    "video_url": "https://videos.example.com/hello.mp4",
                    "video_duration": 300,
                    "order": 0
                }]
            }]
        });

        let response: CourseDetailResponse = serde_json::from_value(json).unwrap();
        let detail = response.into_detail().unwrap();
        assert_eq!(detail.course.id, CourseId::new(1));
        assert_eq!(detail.total_lessons(), 1);
        let lesson = detail.find_lesson(LessonId::new(100)).unwrap();
        assert_eq!(lesson.video_duration, Some(300));
    }

    #[test]
    fn invalid_video_url_is_an_unexpected_payload() {
        let response = LessonResponse {
            id: 1,
            title: "Bad".into(),
            description: None,
            video_url: "not a url".into(),
            video_duration: None,
            order: 0,
        };
        assert!(matches!(
            response.into_lesson(),
            Err(ApiError::UnexpectedPayload(_))
        ));
    }

    #[test]
    fn progress_response_maps_to_domain() {
        let json = serde_json::json!({
            "id": 5,
            "user_id": 2,
            "lesson_id": 100,
            "watched_duration": 95,
            "is_completed": true,
            "last_watched_at": "2024-05-01T12:00:00Z"
        });
        let response: ProgressResponse = serde_json::from_value(json).unwrap();
        let progress = response.into_progress();
        assert_eq!(progress.lesson_id, LessonId::new(100));
        assert_eq!(progress.watched_duration, 95);
        assert!(progress.is_completed);
    }

    #[test]
    fn unknown_resource_type_is_rejected() {
        let response = ResourceResponse {
            id: 1,
            course_id: 1,
            title: "Slides".into(),
            description: None,
            resource_type: "slides".into(),
            file_url: None,
            file_name: None,
            order: 0,
            created_at: Utc::now(),
        };
        assert!(matches!(
            response.into_resource(),
            Err(ApiError::UnexpectedPayload(_))
        ));
    }

    #[test]
    fn resource_parses_with_file_url() {
        let response = ResourceResponse {
            id: 1,
            course_id: 2,
            title: "Workbook".into(),
            description: Some("PDF workbook".into()),
            resource_type: "pdf".into(),
            file_url: Some("https://cdn.example.com/workbook.pdf".into()),
            file_name: Some("workbook.pdf".into()),
            order: 1,
            created_at: Utc::now(),
        };
        let resource = response.into_resource().unwrap();
        assert_eq!(resource.resource_type, ResourceType::Pdf);
        assert!(resource.file_url.is_some());
    }

    #[test]
    fn register_request_omits_missing_full_name() {
        let request = RegisterRequest {
            email: "a@b.c".into(),
            username: "ab".into(),
            password: "pw".into(),
            full_name: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("full_name").is_none());
    }
}
