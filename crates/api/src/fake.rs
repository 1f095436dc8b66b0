//! In-memory gateway for tests.
//!
//! Mirrors the backend's observable semantics closely enough for service
//! tests: progress updates are monotone and capped to the lesson duration,
//! the completed flag latches, and the course aggregate is recomputed from
//! stored records. Failure toggles let tests exercise the fail-soft paths.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use course_core::model::{
    Account, Course, CourseDetail, CourseId, CourseProgress, CourseResource, Lesson, LessonId,
    LessonProgress, ProgressUpdate, UserId,
};

use crate::credentials::AuthToken;
use crate::error::ApiError;
use crate::gateway::{
    AccountGateway, AuthGateway, CourseGateway, CoursePage, NewAccount, ProgressGateway,
    ResourceGateway,
};

#[derive(Debug, Default)]
struct State {
    account: Option<Account>,
    password: Option<String>,
    courses: Vec<CourseDetail>,
    lesson_progress: HashMap<LessonId, LessonProgress>,
    resources: Vec<CourseResource>,
    updates: Vec<ProgressUpdate>,
    fail_lesson_progress: bool,
    fail_update_progress: bool,
    fail_course_progress: bool,
}

/// Gateway double holding everything in a `Mutex`.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn with_account(self, account: Account, password: &str) -> Self {
        {
            let mut state = self.lock();
            state.account = Some(account);
            state.password = Some(password.to_owned());
        }
        self
    }

    #[must_use]
    pub fn with_course(self, detail: CourseDetail) -> Self {
        self.lock().courses.push(detail);
        self
    }

    #[must_use]
    pub fn with_lesson_progress(self, progress: LessonProgress) -> Self {
        self.lock().lesson_progress.insert(progress.lesson_id, progress);
        self
    }

    #[must_use]
    pub fn with_resources(self, resources: Vec<CourseResource>) -> Self {
        self.lock().resources.extend(resources);
        self
    }

    pub fn set_fail_lesson_progress(&self, fail: bool) {
        self.lock().fail_lesson_progress = fail;
    }

    pub fn set_fail_update_progress(&self, fail: bool) {
        self.lock().fail_update_progress = fail;
    }

    pub fn set_fail_course_progress(&self, fail: bool) {
        self.lock().fail_course_progress = fail;
    }

    /// Every update that reached the persistence endpoint, in order.
    #[must_use]
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.lock().updates.clone()
    }

    /// The stored record for a lesson, if any update or seed created one.
    #[must_use]
    pub fn stored_progress(&self, lesson_id: LessonId) -> Option<LessonProgress> {
        self.lock().lesson_progress.get(&lesson_id).copied()
    }

    fn find_lesson(state: &State, lesson_id: LessonId) -> Option<Lesson> {
        state
            .courses
            .iter()
            .flat_map(|c| c.lessons())
            .find(|l| l.id == lesson_id)
            .cloned()
    }
}

#[async_trait]
impl AuthGateway for InMemoryGateway {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ApiError> {
        let state = self.lock();
        match (&state.account, &state.password) {
            (Some(account), Some(stored))
                if account.email == email && stored == password =>
            {
                Ok(AuthToken::new(format!("token-{}", account.id.value())))
            }
            _ => Err(ApiError::Unauthorized),
        }
    }

    async fn register(&self, account: NewAccount) -> Result<Account, ApiError> {
        let mut state = self.lock();
        if state
            .account
            .as_ref()
            .is_some_and(|existing| existing.email == account.email)
        {
            return Err(ApiError::Validation("email already registered".into()));
        }
        let created = Account {
            id: UserId::new(1),
            email: account.email,
            username: account.username,
            full_name: account.full_name,
            is_active: true,
        };
        state.account = Some(created.clone());
        state.password = Some(account.password);
        Ok(created)
    }

    async fn me(&self) -> Result<Account, ApiError> {
        self.lock().account.clone().ok_or(ApiError::Unauthorized)
    }

    async fn google_callback(&self, code: &str) -> Result<AuthToken, ApiError> {
        if code.is_empty() {
            return Err(ApiError::Validation("empty authorization code".into()));
        }
        Ok(AuthToken::new(format!("google-{code}")))
    }

    async fn forgot_password(&self, _email: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn reset_password(&self, token: &str, _new_password: &str) -> Result<(), ApiError> {
        if token.is_empty() {
            return Err(ApiError::Validation("invalid reset token".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CourseGateway for InMemoryGateway {
    async fn list_courses(&self, skip: u64, limit: u64) -> Result<CoursePage, ApiError> {
        let state = self.lock();
        let courses: Vec<Course> = state
            .courses
            .iter()
            .map(|detail| detail.course.clone())
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Ok(CoursePage {
            courses,
            total: state.courses.len() as u64,
        })
    }

    async fn course_detail(&self, id: CourseId) -> Result<CourseDetail, ApiError> {
        self.lock()
            .courses
            .iter()
            .find(|detail| detail.course.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn my_courses(&self) -> Result<Vec<Course>, ApiError> {
        let state = self.lock();
        if state.account.is_none() {
            return Err(ApiError::Unauthorized);
        }
        Ok(state.courses.iter().map(|d| d.course.clone()).collect())
    }
}

#[async_trait]
impl ProgressGateway for InMemoryGateway {
    async fn lesson_progress(&self, lesson_id: LessonId) -> Result<LessonProgress, ApiError> {
        let state = self.lock();
        if state.fail_lesson_progress {
            return Err(ApiError::Server(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }
        // Backend returns a zero record instead of 404 for unknown lessons.
        Ok(state
            .lesson_progress
            .get(&lesson_id)
            .copied()
            .unwrap_or_else(|| LessonProgress::none(lesson_id)))
    }

    async fn update_progress(&self, update: ProgressUpdate) -> Result<LessonProgress, ApiError> {
        let mut state = self.lock();
        if state.fail_update_progress {
            return Err(ApiError::Server(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }
        let lesson = Self::find_lesson(&state, update.lesson_id).ok_or(ApiError::NotFound)?;

        state.updates.push(update);

        // Server-side semantics: cap to duration, keep the max, latch completed.
        let capped = match lesson.video_duration {
            Some(duration) => update.watched_duration.min(duration),
            None => update.watched_duration,
        };
        let record = state
            .lesson_progress
            .entry(update.lesson_id)
            .or_insert_with(|| LessonProgress::none(update.lesson_id));
        record.watched_duration = record.watched_duration.max(capped);
        record.is_completed |= update.is_completed;
        Ok(*record)
    }
}

#[async_trait]
impl AccountGateway for InMemoryGateway {
    async fn course_progress(&self, course_id: CourseId) -> Result<CourseProgress, ApiError> {
        let state = self.lock();
        if state.fail_course_progress {
            return Err(ApiError::Server(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }
        let detail = state
            .courses
            .iter()
            .find(|detail| detail.course.id == course_id)
            .ok_or(ApiError::NotFound)?;

        let total_lessons = detail.total_lessons() as u32;
        let mut completed_lessons = 0;
        let mut total_duration = 0;
        let mut watched_duration = 0;
        for lesson in detail.lessons() {
            total_duration += lesson.video_duration.unwrap_or(0);
            if let Some(progress) = state.lesson_progress.get(&lesson.id) {
                watched_duration += progress.watched_duration;
                if progress.is_completed {
                    completed_lessons += 1;
                }
            }
        }
        let percentage = if total_lessons == 0 {
            0.0
        } else {
            f64::from(completed_lessons) / f64::from(total_lessons) * 100.0
        };
        Ok(CourseProgress {
            course_id,
            total_lessons,
            completed_lessons,
            total_duration,
            watched_duration,
            percentage,
        })
    }
}

#[async_trait]
impl ResourceGateway for InMemoryGateway {
    async fn course_resources(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<CourseResource>, ApiError> {
        Ok(self
            .lock()
            .resources
            .iter()
            .filter(|resource| resource.course_id == course_id)
            .cloned()
            .collect())
    }
}
