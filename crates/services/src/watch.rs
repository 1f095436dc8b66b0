//! Watch session: reconciles the player's high-frequency position signal
//! against the server-persisted watched duration.
//!
//! One `WatchSession` exists per open course view. All operations take
//! `&mut self`, so persistence calls for a session are serialized by the
//! exclusive borrow; there is no overlapping-write race to guard against.
//! Every network call is fail-soft: a failure degrades the displayed values
//! but never stops sample processing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use api::{AccountGateway, ProgressGateway};
use course_core::model::{CourseDetail, Lesson, LessonId, LessonProgress, ProgressUpdate};
use course_core::{Clock, playback};

/// Minimum wall-clock interval between two persistence attempts for the same
/// lesson. End-of-playback is the one event that bypasses it.
const UPDATE_THROTTLE_MS: i64 = 5_000;

/// Where the session currently is for the selected lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No lesson selected.
    Idle,
    /// Prior progress is being fetched.
    Loading,
    /// Receiving position samples.
    Tracking,
}

#[derive(Debug, Clone)]
struct ActiveLesson {
    lesson: Lesson,
    observed_position: u32,
    observed_duration: Option<u32>,
    last_persisted: u32,
    completed: bool,
    /// `None` means no successful persist yet for this tracking session, so
    /// the first eligible sample persists immediately.
    last_update_at: Option<DateTime<Utc>>,
}

impl ActiveLesson {
    fn new(lesson: Lesson, seeded: LessonProgress) -> Self {
        Self {
            lesson,
            observed_position: 0,
            observed_duration: None,
            last_persisted: seeded.watched_duration,
            completed: seeded.is_completed,
            last_update_at: None,
        }
    }

    fn effective_duration(&self) -> Option<u32> {
        playback::effective_duration(self.observed_duration, self.lesson.video_duration)
    }

    fn update_due(&self, now: DateTime<Utc>) -> bool {
        self.last_update_at
            .is_none_or(|at| now - at >= Duration::milliseconds(UPDATE_THROTTLE_MS))
    }
}

#[derive(Debug, Clone)]
enum Selection {
    Idle,
    Loading { lesson: Lesson },
    Tracking(ActiveLesson),
}

/// Per-course watch session.
///
/// Tracks the selected lesson's playback, throttles durable progress
/// updates, and keeps display-ready percentages for the lesson list and the
/// course-level bar. The course percentage is only ever the last value
/// fetched from the server aggregate, never derived locally.
pub struct WatchSession {
    clock: Clock,
    progress: Arc<dyn ProgressGateway>,
    account: Arc<dyn AccountGateway>,
    course: CourseDetail,
    lesson_cache: HashMap<LessonId, LessonProgress>,
    course_percent: f64,
    selection: Selection,
}

impl WatchSession {
    /// Open a session for a course and fetch the initial course aggregate.
    ///
    /// The aggregate fetch is fail-soft; on failure the course bar starts at
    /// zero and refreshes after the next persisted update.
    pub async fn open(
        clock: Clock,
        progress: Arc<dyn ProgressGateway>,
        account: Arc<dyn AccountGateway>,
        course: CourseDetail,
    ) -> Self {
        let mut session = Self {
            clock,
            progress,
            account,
            course,
            lesson_cache: HashMap::new(),
            course_percent: 0.0,
            selection: Selection::Idle,
        };
        session.refresh_course_progress().await;
        session
    }

    //
    // ─── PLAYER EVENTS ─────────────────────────────────────────────────────
    //

    /// Select a lesson and load its prior progress.
    ///
    /// Any fetch failure seeds zero progress so the learner can always start
    /// watching. The observed total duration resets to unknown; it must be
    /// re-derived from the player for this lesson.
    pub async fn select_lesson(&mut self, lesson_id: LessonId) {
        let Some(lesson) = self.course.find_lesson(lesson_id).cloned() else {
            tracing::warn!(lesson = ?lesson_id, "selected lesson is not part of this course");
            self.selection = Selection::Idle;
            return;
        };
        self.selection = Selection::Loading {
            lesson: lesson.clone(),
        };

        let seeded = match self.progress.lesson_progress(lesson_id).await {
            Ok(prior) => prior,
            Err(error) => {
                tracing::warn!(lesson = ?lesson_id, error = %error,
                    "could not load prior progress, starting from zero");
                LessonProgress::none(lesson_id)
            }
        };

        // The selection may have moved on while the fetch was in flight;
        // a stale response must not seed the new lesson's state.
        let still_selected = matches!(
            &self.selection,
            Selection::Loading { lesson } if lesson.id == lesson_id
        );
        if !still_selected {
            tracing::debug!(lesson = ?lesson_id, "discarding progress for deselected lesson");
            return;
        }

        self.lesson_cache.insert(lesson_id, seeded);
        self.selection = Selection::Tracking(ActiveLesson::new(lesson, seeded));
    }

    /// Deselect the current lesson and discard its session-local state.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::Idle;
    }

    /// Feed one playback-position sample (seconds from the player).
    ///
    /// The displayed watched value updates on every sample. A persistence
    /// attempt happens only when the monotone maximum advanced past the last
    /// persisted value and the throttle window has elapsed since the last
    /// successful attempt.
    pub async fn record_position(&mut self, seconds: f64) {
        let now = self.clock.now();
        let Selection::Tracking(active) = &mut self.selection else {
            return;
        };

        let current = seconds.max(0.0).floor() as u32;
        active.observed_position = current;

        let max_watched = current.max(active.last_persisted);
        if max_watched <= active.last_persisted || !active.update_due(now) {
            return;
        }

        let lesson_id = active.lesson.id;
        let completed = playback::is_completed(max_watched, active.effective_duration());
        self.persist(lesson_id, max_watched, completed, now).await;
    }

    /// Record the true media duration reported by the player.
    ///
    /// Non-positive reports are ignored. Once set, all completion and
    /// percentage math prefers this value over the server's nominal one.
    pub fn record_duration(&mut self, seconds: f64) {
        if seconds.is_nan() || seconds <= 0.0 {
            return;
        }
        if let Selection::Tracking(active) = &mut self.selection {
            active.observed_duration = Some(seconds.floor() as u32);
        }
    }

    /// Handle the terminal end-of-playback event.
    ///
    /// Persists unconditionally, bypassing the throttle, with the best-known
    /// duration as the watched value. Reaching the end is definitionally
    /// complete even when duration bookkeeping is imperfect.
    pub async fn record_ended(&mut self) {
        let now = self.clock.now();
        let Selection::Tracking(active) = &mut self.selection else {
            return;
        };

        let lesson_id = active.lesson.id;
        let watched = active
            .effective_duration()
            .unwrap_or_else(|| active.observed_position.max(active.last_persisted));
        self.persist(lesson_id, watched, true, now).await;
    }

    //
    // ─── PERSISTENCE ───────────────────────────────────────────────────────
    //

    async fn persist(
        &mut self,
        lesson_id: LessonId,
        watched: u32,
        completed: bool,
        now: DateTime<Utc>,
    ) {
        let update = ProgressUpdate {
            lesson_id,
            watched_duration: watched,
            is_completed: completed,
        };
        match self.progress.update_progress(update).await {
            Ok(_) => {
                let entry = self
                    .lesson_cache
                    .entry(lesson_id)
                    .or_insert_with(|| LessonProgress::none(lesson_id));
                entry.watched_duration = entry.watched_duration.max(watched);
                entry.is_completed |= completed;

                if let Selection::Tracking(active) = &mut self.selection {
                    if active.lesson.id == lesson_id {
                        active.last_persisted = active.last_persisted.max(watched);
                        active.completed |= completed;
                        active.last_update_at = Some(now);
                    }
                }

                self.refresh_course_progress().await;
            }
            Err(error) => {
                // Non-fatal: the next eligible sample retries.
                tracing::warn!(lesson = ?lesson_id, error = %error,
                    "could not persist watch progress");
            }
        }
    }

    /// Re-fetch the server-side course aggregate. Fail-soft.
    pub async fn refresh_course_progress(&mut self) {
        let course_id = self.course.course.id;
        match self.account.course_progress(course_id).await {
            Ok(aggregate) => self.course_percent = aggregate.percentage.min(100.0),
            Err(error) => {
                tracing::warn!(course = ?course_id, error = %error,
                    "could not refresh course progress");
            }
        }
    }

    //
    // ─── DISPLAY VALUES ────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> WatchState {
        match self.selection {
            Selection::Idle => WatchState::Idle,
            Selection::Loading { .. } => WatchState::Loading,
            Selection::Tracking(_) => WatchState::Tracking,
        }
    }

    #[must_use]
    pub fn course(&self) -> &CourseDetail {
        &self.course
    }

    #[must_use]
    pub fn selected_lesson(&self) -> Option<&Lesson> {
        match &self.selection {
            Selection::Idle => None,
            Selection::Loading { lesson } => Some(lesson),
            Selection::Tracking(active) => Some(&active.lesson),
        }
    }

    /// Watched seconds shown for the selected lesson.
    ///
    /// Monotone within a session even when raw samples seek backward,
    /// because it is the max of the persisted and observed values.
    #[must_use]
    pub fn watched_display(&self) -> u32 {
        match &self.selection {
            Selection::Tracking(active) => {
                active.last_persisted.max(active.observed_position)
            }
            _ => 0,
        }
    }

    /// Watched seconds clamped to the effective duration when one is known.
    #[must_use]
    pub fn effective_viewed(&self) -> u32 {
        match &self.selection {
            Selection::Tracking(active) => playback::effective_viewed(
                active.effective_duration(),
                active.last_persisted,
                active.observed_position,
            ),
            _ => 0,
        }
    }

    /// Percentage of the selected lesson watched; 0 while duration is
    /// unknown.
    #[must_use]
    pub fn lesson_percent(&self) -> f64 {
        match &self.selection {
            Selection::Tracking(active) => {
                playback::percent(self.effective_viewed(), active.effective_duration())
            }
            _ => 0.0,
        }
    }

    /// Whether the selected lesson has been completed (persisted or seeded).
    #[must_use]
    pub fn is_completed(&self) -> bool {
        match &self.selection {
            Selection::Tracking(active) => active.completed,
            _ => false,
        }
    }

    /// Last fetched course-level percentage.
    #[must_use]
    pub fn course_percent(&self) -> f64 {
        self.course_percent
    }

    /// Sidebar percentage for any lesson, from the per-lesson cache and the
    /// lesson's nominal duration.
    #[must_use]
    pub fn lesson_percent_for(&self, lesson_id: LessonId) -> f64 {
        let Some(progress) = self.lesson_cache.get(&lesson_id) else {
            return 0.0;
        };
        let duration = self
            .course
            .find_lesson(lesson_id)
            .and_then(|lesson| lesson.video_duration);
        playback::percent(progress.watched_duration, duration)
    }

    /// Sidebar checkmark state for any lesson.
    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: LessonId) -> bool {
        self.lesson_cache
            .get(&lesson_id)
            .is_some_and(|progress| progress.is_completed)
    }

    /// Access the session clock, mainly so tests with a fixed clock can
    /// advance it between samples.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use api::InMemoryGateway;
    use chrono::Utc;
    use course_core::model::{Course, CourseId, Module, ModuleId};
    use course_core::time::fixed_now;
    use url::Url;

    fn lesson(id: u64, duration: Option<u32>) -> Lesson {
        Lesson {
            id: LessonId::new(id),
            title: format!("Lesson {id}"),
            description: None,
            video_url: Url::parse("https://videos.example.com/v.mp4").unwrap(),
            video_duration: duration,
            order: 0,
        }
    }

    fn course(lessons: Vec<Lesson>) -> CourseDetail {
        CourseDetail {
            course: Course {
                id: CourseId::new(1),
                title: "Course".into(),
                description: None,
                short_description: None,
                price: 0.0,
                currency: "USD".into(),
                image_url: None,
                is_active: true,
                created_at: Utc::now(),
            },
            modules: vec![Module {
                id: ModuleId::new(1),
                title: "Module".into(),
                description: None,
                order: 0,
                lessons,
            }],
        }
    }

    async fn session_with(
        lessons: Vec<Lesson>,
        seed: Option<LessonProgress>,
    ) -> (Arc<InMemoryGateway>, WatchSession) {
        let detail = course(lessons);
        let mut gateway = InMemoryGateway::new().with_course(detail.clone());
        if let Some(progress) = seed {
            gateway = gateway.with_lesson_progress(progress);
        }
        let gateway = Arc::new(gateway);
        let session = WatchSession::open(
            Clock::fixed(fixed_now()),
            Arc::clone(&gateway) as Arc<dyn ProgressGateway>,
            Arc::clone(&gateway) as Arc<dyn AccountGateway>,
            detail,
        )
        .await;
        (gateway, session)
    }

    fn advance(session: &mut WatchSession, ms: i64) {
        session.clock_mut().advance(Duration::milliseconds(ms));
    }

    #[tokio::test]
    async fn first_eligible_sample_persists_immediately() {
        let (gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        session.select_lesson(LessonId::new(100)).await;
        assert_eq!(session.state(), WatchState::Tracking);

        session.record_position(10.4).await;

        let updates = gateway.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].watched_duration, 10);
        assert!(!updates[0].is_completed);
    }

    #[tokio::test]
    async fn sample_past_threshold_persists_completed() {
        // lastPersisted = 40, nominal duration = 100, sample 95 after the
        // throttle window: persisted as {95, completed}.
        let seed = LessonProgress {
            lesson_id: LessonId::new(100),
            watched_duration: 40,
            is_completed: false,
        };
        let (gateway, mut session) =
            session_with(vec![lesson(100, Some(100))], Some(seed)).await;
        session.select_lesson(LessonId::new(100)).await;

        session.record_position(95.0).await;

        let updates = gateway.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].watched_duration, 95);
        assert!(updates[0].is_completed);
        assert!(session.is_completed());
    }

    #[tokio::test]
    async fn throttle_blocks_but_display_still_updates() {
        let (gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        session.select_lesson(LessonId::new(100)).await;

        session.record_position(40.0).await;
        assert_eq!(gateway.updates().len(), 1);

        // 2s later: under the window, no persist, display moves anyway.
        advance(&mut session, 2_000);
        session.record_position(95.0).await;
        assert_eq!(gateway.updates().len(), 1);
        assert_eq!(session.watched_display(), 95);

        // Past the window the next sample persists with the threshold met.
        advance(&mut session, 3_000);
        session.record_position(96.0).await;
        let updates = gateway.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].watched_duration, 96);
        assert!(updates[1].is_completed);
    }

    #[tokio::test]
    async fn displayed_value_never_regresses_on_seek_back() {
        let seed = LessonProgress {
            lesson_id: LessonId::new(100),
            watched_duration: 40,
            is_completed: false,
        };
        let (_gateway, mut session) =
            session_with(vec![lesson(100, Some(100))], Some(seed)).await;
        session.select_lesson(LessonId::new(100)).await;

        session.record_position(10.0).await;
        assert_eq!(session.watched_display(), 40);

        session.record_position(55.0).await;
        advance(&mut session, 6_000);
        session.record_position(12.0).await;
        assert_eq!(session.watched_display(), 55);
    }

    #[tokio::test]
    async fn no_persist_without_forward_progress() {
        let seed = LessonProgress {
            lesson_id: LessonId::new(100),
            watched_duration: 40,
            is_completed: false,
        };
        let (gateway, mut session) =
            session_with(vec![lesson(100, Some(100))], Some(seed)).await;
        session.select_lesson(LessonId::new(100)).await;

        // Rewatching earlier seconds never writes.
        session.record_position(10.0).await;
        advance(&mut session, 6_000);
        session.record_position(40.0).await;
        assert!(gateway.updates().is_empty());
    }

    #[tokio::test]
    async fn ended_bypasses_throttle_and_always_completes() {
        let (gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        session.select_lesson(LessonId::new(100)).await;

        session.record_position(30.0).await;
        assert_eq!(gateway.updates().len(), 1);

        // Immediately after a persist, still within the window.
        session.record_ended().await;
        let updates = gateway.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].watched_duration, 100);
        assert!(updates[1].is_completed);
        assert!(session.is_completed());
    }

    #[tokio::test]
    async fn ended_without_any_duration_sends_observed_maximum() {
        let (gateway, mut session) = session_with(vec![lesson(100, None)], None).await;
        session.select_lesson(LessonId::new(100)).await;

        session.record_position(73.0).await;
        session.record_ended().await;

        let updates = gateway.updates();
        let last = updates.last().unwrap();
        assert_eq!(last.watched_duration, 73);
        assert!(last.is_completed);
    }

    #[tokio::test]
    async fn completion_is_never_asserted_without_a_duration() {
        let (gateway, mut session) = session_with(vec![lesson(100, None)], None).await;
        session.select_lesson(LessonId::new(100)).await;

        session.record_position(5_000.0).await;
        let updates = gateway.updates();
        assert_eq!(updates.len(), 1);
        assert!(!updates[0].is_completed);
        assert_eq!(session.lesson_percent(), 0.0);
    }

    #[tokio::test]
    async fn player_duration_overrides_nominal_for_completion() {
        let (gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        session.select_lesson(LessonId::new(100)).await;

        // Encoding drift: the real media is twice as long as declared.
        session.record_duration(200.0);
        session.record_position(95.0).await;

        let updates = gateway.updates();
        assert_eq!(updates.len(), 1);
        assert!(!updates[0].is_completed);

        advance(&mut session, 6_000);
        session.record_position(180.0).await;
        let updates = gateway.updates();
        assert!(updates[1].is_completed);
    }

    #[tokio::test]
    async fn failed_progress_fetch_fails_open_to_zero() {
        let (gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        gateway.set_fail_lesson_progress(true);

        session.select_lesson(LessonId::new(100)).await;
        assert_eq!(session.state(), WatchState::Tracking);
        assert_eq!(session.watched_display(), 0);

        // Tracking still works with lastPersisted treated as 0.
        session.record_position(10.0).await;
        let updates = gateway.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].watched_duration, 10);
    }

    #[tokio::test]
    async fn failed_update_keeps_tracking_and_retries_naturally() {
        let (gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        session.select_lesson(LessonId::new(100)).await;

        gateway.set_fail_update_progress(true);
        session.record_position(10.0).await;
        assert!(gateway.updates().is_empty());
        assert_eq!(session.watched_display(), 10);

        // The failed attempt did not stamp the throttle; the next sample
        // retries without waiting out the window.
        gateway.set_fail_update_progress(false);
        session.record_position(11.0).await;
        let updates = gateway.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].watched_duration, 11);
    }

    #[tokio::test]
    async fn switching_lessons_resets_session_state() {
        let seed = LessonProgress {
            lesson_id: LessonId::new(100),
            watched_duration: 0,
            is_completed: false,
        };
        let (_gateway, mut session) = session_with(
            vec![lesson(100, Some(100)), lesson(200, Some(300))],
            Some(seed),
        )
        .await;

        session.select_lesson(LessonId::new(100)).await;
        session.record_duration(110.0);
        session.record_position(50.0).await;
        assert_eq!(session.watched_display(), 50);

        session.select_lesson(LessonId::new(200)).await;
        assert_eq!(session.watched_display(), 0);
        assert_eq!(session.lesson_percent(), 0.0);

        // The previous lesson's persisted progress is still visible in the
        // sidebar cache.
        assert_eq!(session.lesson_percent_for(LessonId::new(100)), 50.0);
    }

    #[tokio::test]
    async fn course_percent_refreshes_after_completion() {
        let (_gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        session.select_lesson(LessonId::new(100)).await;
        assert_eq!(session.course_percent(), 0.0);

        session.record_position(95.0).await;
        assert_eq!(session.course_percent(), 100.0);
    }

    #[tokio::test]
    async fn course_percent_survives_aggregate_failure() {
        let (gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        session.select_lesson(LessonId::new(100)).await;
        session.record_position(95.0).await;
        assert_eq!(session.course_percent(), 100.0);

        gateway.set_fail_course_progress(true);
        advance(&mut session, 6_000);
        session.record_position(99.0).await;
        // Stale value shown rather than an error or a reset.
        assert_eq!(session.course_percent(), 100.0);
    }

    #[tokio::test]
    async fn unknown_lesson_selection_goes_idle() {
        let (_gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        session.select_lesson(LessonId::new(999)).await;
        assert_eq!(session.state(), WatchState::Idle);
        assert!(session.selected_lesson().is_none());
    }

    #[tokio::test]
    async fn effective_viewed_clamps_overshoot_to_duration() {
        let (_gateway, mut session) = session_with(vec![lesson(100, Some(100))], None).await;
        session.select_lesson(LessonId::new(100)).await;

        session.record_position(130.0).await;
        assert_eq!(session.effective_viewed(), 100);
        assert_eq!(session.lesson_percent(), 100.0);
    }
}
