use crate::calc;
use crate::model::{
    finite_progress, Course, CoursePatch, CourseStats, NewCourse, StudyLog, StudyLogInput,
    StudyLogPatch,
};
use crate::query::CourseQuery;
use crate::storage::KeyValueStore;
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Key under which the full course snapshot is mirrored.
pub const STORAGE_KEY: &str = "study-dashboard-courses";

pub trait Clock {
    /// Current instant as an ISO-8601 string.
    fn now(&self) -> String;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Owns the course collection for one workspace.
///
/// The collection is loaded from the key-value store on construction and the
/// complete snapshot is written back after every mutation. Lookups by id that
/// miss are silent no-ops. A failed load starts empty and a failed write keeps
/// the in-memory state; both are only logged.
pub struct CourseStore<K: KeyValueStore> {
    kv: K,
    clock: Box<dyn Clock>,
    courses: Vec<Course>,
    durable_in_sync: bool,
}

impl<K: KeyValueStore> CourseStore<K> {
    pub fn open(kv: K) -> Self {
        Self::with_clock(kv, Box::new(SystemClock))
    }

    pub fn with_clock(kv: K, clock: Box<dyn Clock>) -> Self {
        let courses = load_courses(&kv);
        CourseStore {
            kv,
            clock,
            courses,
            durable_in_sync: true,
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    /// False after a rejected write, until the next write succeeds.
    pub fn durable_in_sync(&self) -> bool {
        self.durable_in_sync
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.courses)
    }

    pub fn add_course(&mut self, data: NewCourse) {
        let now = self.clock.now();
        let course = Course {
            id: self.fresh_course_id(),
            title: data.title,
            description: data.description,
            category: data.category,
            status: data.status,
            progress: finite_progress(data.progress),
            total_lessons: data.total_lessons,
            completed_lessons: data.completed_lessons,
            estimated_hours: data.estimated_hours,
            created_at: now.clone(),
            updated_at: now,
            notes: data.notes,
            study_logs: data.study_logs,
        };
        tracing::debug!(course_id = %course.id, "course added");
        self.courses.push(course);
        self.persist();
    }

    /// Shallow merge. `status`/`progress` are taken as given; see
    /// [`calc::consistent_patch`] for deriving them from lesson counts.
    pub fn update_course(&mut self, id: &str, patch: CoursePatch) {
        let now = self.clock.now();
        let Some(course) = self.courses.iter_mut().find(|c| c.id == id) else {
            return;
        };
        patch.apply_to(course);
        course.updated_at = now;
        tracing::debug!(course_id = %id, "course updated");
        self.persist();
    }

    pub fn delete_course(&mut self, id: &str) {
        let before = self.courses.len();
        self.courses.retain(|c| c.id != id);
        if self.courses.len() == before {
            return;
        }
        tracing::debug!(course_id = %id, "course deleted");
        self.persist();
    }

    pub fn stats(&self) -> CourseStats {
        calc::course_stats(&self.courses)
    }

    pub fn filtered(&self, query: &CourseQuery) -> Vec<&Course> {
        query.apply(&self.courses)
    }

    pub fn add_study_log(&mut self, course_id: &str, input: StudyLogInput) {
        let now = self.clock.now();
        let Some(course) = self.courses.iter_mut().find(|c| c.id == course_id) else {
            return;
        };
        let mut log_id = Uuid::new_v4().to_string();
        while course.study_logs.iter().any(|l| l.id == log_id) {
            log_id = Uuid::new_v4().to_string();
        }
        let date = input
            .date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| now.clone());
        course.study_logs.insert(
            0,
            StudyLog {
                id: log_id,
                date,
                minutes: calc::normalize_minutes(input.minutes),
                note: calc::normalize_note(input.note),
            },
        );
        course.updated_at = now;
        tracing::debug!(course_id = %course_id, "study log added");
        self.persist();
    }

    pub fn update_study_log(&mut self, course_id: &str, log_id: &str, patch: StudyLogPatch) {
        let now = self.clock.now();
        let Some(course) = self.courses.iter_mut().find(|c| c.id == course_id) else {
            return;
        };
        let Some(log) = course.study_logs.iter_mut().find(|l| l.id == log_id) else {
            return;
        };
        if let Some(minutes) = patch.minutes {
            log.minutes = calc::normalize_minutes(minutes);
        }
        if let Some(note) = patch.note {
            log.note = calc::normalize_note(Some(note));
        }
        if let Some(date) = patch.date {
            log.date = date;
        }
        course.updated_at = now;
        tracing::debug!(course_id = %course_id, log_id = %log_id, "study log updated");
        self.persist();
    }

    pub fn delete_study_log(&mut self, course_id: &str, log_id: &str) {
        let now = self.clock.now();
        let Some(course) = self.courses.iter_mut().find(|c| c.id == course_id) else {
            return;
        };
        let before = course.study_logs.len();
        course.study_logs.retain(|l| l.id != log_id);
        if course.study_logs.len() == before {
            return;
        }
        course.updated_at = now;
        tracing::debug!(course_id = %course_id, log_id = %log_id, "study log deleted");
        self.persist();
    }

    /// Swaps in a whole collection (backup restore) as a single mutation.
    pub fn replace_all(&mut self, courses: Vec<Course>) {
        tracing::info!(count = courses.len(), "course collection replaced");
        self.courses = courses;
        self.persist();
    }

    fn fresh_course_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.course(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) {
        let text = match self.snapshot_json() {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(key = STORAGE_KEY, error = %e, "failed to serialize courses");
                self.durable_in_sync = false;
                return;
            }
        };
        match self.kv.set_item(STORAGE_KEY, &text) {
            Ok(()) => self.durable_in_sync = true,
            Err(e) => {
                tracing::error!(key = STORAGE_KEY, error = %e, "failed to save courses");
                self.durable_in_sync = false;
            }
        }
    }
}

fn load_courses<K: KeyValueStore>(kv: &K) -> Vec<Course> {
    let text = match kv.get_item(STORAGE_KEY) {
        Ok(Some(t)) => t,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::error!(key = STORAGE_KEY, error = %e, "failed to read stored courses");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Course>>(&text) {
        Ok(courses) => {
            tracing::debug!(count = courses.len(), "courses loaded");
            courses
        }
        Err(e) => {
            tracing::error!(key = STORAGE_KEY, error = %e, "error loading stored courses, starting empty");
            Vec::new()
        }
    }
}
