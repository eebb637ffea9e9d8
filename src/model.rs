use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl CourseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseStatus::NotStarted => "not-started",
            CourseStatus::InProgress => "in-progress",
            CourseStatus::Completed => "completed",
        }
    }
}

/// One study session recorded against a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyLog {
    pub id: String,
    pub date: String,
    pub minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub status: CourseStatus,
    // Snapshots written before progress was tracked carry no value here.
    #[serde(default, deserialize_with = "lenient_progress")]
    pub progress: f64,
    #[serde(deserialize_with = "lenient_count_min_one")]
    pub total_lessons: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub completed_lessons: u32,
    #[serde(deserialize_with = "lenient_count_min_one")]
    pub estimated_hours: u32,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Newest first.
    #[serde(default)]
    pub study_logs: Vec<StudyLog>,
}

/// Everything a caller supplies when registering a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub status: CourseStatus,
    #[serde(default, deserialize_with = "lenient_progress")]
    pub progress: f64,
    #[serde(deserialize_with = "lenient_count_min_one")]
    pub total_lessons: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub completed_lessons: u32,
    #[serde(deserialize_with = "lenient_count_min_one")]
    pub estimated_hours: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub study_logs: Vec<StudyLog>,
}

impl NewCourse {
    /// Defaults of the "add course" form: one lesson, one hour, nothing done yet.
    pub fn titled(title: impl Into<String>) -> Self {
        NewCourse {
            title: title.into(),
            description: String::new(),
            category: String::new(),
            status: CourseStatus::NotStarted,
            progress: 0.0,
            total_lessons: 1,
            completed_lessons: 0,
            estimated_hours: 1,
            notes: None,
            study_logs: Vec::new(),
        }
    }
}

/// Partial course update. Keys that are `Some` replace the stored value;
/// `None` keys leave it untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lessons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_lessons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        *self == CoursePatch::default()
    }

    pub(crate) fn apply_to(self, course: &mut Course) {
        if let Some(v) = self.title {
            course.title = v;
        }
        if let Some(v) = self.description {
            course.description = v;
        }
        if let Some(v) = self.category {
            course.category = v;
        }
        if let Some(v) = self.status {
            course.status = v;
        }
        if let Some(v) = self.progress {
            course.progress = finite_progress(v);
        }
        if let Some(v) = self.total_lessons {
            course.total_lessons = v;
        }
        if let Some(v) = self.completed_lessons {
            course.completed_lessons = v;
        }
        if let Some(v) = self.estimated_hours {
            course.estimated_hours = v;
        }
        if let Some(v) = self.notes {
            course.notes = Some(v);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyLogInput {
    pub minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl StudyLogInput {
    pub fn minutes(minutes: f64) -> Self {
        StudyLogInput {
            minutes,
            note: None,
            date: None,
        }
    }
}

/// Partial study log update. A blank `note` clears the stored note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyLogPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    pub total_courses: usize,
    pub completed_courses: usize,
    pub in_progress_courses: usize,
    pub total_hours: u64,
    pub completed_hours: u64,
}

/// Non-finite progress would be written out as `null`; store it as 0.
pub fn finite_progress(p: f64) -> f64 {
    if p.is_finite() {
        p
    } else {
        0.0
    }
}

fn clamp_count(raw: f64, min: u32) -> u32 {
    if !raw.is_finite() || raw <= f64::from(min) {
        return min;
    }
    let floored = raw.floor();
    if floored >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        floored as u32
    }
}

fn lenient_progress<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(finite_progress(Option::<f64>::deserialize(d)?.unwrap_or(0.0)))
}

// Browser snapshots may hold negative or fractional counts; clamp them
// rather than reject the whole snapshot.
fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(clamp_count(Option::<f64>::deserialize(d)?.unwrap_or(0.0), 0))
}

fn lenient_count_min_one<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(clamp_count(Option::<f64>::deserialize(d)?.unwrap_or(1.0), 1))
}
