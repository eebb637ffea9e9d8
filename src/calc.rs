use crate::model::{Course, CoursePatch, CourseStats, CourseStatus};

/// Category labels the UI offers when registering a course. Not enforced.
pub const CATEGORY_SUGGESTIONS: &[&str] = &[
    "Programação",
    "Design",
    "Marketing",
    "Idiomas",
    "Ciência de Dados",
    "DevOps",
    "Front-end",
    "Back-end",
    "Mobile",
    "Web Development",
    "UI/UX",
    "Outros",
];

/// Percentage of lessons completed, `completed / total * 100`.
pub fn lesson_progress(completed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(completed) / f64::from(total)) * 100.0
}

pub fn status_for_progress(pct: f64) -> CourseStatus {
    if pct >= 100.0 {
        CourseStatus::Completed
    } else if pct > 0.0 {
        CourseStatus::InProgress
    } else {
        CourseStatus::NotStarted
    }
}

/// "+1 / -1 lesson" on a course card. The returned patch carries the clamped
/// lesson count together with the progress and status derived from it.
pub fn step_lessons(course: &Course, delta: i64) -> CoursePatch {
    let total = i64::from(course.total_lessons);
    let next = (i64::from(course.completed_lessons) + delta).clamp(0, total);
    // `next` lies in [0, total_lessons] so it fits back into u32.
    let completed = u32::try_from(next).unwrap_or(course.total_lessons);
    let progress = lesson_progress(completed, course.total_lessons);
    CoursePatch {
        completed_lessons: Some(completed),
        progress: Some(progress),
        status: Some(status_for_progress(progress)),
        ..CoursePatch::default()
    }
}

/// Edit-dialog flow: fills in `progress` and `status` from the lesson counts the
/// course will have once `patch` is applied. Lesson counts are clamped so that
/// `completedLessons <= totalLessons` and `totalLessons >= 1`.
pub fn consistent_patch(course: &Course, mut patch: CoursePatch) -> CoursePatch {
    let total = patch.total_lessons.unwrap_or(course.total_lessons).max(1);
    let completed = patch
        .completed_lessons
        .unwrap_or(course.completed_lessons)
        .min(total);
    if patch.total_lessons.is_some() {
        patch.total_lessons = Some(total);
    }
    if patch.completed_lessons.is_some() || completed != course.completed_lessons {
        patch.completed_lessons = Some(completed);
    }
    let progress = lesson_progress(completed, total);
    patch.progress = Some(progress);
    patch.status = Some(status_for_progress(progress));
    patch
}

pub fn course_stats(courses: &[Course]) -> CourseStats {
    let mut stats = CourseStats {
        total_courses: courses.len(),
        ..CourseStats::default()
    };
    for c in courses {
        let hours = u64::from(c.estimated_hours);
        stats.total_hours += hours;
        match c.status {
            CourseStatus::Completed => {
                stats.completed_courses += 1;
                stats.completed_hours += hours;
            }
            CourseStatus::InProgress => stats.in_progress_courses += 1,
            CourseStatus::NotStarted => {}
        }
    }
    stats
}

/// Share of courses completed, as shown in the dashboard progress bar.
pub fn overall_progress(stats: &CourseStats) -> f64 {
    if stats.total_courses == 0 {
        return 0.0;
    }
    (stats.completed_courses as f64 / stats.total_courses as f64) * 100.0
}

/// Study minutes are whole numbers, at least one.
pub fn normalize_minutes(raw: f64) -> u32 {
    if !raw.is_finite() || raw < 1.0 {
        return 1;
    }
    let floored = raw.floor();
    if floored >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        floored as u32
    }
}

pub fn normalize_note(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}
