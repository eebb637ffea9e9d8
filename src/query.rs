use crate::model::Course;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sentinel filter value that disables status/category matching.
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    UpdatedAtDesc,
    CreatedAtDesc,
    ProgressDesc,
    TitleAsc,
    /// Any other key: keep the stored order.
    Unordered,
}

impl OrderBy {
    pub fn parse(s: &str) -> Self {
        match s {
            "updatedAt_desc" => OrderBy::UpdatedAtDesc,
            "createdAt_desc" => OrderBy::CreatedAtDesc,
            "progress_desc" => OrderBy::ProgressDesc,
            "title_asc" => OrderBy::TitleAsc,
            _ => OrderBy::Unordered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseQuery {
    pub search: String,
    pub status: String,
    pub category: String,
    pub order_by: String,
}

impl Default for CourseQuery {
    fn default() -> Self {
        CourseQuery {
            search: String::new(),
            status: ALL.to_string(),
            category: ALL.to_string(),
            order_by: "updatedAt_desc".to_string(),
        }
    }
}

impl CourseQuery {
    /// Filters then stable-sorts `courses`; the input slice is not reordered.
    pub fn apply<'a>(&self, courses: &'a [Course]) -> Vec<&'a Course> {
        let needle = self.search.trim().to_lowercase();
        let mut out: Vec<&Course> = courses
            .iter()
            .filter(|c| matches_search(c, &needle))
            .filter(|c| self.status == ALL || c.status.as_str() == self.status)
            .filter(|c| self.category == ALL || c.category == self.category)
            .collect();

        match OrderBy::parse(&self.order_by) {
            OrderBy::UpdatedAtDesc => {
                out.sort_by(|a, b| cmp_instant(&b.updated_at, &a.updated_at))
            }
            OrderBy::CreatedAtDesc => {
                out.sort_by(|a, b| cmp_instant(&b.created_at, &a.created_at))
            }
            OrderBy::ProgressDesc => out.sort_by(|a, b| cmp_progress(b.progress, a.progress)),
            OrderBy::TitleAsc => out.sort_by(|a, b| cmp_title(&a.title, &b.title)),
            OrderBy::Unordered => {}
        }
        out
    }
}

fn matches_search(c: &Course, needle: &str) -> bool {
    needle.is_empty()
        || c.title.to_lowercase().contains(needle)
        || c.description.to_lowercase().contains(needle)
}

fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

// Unparseable timestamps order as the oldest instant.
fn cmp_instant(a: &str, b: &str) -> Ordering {
    match (parse_instant(a), parse_instant(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_progress(a: f64, b: f64) -> Ordering {
    let a = if a.is_finite() { a } else { 0.0 };
    let b = if b.is_finite() { b } else { 0.0 };
    a.total_cmp(&b)
}

fn cmp_title(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
