use pretty_assertions::assert_eq;
use studytrackd::calc;
use studytrackd::{
    CoursePatch, CourseStatus, CourseStore, KeyValueStore, MemoryKv, NewCourse, SqliteKv, StudyLogInput,
    STORAGE_KEY,
};

#[test]
fn missing_key_starts_empty() {
    let s = CourseStore::open(MemoryKv::new());
    assert!(s.courses().is_empty());
    assert!(s.durable_in_sync());
}

#[test]
fn malformed_snapshot_starts_empty_without_panicking() {
    let kv = MemoryKv::new().with_item(STORAGE_KEY, "{not json");
    let mut s = CourseStore::open(kv);
    assert!(s.courses().is_empty());

    s.add_course(NewCourse::titled("Recovered"));
    let stored = s.kv().get_item(STORAGE_KEY).unwrap().unwrap();
    assert!(stored.starts_with('['));
    assert!(stored.contains("Recovered"));
}

#[test]
fn every_mutation_writes_a_full_snapshot() {
    let mut s = CourseStore::open(MemoryKv::new());
    s.add_course(NewCourse::titled("A"));
    s.add_course(NewCourse::titled("B"));
    let id = s.courses()[0].id.clone();
    s.add_study_log(&id, StudyLogInput::minutes(25.0));

    let stored = s.kv().get_item(STORAGE_KEY).unwrap().unwrap();
    assert_eq!(stored, s.snapshot_json().unwrap());

    let reloaded = CourseStore::open(s.kv().clone());
    assert_eq!(reloaded.courses(), s.courses());
}

#[test]
fn rejected_write_keeps_memory_state_and_retries_on_next_mutation() {
    let mut s = CourseStore::open(MemoryKv::new());
    s.add_course(NewCourse::titled("Fits"));
    let durable_before = s.kv().get_item(STORAGE_KEY).unwrap();

    s.kv_mut().set_quota(Some(10));
    s.add_course(NewCourse::titled("Over quota"));

    assert_eq!(s.courses().len(), 2);
    assert!(!s.durable_in_sync());
    assert_eq!(s.kv().get_item(STORAGE_KEY).unwrap(), durable_before);

    s.kv_mut().set_quota(None);
    let id = s.courses()[1].id.clone();
    s.delete_course(&id);
    assert!(s.durable_in_sync());
    let reloaded = CourseStore::open(s.kv().clone());
    assert_eq!(reloaded.courses(), s.courses());
}

#[test]
fn sqlite_workspace_roundtrips_courses_and_logs() {
    let dir = tempfile::tempdir().expect("temp dir");

    let mut s = CourseStore::open(SqliteKv::open(dir.path()).expect("open workspace"));
    s.add_course(NewCourse {
        status: CourseStatus::InProgress,
        total_lessons: 12,
        completed_lessons: 3,
        progress: 25.0,
        estimated_hours: 8,
        notes: Some("weekends".into()),
        ..NewCourse::titled("Linear Algebra")
    });
    s.add_course(NewCourse::titled("Spanish"));
    let id = s.courses()[0].id.clone();
    s.add_study_log(
        &id,
        StudyLogInput {
            minutes: 50.0,
            note: Some("eigenvalues".into()),
            date: None,
        },
    );
    s.add_study_log(&id, StudyLogInput::minutes(15.0));
    let expected = s.courses().to_vec();
    drop(s);

    let reopened = CourseStore::open(SqliteKv::open(dir.path()).expect("reopen workspace"));
    assert_eq!(reopened.courses(), expected.as_slice());
    assert_eq!(reopened.courses()[0].study_logs[1].note.as_deref(), Some("eigenvalues"));
}

#[test]
fn snapshot_uses_camel_case_fields() {
    let mut s = CourseStore::open(MemoryKv::new());
    s.add_course(NewCourse::titled("Wire"));
    let v: serde_json::Value = serde_json::from_str(&s.snapshot_json().unwrap()).unwrap();
    let c = &v[0];
    for key in [
        "id",
        "title",
        "description",
        "category",
        "status",
        "progress",
        "totalLessons",
        "completedLessons",
        "estimatedHours",
        "createdAt",
        "updatedAt",
        "studyLogs",
    ] {
        assert!(c.get(key).is_some(), "missing {key}");
    }
    assert_eq!(c["status"], "not-started");
    assert!(c.get("notes").is_none());
}

#[test]
fn lesson_percentages_survive_a_reload_exactly() {
    let mut s = CourseStore::open(MemoryKv::new());
    s.add_course(NewCourse {
        total_lessons: 13,
        ..NewCourse::titled("Thirteen lessons")
    });
    s.add_course(NewCourse {
        total_lessons: 15,
        ..NewCourse::titled("Fifteen lessons")
    });
    let a = s.courses()[0].id.clone();
    let b = s.courses()[1].id.clone();
    for _ in 0..2 {
        let patch = calc::step_lessons(s.course(&a).expect("course a"), 1);
        s.update_course(&a, patch);
    }
    for _ in 0..14 {
        let patch = calc::step_lessons(s.course(&b).expect("course b"), 1);
        s.update_course(&b, patch);
    }
    assert_eq!(s.courses()[0].progress, calc::lesson_progress(2, 13));
    assert_eq!(s.courses()[1].progress, calc::lesson_progress(14, 15));

    let reloaded = CourseStore::open(s.kv().clone());
    assert_eq!(reloaded.courses(), s.courses());
}

#[test]
fn non_finite_progress_does_not_wipe_the_collection() {
    let mut s = CourseStore::open(MemoryKv::new());
    s.add_course(NewCourse::titled("A"));
    s.add_course(NewCourse {
        progress: f64::INFINITY,
        ..NewCourse::titled("B")
    });
    let id = s.courses()[0].id.clone();
    s.update_course(
        &id,
        CoursePatch {
            progress: Some(f64::NAN),
            ..CoursePatch::default()
        },
    );
    assert_eq!(s.courses()[0].progress, 0.0);
    assert_eq!(s.courses()[1].progress, 0.0);

    let reloaded = CourseStore::open(s.kv().clone());
    assert_eq!(reloaded.courses().len(), 2);
    assert_eq!(reloaded.courses(), s.courses());
}

#[test]
fn null_progress_in_stored_snapshot_loads_as_zero() {
    let mut s = CourseStore::open(MemoryKv::new());
    s.add_course(NewCourse::titled("A"));
    let stored = s.snapshot_json().expect("snapshot");
    let patched = stored.replace("\"progress\":0.0", "\"progress\":null");
    assert_ne!(patched, stored);

    let reloaded = CourseStore::open(MemoryKv::new().with_item(STORAGE_KEY, &patched));
    assert_eq!(reloaded.courses().len(), 1);
    assert_eq!(reloaded.courses()[0].progress, 0.0);
}
