use std::fs::File;
use std::io::{Read, Write};

use pretty_assertions::assert_eq;
use studytrackd::backup::{self, BackupError};
use studytrackd::{CourseStore, MemoryKv, NewCourse, StudyLogInput};

fn seeded() -> CourseStore<MemoryKv> {
    let mut s = CourseStore::open(MemoryKv::new());
    s.add_course(NewCourse::titled("Rust"));
    s.add_course(NewCourse::titled("Statistics"));
    let id = s.courses()[1].id.clone();
    s.add_study_log(&id, StudyLogInput::minutes(40.0));
    s
}

#[test]
fn zip_export_and_import_roundtrip() {
    let out_dir = tempfile::tempdir().expect("temp dir");
    let bundle_path = out_dir.path().join("nested").join("courses.stbackup.zip");
    let s = seeded();

    let export = backup::export_bundle(s.courses(), &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, backup::BUNDLE_FORMAT_V1);
    assert_eq!(export.entry_count, 2);
    assert_eq!(export.course_count, 2);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(backup::BUNDLE_FORMAT_V1));
    assert!(manifest.contains(&backup::sha256_hex(
        s.snapshot_json().expect("snapshot").as_bytes()
    )));

    let import = backup::import_bundle(&bundle_path).expect("import bundle");
    assert_eq!(import.bundle_format_detected, backup::BUNDLE_FORMAT_V1);
    assert_eq!(import.courses.as_slice(), s.courses());

    let mut restored = CourseStore::open(MemoryKv::new());
    restored.replace_all(import.courses);
    assert_eq!(restored.courses(), s.courses());
    assert_eq!(
        CourseStore::open(restored.kv().clone()).courses(),
        s.courses()
    );
}

#[test]
fn raw_json_snapshot_import_is_supported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("localstorage-export.json");
    let s = seeded();
    std::fs::write(&path, s.snapshot_json().expect("snapshot")).expect("write snapshot");

    let import = backup::import_bundle(&path).expect("import raw json");
    assert_eq!(import.bundle_format_detected, backup::RAW_JSON_FORMAT);
    assert_eq!(import.courses.as_slice(), s.courses());
}

#[test]
fn tampered_bundle_fails_checksum() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tampered.zip");
    let manifest = serde_json::json!({
        "format": backup::BUNDLE_FORMAT_V1,
        "version": 1,
        "sha256": backup::sha256_hex(b"[]"),
    });

    let mut zip = zip::ZipWriter::new(File::create(&path).expect("create zip"));
    let opts = zip::write::FileOptions::default();
    zip.start_file("manifest.json", opts).expect("manifest entry");
    zip.write_all(manifest.to_string().as_bytes())
        .expect("write manifest");
    zip.start_file("data/courses.json", opts).expect("data entry");
    zip.write_all(b"[ ]").expect("write data");
    zip.finish().expect("finish zip");

    let e = backup::import_bundle(&path).expect_err("checksum must fail");
    assert!(matches!(e, BackupError::ChecksumMismatch { .. }), "{e}");
}

#[test]
fn duplicate_ids_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dupes.json");
    let s = seeded();
    let mut courses = s.courses().to_vec();
    courses[1].id = courses[0].id.clone();
    std::fs::write(&path, serde_json::to_string(&courses).expect("json")).expect("write");

    let e = backup::import_bundle(&path).expect_err("duplicates must fail");
    assert!(matches!(e, BackupError::DuplicateId(_)), "{e}");
}

#[test]
fn browser_snapshot_with_out_of_range_counts_still_imports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("browser.json");
    let snapshot = serde_json::json!([{
        "id": "legacy-1",
        "title": "Old record",
        "description": "",
        "category": "Outros",
        "status": "not-started",
        "progress": 0,
        "totalLessons": 0,
        "completedLessons": -2,
        "estimatedHours": -5,
        "createdAt": "2025-05-01T12:00:00.000Z",
        "updatedAt": "2025-05-01T12:00:00.000Z"
    }]);
    std::fs::write(&path, snapshot.to_string()).expect("write snapshot");

    let import = backup::import_bundle(&path).expect("import browser snapshot");
    let c = &import.courses[0];
    assert_eq!(c.total_lessons, 1);
    assert_eq!(c.completed_lessons, 0);
    assert_eq!(c.estimated_hours, 1);
}
