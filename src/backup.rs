use crate::model::Course;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DATA_ENTRY: &str = "data/courses.json";
pub const BUNDLE_FORMAT_V1: &str = "studytrack-courses-v1";
pub const RAW_JSON_FORMAT: &str = "raw-json";

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("invalid json in {entry}: {source}")]
    Json {
        entry: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported bundle format: {0}")]
    UnsupportedFormat(String),
    #[error("checksum mismatch: manifest {expected}, data {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("duplicate course id in backup: {0}")]
    DuplicateId(String),
}

fn io_err(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> BackupError {
    let context = context.into();
    move |source| BackupError::Io { context, source }
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
    pub course_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub courses: Vec<Course>,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn export_bundle(courses: &[Course], out_path: &Path) -> Result<ExportSummary, BackupError> {
    let snapshot = serde_json::to_string(courses).map_err(|source| BackupError::Json {
        entry: DATA_ENTRY.to_string(),
        source,
    })?;

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err(format!(
            "failed to create directory {}",
            parent.to_string_lossy()
        )))?;
    }

    let out_file = File::create(out_path).map_err(io_err(format!(
        "failed to create output file {}",
        out_path.to_string_lossy()
    )))?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "courseCount": courses.len(),
        "sha256": sha256_hex(snapshot.as_bytes()),
    });
    let manifest_text =
        serde_json::to_string_pretty(&manifest).map_err(|source| BackupError::Json {
            entry: MANIFEST_ENTRY.to_string(),
            source,
        })?;

    zip.start_file(MANIFEST_ENTRY, opts)?;
    zip.write_all(manifest_text.as_bytes())
        .map_err(io_err("failed to write manifest entry"))?;

    zip.start_file(DATA_ENTRY, opts)?;
    zip.write_all(snapshot.as_bytes())
        .map_err(io_err("failed to write course data entry"))?;

    zip.finish()?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: 2,
        course_count: courses.len(),
    })
}

/// Reads a zip bundle, or a bare JSON snapshot as stored under the
/// durable key.
pub fn import_bundle(in_path: &Path) -> Result<ImportSummary, BackupError> {
    if !is_zip_file(in_path)? {
        let text = std::fs::read_to_string(in_path).map_err(io_err(format!(
            "failed to read snapshot {}",
            in_path.to_string_lossy()
        )))?;
        let courses = parse_courses(&text, &in_path.to_string_lossy())?;
        return Ok(ImportSummary {
            bundle_format_detected: RAW_JSON_FORMAT.to_string(),
            courses,
        });
    }

    let in_file = File::open(in_path).map_err(io_err(format!(
        "failed to open bundle {}",
        in_path.to_string_lossy()
    )))?;
    let mut archive = ZipArchive::new(in_file)?;

    let manifest_text = read_entry(&mut archive, MANIFEST_ENTRY)?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).map_err(|source| BackupError::Json {
            entry: MANIFEST_ENTRY.to_string(),
            source,
        })?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(BackupError::UnsupportedFormat(format.to_string()));
    }

    let data = read_entry(&mut archive, DATA_ENTRY)?;
    if let Some(expected) = manifest.get("sha256").and_then(|v| v.as_str()) {
        let actual = sha256_hex(data.as_bytes());
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(BackupError::ChecksumMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
    }

    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        courses: parse_courses(&data, DATA_ENTRY)?,
    })
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<String, BackupError> {
    let mut text = String::new();
    archive
        .by_name(name)?
        .read_to_string(&mut text)
        .map_err(io_err(format!("failed to read {name}")))?;
    Ok(text)
}

fn parse_courses(text: &str, entry: &str) -> Result<Vec<Course>, BackupError> {
    let courses: Vec<Course> = serde_json::from_str(text).map_err(|source| BackupError::Json {
        entry: entry.to_string(),
        source,
    })?;
    let mut seen = HashSet::new();
    for c in &courses {
        if !seen.insert(c.id.as_str()) {
            return Err(BackupError::DuplicateId(c.id.clone()));
        }
    }
    Ok(courses)
}

fn is_zip_file(path: &Path) -> Result<bool, BackupError> {
    let mut f = File::open(path).map_err(io_err(format!(
        "failed to open input file {}",
        path.to_string_lossy()
    )))?;
    let mut sig = [0u8; 4];
    let read = f
        .read(&mut sig)
        .map_err(io_err("failed to read file signature"))?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
