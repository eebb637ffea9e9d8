use crate::backup;
use crate::ipc::error::{err, ok, str_param};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_backup_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let out_path = match str_param(req, "outPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    match backup::export_bundle(store.courses(), &out_path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "ok": true,
                "path": out_path.to_string_lossy(),
                "bundleFormat": summary.bundle_format,
                "entryCount": summary.entry_count,
                "courseCount": summary.course_count,
            }),
        ),
        Err(e) => {
            tracing::warn!(path = %out_path.to_string_lossy(), error = %e, "backup export failed");
            err(&req.id, "backup_failed", e.to_string(), None)
        }
    }
}

fn handle_backup_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let in_path = match str_param(req, "inPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    match backup::import_bundle(&in_path) {
        Ok(summary) => {
            let count = summary.courses.len();
            store.replace_all(summary.courses);
            ok(
                &req.id,
                json!({
                    "ok": true,
                    "bundleFormatDetected": summary.bundle_format_detected,
                    "courseCount": count,
                }),
            )
        }
        Err(e) => {
            tracing::warn!(path = %in_path.to_string_lossy(), error = %e, "backup import failed");
            err(&req.id, "backup_failed", e.to_string(), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_backup_export(state, req)),
        "backup.import" => Some(handle_backup_import(state, req)),
        _ => None,
    }
}
