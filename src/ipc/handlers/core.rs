use crate::ipc::error::{err, ok, str_param};
use crate::ipc::types::{AppState, Request};
use crate::storage::SqliteKv;
use crate::store::CourseStore;
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Opens (or creates) the workspace database and loads its courses.
/// Returns the number of courses loaded.
pub fn open_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<usize> {
    let kv = SqliteKv::open(path)
        .with_context(|| format!("failed to open workspace {}", path.to_string_lossy()))?;
    let store = CourseStore::open(kv);
    let count = store.courses().len();
    tracing::info!(workspace = %path.to_string_lossy(), courses = count, "workspace selected");
    state.workspace = Some(path.to_path_buf());
    state.store = Some(store);
    Ok(count)
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "durableInSync": state.store.as_ref().map(|s| s.durable_in_sync()),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match str_param(req, "path") {
        Ok(p) => PathBuf::from(p),
        Err(resp) => return resp,
    };

    match open_workspace(state, &path) {
        Ok(count) => ok(
            &req.id,
            json!({ "workspacePath": path.to_string_lossy(), "courseCount": count }),
        ),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
