use crate::ipc::error::{err, obj_param, ok, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::{StudyLogInput, StudyLogPatch};
use serde_json::json;

fn handle_logs_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let course_id = match str_param(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let input: StudyLogInput = match obj_param(req, "log") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    store.add_study_log(&course_id, input);
    ok(&req.id, json!({ "courses": store.courses() }))
}

fn handle_logs_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (course_id, log_id) = match (str_param(req, "courseId"), str_param(req, "logId")) {
        (Ok(c), Ok(l)) => (c, l),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    let patch: StudyLogPatch = match obj_param(req, "patch") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    store.update_study_log(&course_id, &log_id, patch);
    ok(&req.id, json!({ "courses": store.courses() }))
}

fn handle_logs_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (course_id, log_id) = match (str_param(req, "courseId"), str_param(req, "logId")) {
        (Ok(c), Ok(l)) => (c, l),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    store.delete_study_log(&course_id, &log_id);
    ok(&req.id, json!({ "courses": store.courses() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "logs.add" => Some(handle_logs_add(state, req)),
        "logs.update" => Some(handle_logs_update(state, req)),
        "logs.delete" => Some(handle_logs_delete(state, req)),
        _ => None,
    }
}
