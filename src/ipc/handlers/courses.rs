use crate::calc;
use crate::ipc::error::{err, obj_param, ok, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::{CoursePatch, NewCourse};
use crate::query::CourseQuery;
use serde_json::json;

fn handle_courses_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return ok(&req.id, json!({ "courses": [] }));
    };
    ok(&req.id, json!({ "courses": store.courses() }))
}

fn handle_courses_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let course_id = match str_param(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.course(&course_id) {
        Some(course) => ok(&req.id, json!({ "course": course })),
        None => err(
            &req.id,
            "not_found",
            "course not found",
            Some(json!({ "courseId": course_id })),
        ),
    }
}

fn handle_courses_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let data: NewCourse = match obj_param(req, "course") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // Empty titles are rejected here, at the collaborator boundary; the store
    // itself takes whatever it is given.
    if data.title.trim().is_empty() {
        return err(&req.id, "bad_params", "title must not be empty", None);
    }
    store.add_course(data);
    ok(&req.id, json!({ "course": store.courses().last() }))
}

fn handle_courses_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let course_id = match str_param(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch: CoursePatch = match obj_param(req, "patch") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let derive = req
        .params
        .get("deriveProgress")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let patch = match (derive, store.course(&course_id)) {
        (true, Some(course)) => calc::consistent_patch(course, patch),
        _ => patch,
    };
    store.update_course(&course_id, patch);
    ok(&req.id, json!({ "courses": store.courses() }))
}

fn handle_courses_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let course_id = match str_param(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    store.delete_course(&course_id);
    ok(&req.id, json!({ "courses": store.courses() }))
}

fn handle_courses_step_lessons(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let course_id = match str_param(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(delta) = req.params.get("delta").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing delta", None);
    };
    let Some(course) = store.course(&course_id) else {
        return err(
            &req.id,
            "not_found",
            "course not found",
            Some(json!({ "courseId": course_id })),
        );
    };
    let patch = calc::step_lessons(course, delta);
    store.update_course(&course_id, patch);
    ok(&req.id, json!({ "course": store.course(&course_id) }))
}

fn handle_courses_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let stats = state
        .store
        .as_ref()
        .map(|s| s.stats())
        .unwrap_or_default();
    ok(
        &req.id,
        json!({
            "stats": stats,
            "overallProgress": calc::overall_progress(&stats),
        }),
    )
}

fn handle_courses_filtered(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return ok(&req.id, json!({ "courses": [] }));
    };
    let query: CourseQuery = if req.params.is_null() {
        CourseQuery::default()
    } else {
        match serde_json::from_value(req.params.clone()) {
            Ok(q) => q,
            Err(e) => return err(&req.id, "bad_params", format!("invalid filter: {e}"), None),
        }
    };
    ok(&req.id, json!({ "courses": store.filtered(&query) }))
}

fn handle_courses_categories(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "categories": calc::CATEGORY_SUGGESTIONS }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.list" => Some(handle_courses_list(state, req)),
        "courses.get" => Some(handle_courses_get(state, req)),
        "courses.add" => Some(handle_courses_add(state, req)),
        "courses.update" => Some(handle_courses_update(state, req)),
        "courses.delete" => Some(handle_courses_delete(state, req)),
        "courses.stepLessons" => Some(handle_courses_step_lessons(state, req)),
        "courses.stats" => Some(handle_courses_stats(state, req)),
        "courses.filtered" => Some(handle_courses_filtered(state, req)),
        "courses.categories" => Some(handle_courses_categories(state, req)),
        _ => None,
    }
}
