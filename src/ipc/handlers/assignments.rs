use crate::error::GradebookError;
use crate::ipc::error::{core_err, ok};
use crate::ipc::helpers::{parse_filters, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{AssignmentSpec, AssignmentType};
use chrono::NaiveDate;
use serde_json::json;

fn field<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    params.get(key).filter(|v| !v.is_null())
}

/// Reads assignment fields leniently: absent keys stay `None` so the store
/// reports them, present-but-malformed values are validation errors.
fn parse_spec(params: &serde_json::Value) -> Result<AssignmentSpec, GradebookError> {
    let title = match field(params, "title") {
        None => None,
        Some(v) => Some(
            v.as_str()
                .ok_or_else(|| GradebookError::validation("title must be a string"))?
                .to_string(),
        ),
    };

    let kind = match field(params, "type") {
        None => None,
        Some(v) => {
            let raw = v
                .as_str()
                .ok_or_else(|| GradebookError::validation("type must be a string"))?;
            if raw.trim().is_empty() {
                None
            } else {
                Some(AssignmentType::parse(raw).ok_or_else(|| {
                    GradebookError::validation(format!("unknown assignment type: {raw}"))
                })?)
            }
        }
    };

    // Form inputs arrive as strings; accept either.
    let max_points = match field(params, "maxPoints") {
        None => None,
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(serde_json::Value::String(s)) => Some(s.trim().parse::<f64>().map_err(|_| {
            GradebookError::validation(format!("maxPoints is not a number: {s}"))
        })?),
        Some(_) => return Err(GradebookError::validation("maxPoints must be a number")),
    };

    let due_date = match field(params, "dueDate") {
        None => None,
        Some(v) => {
            let raw = v
                .as_str()
                .ok_or_else(|| GradebookError::validation("dueDate must be a string"))?;
            if raw.trim().is_empty() {
                None
            } else {
                Some(
                    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                        GradebookError::validation(format!(
                            "dueDate must be YYYY-MM-DD (got {raw})"
                        ))
                    })?,
                )
            }
        }
    };

    let description = match field(params, "description") {
        None => None,
        Some(v) => Some(
            v.as_str()
                .ok_or_else(|| GradebookError::validation("description must be a string"))?
                .to_string(),
        ),
    };

    Ok(AssignmentSpec {
        title,
        kind,
        max_points,
        due_date,
        description,
    })
}

fn handle_assignments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filters = match parse_filters(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assignments = state
        .store
        .assignments()
        .iter()
        .filter(|a| filters.includes(a))
        .collect::<Vec<_>>();
    ok(&req.id, json!({ "assignments": assignments }))
}

fn handle_assignments_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let spec = match parse_spec(&req.params) {
        Ok(v) => v,
        Err(e) => return core_err(&req.id, e),
    };
    match state.store.create_assignment(&spec) {
        Ok(a) => ok(&req.id, json!({ "assignment": a })),
        Err(e) => core_err(&req.id, e),
    }
}

fn handle_assignments_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.store.assignment(&assignment_id).is_none() {
        return core_err(
            &req.id,
            GradebookError::not_found("assignment", assignment_id),
        );
    }
    let spec = match parse_spec(&req.params) {
        Ok(v) => v,
        Err(e) => return core_err(&req.id, e),
    };
    match state.store.update_assignment(&assignment_id, &spec) {
        Ok(a) => ok(&req.id, json!({ "assignment": a })),
        Err(e) => core_err(&req.id, e),
    }
}

fn handle_assignments_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.delete_assignment(&assignment_id) {
        Ok(removed) => ok(
            &req.id,
            json!({
                "assignmentId": assignment_id,
                "removedGrades": removed
            }),
        ),
        Err(e) => core_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.list" => Some(handle_assignments_list(state, req)),
        "assignments.create" => Some(handle_assignments_create(state, req)),
        "assignments.update" => Some(handle_assignments_update(state, req)),
        "assignments.delete" => Some(handle_assignments_delete(state, req)),
        _ => None,
    }
}
