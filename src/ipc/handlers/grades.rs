use crate::error::GradebookError;
use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::GradeEntry;
use serde_json::json;

const GRADES_BULK_SET_MAX_EDITS: usize = 5000;

fn parse_score(v: Option<&serde_json::Value>) -> Result<f64, GradebookError> {
    match v {
        None => Err(GradebookError::validation("missing score")),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| GradebookError::validation("score must be a finite number")),
    }
}

fn handle_grades_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({
            "studentId": student_id,
            "assignmentId": assignment_id,
            "score": state.store.score(&student_id, &assignment_id)
        }),
    )
}

fn handle_grades_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let score = match parse_score(req.params.get("score")) {
        Ok(v) => v,
        Err(e) => return core_err(&req.id, e),
    };

    match state.store.set_grade(&student_id, &assignment_id, score) {
        Ok(entry) => ok(&req.id, json!({ "grade": entry })),
        Err(e) => core_err(&req.id, e),
    }
}

fn handle_grades_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let removed = state.store.clear_grade(&student_id, &assignment_id);
    ok(&req.id, json!({ "removed": removed }))
}

fn handle_grades_bulk_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("edits").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing edits", None);
    };
    if raw.len() > GRADES_BULK_SET_MAX_EDITS {
        return err(
            &req.id,
            "bad_params",
            "too many edits",
            Some(json!({
                "count": raw.len(),
                "max": GRADES_BULK_SET_MAX_EDITS
            })),
        );
    }

    let mut edits: Vec<GradeEntry> = Vec::with_capacity(raw.len());
    for (i, e) in raw.iter().enumerate() {
        let student_id = e.get("studentId").and_then(|v| v.as_str());
        let assignment_id = e.get("assignmentId").and_then(|v| v.as_str());
        let (Some(student_id), Some(assignment_id)) = (student_id, assignment_id) else {
            return err(
                &req.id,
                "bad_params",
                format!("edit {i}: missing studentId or assignmentId"),
                Some(json!({ "index": i })),
            );
        };
        let score = match parse_score(e.get("score")) {
            Ok(v) => v,
            Err(e) => {
                return core_err(
                    &req.id,
                    GradebookError::validation(format!("edit {i}: {e}")),
                )
            }
        };
        edits.push(GradeEntry {
            student_id: student_id.trim().to_string(),
            assignment_id: assignment_id.trim().to_string(),
            score,
        });
    }

    match state.store.set_grades(&edits) {
        Ok(updated) => ok(&req.id, json!({ "updated": updated })),
        Err(e) => core_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.get" => Some(handle_grades_get(state, req)),
        "grades.set" => Some(handle_grades_set(state, req)),
        "grades.clear" => Some(handle_grades_clear(state, req)),
        "grades.bulkSet" => Some(handle_grades_bulk_set(state, req)),
        _ => None,
    }
}
