use crate::ipc::error::{core_err, ok};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "students": state.store.students() }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let first_name = match required_str(req, "firstName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let last_name = match required_str(req, "lastName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let id = match optional_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    match state
        .store
        .add_student(id.as_deref(), &first_name, &last_name)
    {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => core_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        _ => None,
    }
}
