use crate::dataset;
use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "datasetPath": state.dataset.as_ref().map(|p| p.to_string_lossy().to_string()),
            "studentCount": state.store.students().len(),
            "assignmentCount": state.store.assignments().len(),
            "gradeCount": state.store.grade_count(),
        }),
    )
}

fn handle_dataset_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };

    let doc = match dataset::read_dataset(&path) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "dataset_read_failed",
                format!("{e:#}"),
                Some(json!({ "path": path.to_string_lossy() })),
            )
        }
    };
    // Only swap once the whole file has validated.
    let store = match dataset::build_store(doc) {
        Ok(v) => v,
        Err(e) => return core_err(&req.id, e),
    };

    state.store = store;
    state.dataset = Some(path.clone());
    info!(path = %path.to_string_lossy(), "dataset selected");
    ok(
        &req.id,
        json!({
            "datasetPath": path.to_string_lossy(),
            "studentCount": state.store.students().len(),
            "assignmentCount": state.store.assignments().len(),
            "gradeCount": state.store.grade_count(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "dataset.load" => Some(handle_dataset_load(state, req)),
        _ => None,
    }
}
