use crate::calc::{self, CalcContext, RowSortBy, SortDir};
use crate::error::GradebookError;
use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::{parse_filters, parse_student_ids, required_str};
use crate::ipc::types::{AppState, Request};
use crate::scoring::{grade_bucket, letter_grade};
use serde_json::json;

fn parse_sort(req: &Request) -> Result<(RowSortBy, SortDir), serde_json::Value> {
    let by = match req.params.get("sortBy") {
        None => RowSortBy::Roster,
        Some(v) if v.is_null() => RowSortBy::Roster,
        Some(v) => serde_json::from_value(v.clone()).map_err(|_| {
            err(
                &req.id,
                "bad_params",
                "sortBy must be one of: roster, name, average",
                Some(json!({ "sortBy": v })),
            )
        })?,
    };
    let dir = match req.params.get("sortDir") {
        None => SortDir::Asc,
        Some(v) if v.is_null() => SortDir::Asc,
        Some(v) => serde_json::from_value(v.clone()).map_err(|_| {
            err(
                &req.id,
                "bad_params",
                "sortDir must be asc or desc",
                Some(json!({ "sortDir": v })),
            )
        })?,
    };
    Ok((by, dir))
}

fn handle_analytics_student_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let filters = match parse_filters(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(student) = state.store.student(&student_id) else {
        return core_err(&req.id, GradebookError::not_found("student", student_id));
    };

    let ctx = CalcContext::new(&state.store, &filters);
    let row = calc::student_result(&ctx, student).rounded();
    let grades = state
        .store
        .assignments()
        .iter()
        .filter(|a| filters.includes(a))
        .map(|a| {
            let score = state.store.score(&student.id, &a.id);
            json!({
                "assignmentId": a.id,
                "title": a.title,
                "type": a.kind,
                "maxPoints": a.max_points,
                "score": score,
                "percent": score.map(|s| calc::round_off_1_decimal(calc::percent(s, a.max_points)))
            })
        })
        .collect::<Vec<_>>();

    ok(
        &req.id,
        json!({
            "student": student,
            "filters": filters,
            "summary": row,
            "grades": grades
        }),
    )
}

fn handle_analytics_class_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filters = match parse_filters(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student_ids = match parse_student_ids(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let ctx = CalcContext::new(&state.store, &filters);
    match calc::compute_class_summary(&ctx, student_ids.as_deref()) {
        Ok(summary) => ok(&req.id, json!(summary.rounded())),
        Err(e) => core_err(&req.id, e),
    }
}

fn handle_analytics_class_rows(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filters = match parse_filters(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student_ids = match parse_student_ids(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let (sort_by, sort_dir) = match parse_sort(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let roster = match calc::resolve_roster(&state.store, student_ids.as_deref()) {
        Ok(v) => v,
        Err(e) => return core_err(&req.id, e),
    };
    let ctx = CalcContext::new(&state.store, &filters);
    let mut rows = roster
        .iter()
        .map(|s| calc::student_result(&ctx, s))
        .collect::<Vec<_>>();
    calc::sort_rows(&mut rows, sort_by, sort_dir, &roster);

    ok(
        &req.id,
        json!({
            "filters": filters,
            "totalRows": rows.len(),
            "rows": rows.iter().map(|r| r.rounded()).collect::<Vec<_>>()
        }),
    )
}

fn handle_analytics_assignment_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student_ids = match parse_student_ids(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match calc::assignment_stats(&state.store, &assignment_id, student_ids.as_deref()) {
        Ok(stats) => ok(&req.id, json!({ "stats": stats.rounded() })),
        Err(e) => core_err(&req.id, e),
    }
}

fn handle_scoring_letter(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(pct) = req.params.get("percentage").and_then(|v| v.as_f64()) else {
        return err(&req.id, "bad_params", "missing percentage", None);
    };
    ok(
        &req.id,
        json!({
            "percentage": pct,
            "letter": letter_grade(pct),
            "bucket": grade_bucket(pct)
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.student.open" => Some(handle_analytics_student_open(state, req)),
        "analytics.class.open" => Some(handle_analytics_class_open(state, req)),
        "analytics.class.rows" => Some(handle_analytics_class_rows(state, req)),
        "analytics.assignment.open" => Some(handle_analytics_assignment_open(state, req)),
        "scoring.letter" => Some(handle_scoring_letter(state, req)),
        _ => None,
    }
}
