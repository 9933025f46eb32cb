mod common;

use common::Sidecar;
use serde_json::json;

#[test]
fn missing_grades_are_excluded_from_the_average() {
    let mut sc = Sidecar::spawn();
    sc.create_student("s1", "Emma", "Johnson");
    let a = sc.create_assignment("Algebra Quiz 1", "quiz", 50.0);
    let _b = sc.create_assignment("Midterm Exam", "test", 100.0);

    assert_eq!(sc.student_average("s1"), None);
    sc.set_grade("s1", &a, 25.0);
    assert_eq!(sc.student_average("s1"), Some(50.0));

    let res = sc.request_ok("analytics.student.open", json!({ "studentId": "s1" }));
    let summary = res.get("summary").expect("summary");
    assert_eq!(summary.get("letter").and_then(|v| v.as_str()), Some("F"));
    assert_eq!(summary.get("gradedCount").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(summary.get("missingCount").and_then(|v| v.as_u64()), Some(1));
}

#[test]
fn set_grade_rejects_out_of_range_and_unknown_ids() {
    let mut sc = Sidecar::spawn();
    sc.create_student("s1", "Emma", "Johnson");
    let a = sc.create_assignment("Geometry Homework", "homework", 25.0);

    for score in [json!(-1), json!(25.5), json!("abc")] {
        let code = sc.request_err(
            "grades.set",
            json!({ "studentId": "s1", "assignmentId": a, "score": score }),
        );
        assert_eq!(code, "validation_error");
    }
    let code = sc.request_err(
        "grades.set",
        json!({ "studentId": "ghost", "assignmentId": a, "score": 10 }),
    );
    assert_eq!(code, "validation_error");
    let code = sc.request_err(
        "grades.set",
        json!({ "studentId": "s1", "assignmentId": "ghost", "score": 10 }),
    );
    assert_eq!(code, "validation_error");

    let got = sc.request_ok(
        "grades.get",
        json!({ "studentId": "s1", "assignmentId": a }),
    );
    assert!(got.get("score").map(|v| v.is_null()).unwrap_or(false));
}

#[test]
fn set_grade_twice_matches_once() {
    let mut sc = Sidecar::spawn();
    sc.create_student("s1", "Emma", "Johnson");
    let a = sc.create_assignment("Quiz", "quiz", 100.0);
    sc.set_grade("s1", &a, 90.0);
    let once = sc.request_ok("health", json!({}));
    sc.set_grade("s1", &a, 90.0);
    let twice = sc.request_ok("health", json!({}));
    assert_eq!(once.get("gradeCount"), twice.get("gradeCount"));
    assert_eq!(twice.get("gradeCount").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(sc.student_average("s1"), Some(90.0));
}

#[test]
fn zero_is_distinct_from_missing() {
    let mut sc = Sidecar::spawn();
    sc.create_student("s1", "Emma", "Johnson");
    let a = sc.create_assignment("Quiz", "quiz", 10.0);
    let b = sc.create_assignment("Test", "test", 10.0);
    sc.set_grade("s1", &a, 10.0);
    assert_eq!(sc.student_average("s1"), Some(100.0));
    sc.set_grade("s1", &b, 0.0);
    assert_eq!(sc.student_average("s1"), Some(50.0));

    let res = sc.request_ok(
        "grades.clear",
        json!({ "studentId": "s1", "assignmentId": b }),
    );
    assert_eq!(res.get("removed").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(sc.student_average("s1"), Some(100.0));

    let res = sc.request_ok(
        "grades.clear",
        json!({ "studentId": "s1", "assignmentId": b }),
    );
    assert_eq!(res.get("removed").and_then(|v| v.as_bool()), Some(false));
}

#[test]
fn delete_assignment_cascades_to_grades() {
    let mut sc = Sidecar::spawn();
    sc.create_student("s1", "Emma", "Johnson");
    sc.create_student("s2", "Liam", "Williams");
    let a = sc.create_assignment("Quiz", "quiz", 10.0);
    let b = sc.create_assignment("Project", "project", 75.0);
    sc.set_grade("s1", &a, 10.0);
    sc.set_grade("s2", &a, 2.0);
    sc.set_grade("s1", &b, 37.5);
    assert_eq!(sc.student_average("s1"), Some(75.0));

    let res = sc.request_ok("assignments.delete", json!({ "assignmentId": a }));
    assert_eq!(res.get("removedGrades").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(sc.student_average("s1"), Some(50.0));
    assert_eq!(sc.student_average("s2"), None);

    let code = sc.request_err("assignments.delete", json!({ "assignmentId": a }));
    assert_eq!(code, "not_found");
    let code = sc.request_err(
        "analytics.assignment.open",
        json!({ "assignmentId": a }),
    );
    assert_eq!(code, "not_found");
}

#[test]
fn update_max_points_keeps_raw_scores() {
    let mut sc = Sidecar::spawn();
    sc.create_student("s1", "Emma", "Johnson");
    let a = sc.create_assignment("Midterm", "test", 100.0);
    sc.set_grade("s1", &a, 80.0);

    let res = sc.request_ok(
        "assignments.update",
        json!({
            "assignmentId": a,
            "title": "Midterm",
            "type": "test",
            "maxPoints": 200,
            "dueDate": "2025-09-16"
        }),
    );
    let updated = res.get("assignment").expect("assignment");
    assert_eq!(updated.get("maxPoints").and_then(|v| v.as_f64()), Some(200.0));
    assert_eq!(updated.get("dueDate").and_then(|v| v.as_str()), Some("2025-09-16"));

    let got = sc.request_ok(
        "grades.get",
        json!({ "studentId": "s1", "assignmentId": a }),
    );
    assert_eq!(got.get("score").and_then(|v| v.as_f64()), Some(80.0));
    assert_eq!(sc.student_average("s1"), Some(40.0));
}

#[test]
fn assignment_validation_and_not_found() {
    let mut sc = Sidecar::spawn();
    for params in [
        json!({ "title": "x", "type": "quiz", "maxPoints": 0, "dueDate": "2025-09-10" }),
        json!({ "title": "x", "type": "quiz", "maxPoints": -5, "dueDate": "2025-09-10" }),
        json!({ "title": "", "type": "quiz", "maxPoints": 5, "dueDate": "2025-09-10" }),
        json!({ "title": "x", "maxPoints": 5, "dueDate": "2025-09-10" }),
        json!({ "title": "x", "type": "essay", "maxPoints": 5, "dueDate": "2025-09-10" }),
        json!({ "title": "x", "type": "quiz", "maxPoints": 5 }),
        json!({ "title": "x", "type": "quiz", "maxPoints": 5, "dueDate": "tomorrow" }),
    ] {
        assert_eq!(
            sc.request_err("assignments.create", params),
            "validation_error"
        );
    }
    let list = sc.request_ok("assignments.list", json!({}));
    assert_eq!(
        list.get("assignments").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(0)
    );

    let code = sc.request_err(
        "assignments.update",
        json!({
            "assignmentId": "missing",
            "title": "x",
            "type": "quiz",
            "maxPoints": 5,
            "dueDate": "2025-09-10"
        }),
    );
    assert_eq!(code, "not_found");
}

#[test]
fn bulk_set_applies_all_or_nothing() {
    let mut sc = Sidecar::spawn();
    sc.create_student("s1", "Emma", "Johnson");
    sc.create_student("s2", "Liam", "Williams");
    let a = sc.create_assignment("Quiz", "quiz", 20.0);

    let code = sc.request_err(
        "grades.bulkSet",
        json!({ "edits": [
            { "studentId": "s1", "assignmentId": a, "score": 18 },
            { "studentId": "s2", "assignmentId": a, "score": 21 }
        ]}),
    );
    assert_eq!(code, "validation_error");
    assert_eq!(sc.student_average("s1"), None);

    let res = sc.request_ok(
        "grades.bulkSet",
        json!({ "edits": [
            { "studentId": "s1", "assignmentId": a, "score": 18 },
            { "studentId": "s2", "assignmentId": a, "score": 20 }
        ]}),
    );
    assert_eq!(res.get("updated").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(sc.student_average("s1"), Some(90.0));
    assert_eq!(sc.student_average("s2"), Some(100.0));
}

#[test]
fn bulk_set_enforces_edit_limit() {
    let mut sc = Sidecar::spawn();
    let edits: Vec<serde_json::Value> = (0..5001)
        .map(|_| json!({ "studentId": "s", "assignmentId": "a", "score": 1 }))
        .collect();
    let code = sc.request_err("grades.bulkSet", json!({ "edits": edits }));
    assert_eq!(code, "bad_params");
}
