#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub struct Sidecar {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    next_id: u64,
}

impl Sidecar {
    pub fn spawn() -> Self {
        Self::spawn_with_args(&[])
    }

    pub fn spawn_with_args(args: &[&str]) -> Self {
        let exe = env!("CARGO_BIN_EXE_gradebookd");
        let mut child = Command::new(exe)
            .args(args)
            .env_remove("GRADEBOOKD_DATASET")
            .env_remove("GRADEBOOKD_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn gradebookd");
        let stdin = child.stdin.take().expect("child stdin");
        let stdout = child.stdout.take().expect("child stdout");
        Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
            next_id: 1,
        }
    }

    pub fn send_raw(&mut self, line: &str) -> serde_json::Value {
        writeln!(self.stdin, "{}", line).expect("write request");
        self.stdin.flush().expect("flush request");
        let mut out = String::new();
        self.reader.read_line(&mut out).expect("read response line");
        assert!(!out.trim().is_empty(), "empty response for {}", line);
        serde_json::from_str(out.trim()).expect("parse response json")
    }

    /// Sends a request and returns the full response envelope.
    pub fn request(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let id = self.next_id.to_string();
        self.next_id += 1;
        let payload = json!({
            "id": id,
            "method": method,
            "params": params,
        });
        let value = self.send_raw(&payload.to_string());
        assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id.as_str()));
        value
    }

    pub fn request_ok(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let value = self.request(method, params);
        assert!(
            value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
            "{} failed: {}",
            method,
            value
        );
        value.get("result").cloned().unwrap_or_else(|| json!({}))
    }

    /// Sends a request expected to fail and returns its error code.
    pub fn request_err(&mut self, method: &str, params: serde_json::Value) -> String {
        let value = self.request(method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(false),
            "{} unexpectedly succeeded: {}",
            method,
            value
        );
        value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_str())
            .unwrap_or("")
            .to_string()
    }

    pub fn create_student(&mut self, id: &str, first: &str, last: &str) {
        self.request_ok(
            "students.create",
            json!({ "id": id, "firstName": first, "lastName": last }),
        );
    }

    pub fn create_assignment(&mut self, title: &str, kind: &str, max_points: f64) -> String {
        let res = self.request_ok(
            "assignments.create",
            json!({
                "title": title,
                "type": kind,
                "maxPoints": max_points,
                "dueDate": "2025-09-15"
            }),
        );
        res.get("assignment")
            .and_then(|a| a.get("id"))
            .and_then(|v| v.as_str())
            .expect("assignment id")
            .to_string()
    }

    pub fn set_grade(&mut self, student_id: &str, assignment_id: &str, score: f64) {
        self.request_ok(
            "grades.set",
            json!({
                "studentId": student_id,
                "assignmentId": assignment_id,
                "score": score
            }),
        );
    }

    pub fn student_average(&mut self, student_id: &str) -> Option<f64> {
        let res = self.request_ok(
            "analytics.student.open",
            json!({ "studentId": student_id }),
        );
        res.get("summary")
            .and_then(|s| s.get("average"))
            .and_then(|v| v.as_f64())
    }
}

impl Drop for Sidecar {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
