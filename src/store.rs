use crate::error::{GradebookError, GradebookResult};
use crate::model::{Assignment, AssignmentSpec, AssignmentType, GradeEntry, Student};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Sparse `(student, assignment) -> score` book plus the rosters it is keyed
/// against. Every write goes through the methods below; each one validates
/// before touching any state, so a failed call leaves the store unchanged.
#[derive(Debug, Clone, Default)]
pub struct GradeStore {
    students: Vec<Student>,
    student_index: HashMap<String, usize>,
    assignments: Vec<Assignment>,
    // assignment_id -> student_id -> score
    grades: HashMap<String, HashMap<String, f64>>,
}

struct ValidSpec {
    title: String,
    kind: AssignmentType,
    max_points: f64,
    due_date: NaiveDate,
    description: Option<String>,
}

fn validate_spec(spec: &AssignmentSpec) -> GradebookResult<ValidSpec> {
    let title = spec
        .title
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if title.is_empty() {
        return Err(GradebookError::validation("title must not be empty"));
    }
    let Some(kind) = spec.kind else {
        return Err(GradebookError::validation("missing assignment type"));
    };
    let Some(max_points) = spec.max_points else {
        return Err(GradebookError::validation("missing maxPoints"));
    };
    if !max_points.is_finite() || max_points <= 0.0 {
        return Err(GradebookError::validation(format!(
            "maxPoints must be a positive number (got {max_points})"
        )));
    }
    let Some(due_date) = spec.due_date else {
        return Err(GradebookError::validation("missing dueDate"));
    };
    let description = spec
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ValidSpec {
        title,
        kind,
        max_points,
        due_date,
        description,
    })
}

impl GradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.student_index.get(id).map(|&i| &self.students[i])
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub fn score(&self, student_id: &str, assignment_id: &str) -> Option<f64> {
        self.grades
            .get(assignment_id)
            .and_then(|m| m.get(student_id))
            .copied()
    }

    pub fn grade_count(&self) -> usize {
        self.grades.values().map(|m| m.len()).sum()
    }

    /// All entries, ordered by assignment then roster position.
    #[cfg(test)]
    pub fn entries(&self) -> Vec<GradeEntry> {
        let mut out = Vec::with_capacity(self.grade_count());
        for a in &self.assignments {
            let Some(by_student) = self.grades.get(&a.id) else {
                continue;
            };
            for s in &self.students {
                if let Some(score) = by_student.get(&s.id) {
                    out.push(GradeEntry {
                        student_id: s.id.clone(),
                        assignment_id: a.id.clone(),
                        score: *score,
                    });
                }
            }
        }
        out
    }

    pub fn add_student(
        &mut self,
        id: Option<&str>,
        first_name: &str,
        last_name: &str,
    ) -> GradebookResult<Student> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(GradebookError::validation(
                "firstName and lastName must not be empty",
            ));
        }
        let id = match id.map(str::trim) {
            Some("") => return Err(GradebookError::validation("student id must not be empty")),
            Some(v) => v.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        if self.student_index.contains_key(&id) {
            return Err(GradebookError::validation(format!(
                "duplicate student id: {id}"
            )));
        }

        let student = Student {
            id: id.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        self.student_index.insert(id, self.students.len());
        self.students.push(student.clone());
        debug!(student_id = %student.id, "student added");
        Ok(student)
    }

    pub fn create_assignment(&mut self, spec: &AssignmentSpec) -> GradebookResult<Assignment> {
        let v = validate_spec(spec)?;
        let assignment = Assignment {
            id: Uuid::new_v4().to_string(),
            title: v.title,
            kind: v.kind,
            max_points: v.max_points,
            due_date: v.due_date,
            description: v.description,
        };
        self.assignments.push(assignment.clone());
        info!(assignment_id = %assignment.id, title = %assignment.title, "assignment created");
        Ok(assignment)
    }

    /// Inserts an assignment that already carries its id (dataset import).
    pub fn insert_assignment(&mut self, assignment: Assignment) -> GradebookResult<Assignment> {
        let id = assignment.id.trim().to_string();
        if id.is_empty() {
            return Err(GradebookError::validation("assignment id must not be empty"));
        }
        if self.assignment(&id).is_some() {
            return Err(GradebookError::validation(format!(
                "duplicate assignment id: {id}"
            )));
        }
        let v = validate_spec(&AssignmentSpec {
            title: Some(assignment.title),
            kind: Some(assignment.kind),
            max_points: Some(assignment.max_points),
            due_date: Some(assignment.due_date),
            description: assignment.description,
        })?;
        let assignment = Assignment {
            id,
            title: v.title,
            kind: v.kind,
            max_points: v.max_points,
            due_date: v.due_date,
            description: v.description,
        };
        self.assignments.push(assignment.clone());
        Ok(assignment)
    }

    /// Replaces the mutable fields in place. Recorded scores are kept as-is
    /// even when `maxPoints` changes; only later percentages see the new scale.
    pub fn update_assignment(
        &mut self,
        id: &str,
        spec: &AssignmentSpec,
    ) -> GradebookResult<Assignment> {
        let Some(pos) = self.assignments.iter().position(|a| a.id == id) else {
            return Err(GradebookError::not_found("assignment", id));
        };
        let v = validate_spec(spec)?;

        let a = &mut self.assignments[pos];
        if a.max_points != v.max_points {
            debug!(
                assignment_id = %id,
                old = a.max_points,
                new = v.max_points,
                "maxPoints changed; stored scores are not rescaled"
            );
        }
        a.title = v.title;
        a.kind = v.kind;
        a.max_points = v.max_points;
        a.due_date = v.due_date;
        a.description = v.description;
        info!(assignment_id = %id, "assignment updated");
        Ok(a.clone())
    }

    /// Removes the assignment and every grade keyed to it. Returns the number
    /// of grade entries dropped.
    pub fn delete_assignment(&mut self, id: &str) -> GradebookResult<usize> {
        let Some(pos) = self.assignments.iter().position(|a| a.id == id) else {
            return Err(GradebookError::not_found("assignment", id));
        };
        self.assignments.remove(pos);
        let removed = self.grades.remove(id).map(|m| m.len()).unwrap_or(0);
        info!(assignment_id = %id, removed_grades = removed, "assignment deleted");
        Ok(removed)
    }

    fn check_grade(
        &self,
        student_id: &str,
        assignment_id: &str,
        score: f64,
    ) -> GradebookResult<()> {
        if self.student(student_id).is_none() {
            return Err(GradebookError::validation(format!(
                "unknown student: {student_id}"
            )));
        }
        let Some(a) = self.assignment(assignment_id) else {
            return Err(GradebookError::validation(format!(
                "unknown assignment: {assignment_id}"
            )));
        };
        if !score.is_finite() {
            return Err(GradebookError::validation("score must be a finite number"));
        }
        if score < 0.0 {
            return Err(GradebookError::validation(format!(
                "score must be >= 0 (got {score})"
            )));
        }
        if score > a.max_points {
            return Err(GradebookError::validation(format!(
                "score {score} exceeds maxPoints {}",
                a.max_points
            )));
        }
        Ok(())
    }

    pub fn set_grade(
        &mut self,
        student_id: &str,
        assignment_id: &str,
        score: f64,
    ) -> GradebookResult<GradeEntry> {
        if let Err(e) = self.check_grade(student_id, assignment_id, score) {
            warn!(student_id, assignment_id, error = %e, "grade rejected");
            return Err(e);
        }
        self.grades
            .entry(assignment_id.to_string())
            .or_default()
            .insert(student_id.to_string(), score);
        debug!(student_id, assignment_id, score, "grade set");
        Ok(GradeEntry {
            student_id: student_id.to_string(),
            assignment_id: assignment_id.to_string(),
            score,
        })
    }

    /// Applies every edit or none of them.
    pub fn set_grades(&mut self, edits: &[GradeEntry]) -> GradebookResult<usize> {
        for (i, e) in edits.iter().enumerate() {
            self.check_grade(&e.student_id, &e.assignment_id, e.score)
                .map_err(|err| match err {
                    GradebookError::Validation { message } => {
                        GradebookError::validation(format!("edit {i}: {message}"))
                    }
                    other => other,
                })?;
        }
        for e in edits {
            self.grades
                .entry(e.assignment_id.clone())
                .or_default()
                .insert(e.student_id.clone(), e.score);
        }
        debug!(count = edits.len(), "grades bulk set");
        Ok(edits.len())
    }

    /// Removes the entry if present. Absent entries are not an error.
    pub fn clear_grade(&mut self, student_id: &str, assignment_id: &str) -> bool {
        let Some(by_student) = self.grades.get_mut(assignment_id) else {
            return false;
        };
        let removed = by_student.remove(student_id).is_some();
        if by_student.is_empty() {
            self.grades.remove(assignment_id);
        }
        if removed {
            debug!(student_id, assignment_id, "grade cleared");
        }
        removed
    }
}
