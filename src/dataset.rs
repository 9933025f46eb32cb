use crate::error::{GradebookError, GradebookResult};
use crate::model::{Assignment, GradeEntry, Student};
use crate::store::GradeStore;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// On-disk shape of a grade-book dataset handed to the daemon.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub grades: Vec<GradeEntry>,
}

pub fn read_dataset(path: &Path) -> anyhow::Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.to_string_lossy()))?;
    let doc: Dataset = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse dataset {}", path.to_string_lossy()))?;
    Ok(doc)
}

fn dataset_err(section: &str, i: usize, e: GradebookError) -> GradebookError {
    GradebookError::Dataset {
        message: format!("{section}[{i}]: {e}"),
    }
}

/// Builds a fresh store, running every record through the same checks as
/// the mutation calls. Nothing is returned unless the whole dataset is valid.
pub fn build_store(doc: Dataset) -> GradebookResult<GradeStore> {
    let mut store = GradeStore::new();
    for (i, s) in doc.students.iter().enumerate() {
        store
            .add_student(Some(&s.id), &s.first_name, &s.last_name)
            .map_err(|e| dataset_err("students", i, e))?;
    }
    for (i, a) in doc.assignments.into_iter().enumerate() {
        store
            .insert_assignment(a)
            .map_err(|e| dataset_err("assignments", i, e))?;
    }
    for (i, g) in doc.grades.iter().enumerate() {
        store
            .set_grade(g.student_id.trim(), g.assignment_id.trim(), g.score)
            .map_err(|e| dataset_err("grades", i, e))?;
    }
    info!(
        students = store.students().len(),
        assignments = store.assignments().len(),
        grades = store.grade_count(),
        "dataset loaded"
    );
    Ok(store)
}
