use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    /// "Last, First", the grade-table sort key.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    Homework,
    Quiz,
    Test,
    Project,
    Participation,
    ExtraCredit,
}

impl AssignmentType {
    pub const ALL: [AssignmentType; 6] = [
        AssignmentType::Homework,
        AssignmentType::Quiz,
        AssignmentType::Test,
        AssignmentType::Project,
        AssignmentType::Participation,
        AssignmentType::ExtraCredit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentType::Homework => "homework",
            AssignmentType::Quiz => "quiz",
            AssignmentType::Test => "test",
            AssignmentType::Project => "project",
            AssignmentType::Participation => "participation",
            AssignmentType::ExtraCredit => "extra_credit",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(t))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssignmentType,
    pub max_points: f64,
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Caller-supplied assignment fields. Required fields are optional here so a
/// missing one surfaces as a validation error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentSpec {
    pub title: Option<String>,
    pub kind: Option<AssignmentType>,
    pub max_points: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEntry {
    pub student_id: String,
    pub assignment_id: String,
    pub score: f64,
}
