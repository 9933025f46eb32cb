use crate::error::{GradebookError, GradebookResult};
use crate::model::{Assignment, AssignmentType, Student};
use crate::scoring::{grade_bucket, letter_grade, GradeBucket, LetterGrade};
use crate::store::GradeStore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// One-decimal rounding used for every percentage leaving the daemon:
/// `floor(10*x + 0.5) / 10`
pub fn round_off_1_decimal(x: f64) -> f64 {
    // Past 1e15 an f64 has no tenths left to round, and 10 * x may overflow.
    if !x.is_finite() || x.abs() >= 1e15 {
        return x;
    }
    ((10.0 * x) + 0.5).floor() / 10.0
}

fn round_opt(x: Option<f64>) -> Option<f64> {
    x.map(round_off_1_decimal)
}

pub fn percent(score: f64, max_points: f64) -> f64 {
    score / max_points * 100.0
}

/// Arithmetic mean, `None` when empty. Falls back to a running mean when the
/// plain sum overflows.
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        return Some(sum / n);
    }
    let mut m = 0.0_f64;
    for (k, x) in values.iter().enumerate() {
        m += (x - m) / ((k + 1) as f64);
    }
    Some(m)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryFilters {
    /// Restrict aggregation to these assignment types. `None` means all.
    #[serde(default)]
    pub types: Option<Vec<AssignmentType>>,
}

impl SummaryFilters {
    pub fn includes(&self, a: &Assignment) -> bool {
        self.types
            .as_ref()
            .map(|t| t.contains(&a.kind))
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CalcContext<'a> {
    pub store: &'a GradeStore,
    pub filters: &'a SummaryFilters,
}

impl<'a> CalcContext<'a> {
    pub fn new(store: &'a GradeStore, filters: &'a SummaryFilters) -> Self {
        Self { store, filters }
    }

    fn selected_assignments(&self) -> impl Iterator<Item = &'a Assignment> {
        let filters = self.filters;
        self.store
            .assignments()
            .iter()
            .filter(move |a| filters.includes(a))
    }
}

/// Resolves a roster selection. `None` is the whole roster in insertion
/// order; explicit ids are de-duplicated and must all exist.
pub fn resolve_roster<'a>(
    store: &'a GradeStore,
    student_ids: Option<&[String]>,
) -> GradebookResult<Vec<&'a Student>> {
    let Some(ids) = student_ids else {
        return Ok(store.students().iter().collect());
    };
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            continue;
        }
        let Some(s) = store.student(id) else {
            return Err(GradebookError::not_found("student", id.as_str()));
        };
        out.push(s);
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub student_id: String,
    pub display_name: String,
    pub average: Option<f64>,
    pub letter: Option<LetterGrade>,
    pub bucket: Option<GradeBucket>,
    pub graded_count: usize,
    pub missing_count: usize,
}

impl StudentResult {
    pub fn rounded(&self) -> Self {
        Self {
            average: round_opt(self.average),
            ..self.clone()
        }
    }
}

/// Unweighted mean of per-assignment percentages. Assignments with no entry
/// count toward neither side of the division.
fn mean_percent(ctx: &CalcContext<'_>, student_id: &str) -> (Option<f64>, usize, usize) {
    let mut percents = Vec::new();
    let mut missing = 0_usize;
    for a in ctx.selected_assignments() {
        match ctx.store.score(student_id, &a.id) {
            Some(score) => percents.push(percent(score, a.max_points)),
            None => missing += 1,
        }
    }
    (mean(&percents), percents.len(), missing)
}

pub fn student_average(ctx: &CalcContext<'_>, student_id: &str) -> GradebookResult<Option<f64>> {
    if ctx.store.student(student_id).is_none() {
        return Err(GradebookError::not_found("student", student_id));
    }
    Ok(mean_percent(ctx, student_id).0)
}

pub fn student_result(ctx: &CalcContext<'_>, student: &Student) -> StudentResult {
    let (average, graded_count, missing_count) = mean_percent(ctx, &student.id);
    StudentResult {
        student_id: student.id.clone(),
        display_name: student.display_name(),
        average,
        letter: average.map(letter_grade),
        bucket: average.map(grade_bucket),
        graded_count,
        missing_count,
    }
}

pub fn student_results(
    ctx: &CalcContext<'_>,
    student_ids: Option<&[String]>,
) -> GradebookResult<Vec<StudentResult>> {
    let roster = resolve_roster(ctx.store, student_ids)?;
    Ok(roster.into_iter().map(|s| student_result(ctx, s)).collect())
}

pub fn compute_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some(sorted[(n / 2) - 1] / 2.0 + sorted[n / 2] / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub graded_count: usize,
    pub roster_size: usize,
}

impl ClassStats {
    /// Statistics over already-defined averages.
    pub fn from_averages(averages: &[f64], roster_size: usize) -> Self {
        let graded_count = averages.len();
        let min = averages.iter().copied().reduce(f64::min);
        let max = averages.iter().copied().reduce(f64::max);
        Self {
            mean: mean(averages),
            median: compute_median(averages),
            min,
            max,
            graded_count,
            roster_size,
        }
    }

    pub fn rounded(&self) -> Self {
        Self {
            mean: round_opt(self.mean),
            median: round_opt(self.median),
            min: round_opt(self.min),
            max: round_opt(self.max),
            ..self.clone()
        }
    }
}

pub fn class_stats(
    ctx: &CalcContext<'_>,
    student_ids: Option<&[String]>,
) -> GradebookResult<ClassStats> {
    let rows = student_results(ctx, student_ids)?;
    let averages: Vec<f64> = rows.iter().filter_map(|r| r.average).collect();
    Ok(ClassStats::from_averages(&averages, rows.len()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBin {
    pub bucket: GradeBucket,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDistribution {
    pub bins: Vec<DistributionBin>,
    /// Denominator of every bin percentage.
    pub graded_count: usize,
    pub ungraded_count: usize,
}

impl GradeDistribution {
    /// Students without an average are counted as ungraded and never binned.
    pub fn from_averages(averages: &[Option<f64>]) -> Self {
        let graded: Vec<f64> = averages.iter().filter_map(|a| *a).collect();
        let graded_count = graded.len();
        let bins = GradeBucket::ALL
            .iter()
            .map(|&bucket| {
                let count = graded.iter().filter(|v| grade_bucket(**v) == bucket).count();
                let percentage = if graded_count > 0 {
                    100.0 * (count as f64) / (graded_count as f64)
                } else {
                    0.0
                };
                DistributionBin {
                    bucket,
                    count,
                    percentage,
                }
            })
            .collect();
        Self {
            bins,
            graded_count,
            ungraded_count: averages.len() - graded_count,
        }
    }

    pub fn rounded(&self) -> Self {
        Self {
            bins: self
                .bins
                .iter()
                .map(|b| DistributionBin {
                    percentage: round_off_1_decimal(b.percentage),
                    ..b.clone()
                })
                .collect(),
            ..self.clone()
        }
    }
}

pub fn grade_distribution(
    ctx: &CalcContext<'_>,
    student_ids: Option<&[String]>,
) -> GradebookResult<GradeDistribution> {
    let rows = student_results(ctx, student_ids)?;
    let averages: Vec<Option<f64>> = rows.iter().map(|r| r.average).collect();
    Ok(GradeDistribution::from_averages(&averages))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStats {
    pub assignment_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssignmentType,
    pub max_points: f64,
    pub average: Option<f64>,
    pub submission_count: usize,
    pub roster_size: usize,
    pub submission_rate: Option<f64>,
}

impl AssignmentStats {
    pub fn rounded(&self) -> Self {
        Self {
            average: round_opt(self.average),
            ..self.clone()
        }
    }
}

fn stats_for(store: &GradeStore, a: &Assignment, roster: &[&Student]) -> AssignmentStats {
    let percents: Vec<f64> = roster
        .iter()
        .filter_map(|s| store.score(&s.id, &a.id))
        .map(|score| percent(score, a.max_points))
        .collect();
    let submission_count = percents.len();
    let average = mean(&percents);
    let roster_size = roster.len();
    let submission_rate = if roster_size > 0 {
        Some((submission_count as f64) / (roster_size as f64))
    } else {
        None
    };
    AssignmentStats {
        assignment_id: a.id.clone(),
        title: a.title.clone(),
        kind: a.kind,
        max_points: a.max_points,
        average,
        submission_count,
        roster_size,
        submission_rate,
    }
}

pub fn assignment_stats(
    store: &GradeStore,
    assignment_id: &str,
    student_ids: Option<&[String]>,
) -> GradebookResult<AssignmentStats> {
    let Some(a) = store.assignment(assignment_id) else {
        return Err(GradebookError::not_found("assignment", assignment_id));
    };
    let roster = resolve_roster(store, student_ids)?;
    Ok(stats_for(store, a, &roster))
}

pub fn all_assignment_stats(
    ctx: &CalcContext<'_>,
    student_ids: Option<&[String]>,
) -> GradebookResult<Vec<AssignmentStats>> {
    let roster = resolve_roster(ctx.store, student_ids)?;
    Ok(ctx
        .selected_assignments()
        .map(|a| stats_for(ctx.store, a, &roster))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowSortBy {
    Roster,
    Name,
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDir {
    Asc,
    Desc,
}

/// Orders grade-table rows. Rows without an average always sort last; ties
/// keep roster order.
pub fn sort_rows(rows: &mut [StudentResult], by: RowSortBy, dir: SortDir, roster: &[&Student]) {
    if by == RowSortBy::Roster {
        if dir == SortDir::Desc {
            rows.reverse();
        }
        return;
    }
    let names: HashMap<&str, (String, String)> = roster
        .iter()
        .map(|s| {
            (
                s.id.as_str(),
                (s.last_name.to_lowercase(), s.first_name.to_lowercase()),
            )
        })
        .collect();
    let no_name = (String::new(), String::new());
    let name_key = |id: &str| names.get(id).unwrap_or(&no_name);
    rows.sort_by(|a, b| {
        let ord = match by {
            RowSortBy::Name => name_key(&a.student_id).cmp(&name_key(&b.student_id)),
            RowSortBy::Average => match (a.average, b.average) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            RowSortBy::Roster => Ordering::Equal,
        };
        match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub filters: SummaryFilters,
    pub stats: ClassStats,
    pub distribution: GradeDistribution,
    pub per_assignment: Vec<AssignmentStats>,
    pub per_student: Vec<StudentResult>,
}

impl ClassSummary {
    pub fn rounded(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            stats: self.stats.rounded(),
            distribution: self.distribution.rounded(),
            per_assignment: self.per_assignment.iter().map(|a| a.rounded()).collect(),
            per_student: self.per_student.iter().map(|s| s.rounded()).collect(),
        }
    }
}

/// Every class-level aggregate from a single pass over the roster.
pub fn compute_class_summary(
    ctx: &CalcContext<'_>,
    student_ids: Option<&[String]>,
) -> GradebookResult<ClassSummary> {
    let per_student = student_results(ctx, student_ids)?;
    let averages: Vec<Option<f64>> = per_student.iter().map(|r| r.average).collect();
    let defined: Vec<f64> = averages.iter().filter_map(|a| *a).collect();
    Ok(ClassSummary {
        filters: ctx.filters.clone(),
        stats: ClassStats::from_averages(&defined, per_student.len()),
        distribution: GradeDistribution::from_averages(&averages),
        per_assignment: all_assignment_stats(ctx, student_ids)?,
        per_student,
    })
}
