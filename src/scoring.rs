use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    D,
    F,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GradeBucket {
    A,
    B,
    C,
    D,
    F,
}

impl GradeBucket {
    pub const ALL: [GradeBucket; 5] = [
        GradeBucket::A,
        GradeBucket::B,
        GradeBucket::C,
        GradeBucket::D,
        GradeBucket::F,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GradeBucket::A => "A",
            GradeBucket::B => "B",
            GradeBucket::C => "C",
            GradeBucket::D => "D",
            GradeBucket::F => "F",
        }
    }
}

/// Inclusive lower bounds, highest band first.
const LETTER_THRESHOLDS: [(f64, LetterGrade); 11] = [
    (97.0, LetterGrade::APlus),
    (93.0, LetterGrade::A),
    (90.0, LetterGrade::AMinus),
    (87.0, LetterGrade::BPlus),
    (83.0, LetterGrade::B),
    (80.0, LetterGrade::BMinus),
    (77.0, LetterGrade::CPlus),
    (73.0, LetterGrade::C),
    (70.0, LetterGrade::CMinus),
    (67.0, LetterGrade::DPlus),
    (65.0, LetterGrade::D),
];

const BUCKET_THRESHOLDS: [(f64, GradeBucket); 4] = [
    (90.0, GradeBucket::A),
    (80.0, GradeBucket::B),
    (70.0, GradeBucket::C),
    (60.0, GradeBucket::D),
];

/// Maps a percentage to its letter band.
///
/// Total over every `f64`: values above 100 (extra credit) land in `A+`,
/// negatives and NaN fall through to `F`.
pub fn letter_grade(percentage: f64) -> LetterGrade {
    LETTER_THRESHOLDS
        .iter()
        .find(|(min, _)| percentage >= *min)
        .map(|(_, g)| *g)
        .unwrap_or(LetterGrade::F)
}

/// Coarse A–F bucket used for the class distribution (90/80/70/60).
pub fn grade_bucket(percentage: f64) -> GradeBucket {
    BUCKET_THRESHOLDS
        .iter()
        .find(|(min, _)| percentage >= *min)
        .map(|(_, b)| *b)
        .unwrap_or(GradeBucket::F)
}
