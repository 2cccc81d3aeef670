//! Letter grading from real/fake prediction counts.
//!
//! The grade summarises the share of reviews classified as real:
//!
//! | real share | grade | colour  |
//! |------------|-------|---------|
//! | >= 80 %    | A     | green   |
//! | >= 60 %    | B     | blue    |
//! | >= 40 %    | C     | orange  |
//! | >= 20 %    | D     | red     |
//! | < 20 %     | F     | darkred |
//! | no reviews | No reviews | gray |
//!
//! Lower bounds are inclusive and are compared in integer arithmetic, so a
//! share of exactly 80 % is an A.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::review::Label;

/// Inclusive lower bounds (percent of real reviews), highest first.
const THRESHOLDS: &[(u64, Grade)] = &[
    (80, Grade::A),
    (60, Grade::B),
    (40, Grade::C),
    (20, Grade::D),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
    #[serde(rename = "No reviews")]
    NoReviews,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
            Self::NoReviews => "No reviews",
        }
    }

    /// Display-only colour tag for the grade badge.
    pub fn color(&self) -> &'static str {
        match self {
            Self::A => "green",
            Self::B => "blue",
            Self::C => "orange",
            Self::D => "red",
            Self::F => "darkred",
            Self::NoReviews => "gray",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map real/fake counts to a grade.
pub fn calculate_grade(real_count: u64, fake_count: u64) -> Grade {
    let total = real_count + fake_count;
    if total == 0 {
        return Grade::NoReviews;
    }
    THRESHOLDS
        .iter()
        .find(|(pct, _)| real_count * 100 >= pct * total)
        .map(|&(_, grade)| grade)
        .unwrap_or(Grade::F)
}

/// Outcome of grading one run's predictions. Built once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    pub real_count: u64,
    pub fake_count: u64,
    pub grade: Grade,
}

impl GradeResult {
    pub fn from_counts(real_count: u64, fake_count: u64) -> Self {
        Self {
            real_count,
            fake_count,
            grade: calculate_grade(real_count, fake_count),
        }
    }

    pub fn total(&self) -> u64 {
        self.real_count + self.fake_count
    }

    /// Percentage of reviews classified as real, or `None` with no reviews.
    pub fn real_pct(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.real_count as f64 / total as f64 * 100.0),
        }
    }

    pub fn color(&self) -> &'static str {
        self.grade.color()
    }
}

/// Tally labels and grade them.
pub fn grade<I>(labels: I) -> GradeResult
where
    I: IntoIterator,
    I::Item: Borrow<Label>,
{
    let (mut real, mut fake) = (0u64, 0u64);
    for label in labels {
        match *label.borrow() {
            Label::Real => real += 1,
            Label::Fake => fake += 1,
        }
    }
    GradeResult::from_counts(real, fake)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Fake, Real};

    fn labels(real: usize, fake: usize) -> Vec<Label> {
        let mut v = vec![Real; real];
        v.extend(std::iter::repeat_n(Fake, fake));
        v
    }

    #[test]
    fn counts_sum_to_sequence_length() {
        for (r, f) in [(0, 0), (1, 0), (0, 3), (7, 5), (16, 1)] {
            let seq = labels(r, f);
            let result = grade(&seq);
            assert_eq!(result.total() as usize, seq.len());
            assert_eq!(result.real_count as usize, r);
            assert_eq!(result.fake_count as usize, f);
        }
    }

    #[test]
    fn exactly_eighty_percent_is_an_a() {
        let result = grade(labels(8, 2));
        assert_eq!(result.grade, Grade::A);
        assert_eq!(result.color(), "green");
    }

    #[test]
    fn seventy_percent_is_a_b() {
        assert_eq!(grade(labels(7, 3)).grade, Grade::B);
    }

    #[test]
    fn thirty_percent_is_a_d() {
        let result = grade(labels(3, 7));
        assert_eq!(result.grade, Grade::D);
        assert_eq!(result.color(), "red");
    }

    #[test]
    fn empty_sequence_has_no_reviews_grade() {
        let result = grade(Vec::<Label>::new());
        assert_eq!(result.grade, Grade::NoReviews);
        assert_eq!(result.grade.as_str(), "No reviews");
        assert_eq!(result.color(), "gray");
        assert_eq!(result.real_pct(), None);
    }

    #[test]
    fn inclusive_lower_bounds() {
        assert_eq!(calculate_grade(3, 2), Grade::B); // 60 %
        assert_eq!(calculate_grade(2, 3), Grade::C); // 40 %
        assert_eq!(calculate_grade(1, 4), Grade::D); // 20 %
        assert_eq!(calculate_grade(1, 5), Grade::F); // 16.7 %
        assert_eq!(calculate_grade(0, 9), Grade::F);
        assert_eq!(calculate_grade(4, 0), Grade::A);
    }

    #[test]
    fn just_below_boundary_drops_a_grade() {
        // 79/100 real.
        assert_eq!(calculate_grade(79, 21), Grade::B);
        assert_eq!(calculate_grade(59, 41), Grade::C);
    }

    #[test]
    fn two_real_one_fake_is_a_b() {
        let result = grade([Real, Fake, Real]);
        assert_eq!(result.real_count, 2);
        assert_eq!(result.fake_count, 1);
        let pct = result.real_pct().unwrap();
        assert!((pct - 66.666).abs() < 0.01, "got {pct}");
        assert_eq!(result.grade, Grade::B);
        assert_eq!(result.color(), "blue");
    }

    #[test]
    fn grading_is_idempotent() {
        let seq = [Real, Fake, Fake, Real, Real];
        assert_eq!(grade(seq), grade(seq));
    }

    #[test]
    fn borrowed_and_owned_labels_grade_alike() {
        let seq = vec![Real, Real, Fake];
        let by_ref = grade(seq.iter());
        let by_value = grade(seq.into_iter());
        assert_eq!(by_ref, by_value);
        assert_eq!(by_ref.grade, Grade::B);
    }

    #[test]
    fn grade_result_json_shape() {
        let json = serde_json::to_value(GradeResult::from_counts(0, 0)).unwrap();
        assert_eq!(json["grade"], "No reviews");
        assert_eq!(json["real_count"], 0);
    }
}
