//! Transformation batches and their quality grade.

use crate::provider::ProviderId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse completeness/consistency score attached to every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityGrade {
    Invalid,
    Low,
    Medium,
    High,
}

impl QualityGrade {
    /// Completeness ratio at or above which a batch without outliers is HIGH.
    pub const HIGH_THRESHOLD: f64 = 0.95;
    pub const MEDIUM_THRESHOLD: f64 = 0.80;
    pub const LOW_THRESHOLD: f64 = 0.50;

    /// Grades a batch from its completeness ratio and outlier count.
    ///
    /// An empty input has nothing to vouch for and grades INVALID.
    #[must_use]
    pub fn grade(rows_input: usize, rows_output: usize, outliers: usize) -> Self {
        if rows_input == 0 {
            return QualityGrade::Invalid;
        }
        let completeness = rows_output as f64 / rows_input as f64;

        if completeness >= Self::HIGH_THRESHOLD && outliers == 0 {
            QualityGrade::High
        } else if completeness >= Self::MEDIUM_THRESHOLD {
            QualityGrade::Medium
        } else if completeness >= Self::LOW_THRESHOLD {
            QualityGrade::Low
        } else {
            QualityGrade::Invalid
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::High => "HIGH",
            QualityGrade::Medium => "MEDIUM",
            QualityGrade::Low => "LOW",
            QualityGrade::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical records plus the statistics of the transformation that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationResult<T> {
    pub records: Vec<T>,
    pub provider: ProviderId,
    pub quality: QualityGrade,
    pub rows_input: usize,
    pub rows_output: usize,
    pub rows_dropped: usize,
    pub nulls_filled: usize,
    pub outliers_detected: usize,
    pub rows_repaired: usize,
    pub warnings: Vec<String>,
}

impl<T> TransformationResult<T> {
    /// Share of input rows that survived, in `[0, 1]`; zero for an empty input.
    #[must_use]
    pub fn completeness(&self) -> f64 {
        if self.rows_input == 0 {
            0.0
        } else {
            self.rows_output as f64 / self.rows_input as f64
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Statistics without the records, for sink metadata and logs.
    #[must_use]
    pub fn summary(&self) -> TransformSummary {
        TransformSummary {
            source_provider: self.provider,
            quality: self.quality,
            rows_input: self.rows_input,
            rows_output: self.rows_output,
            rows_dropped: self.rows_dropped,
            nulls_filled: self.nulls_filled,
            outliers_detected: self.outliers_detected,
            rows_repaired: self.rows_repaired,
            warnings: self.warnings.clone(),
        }
    }
}

/// Serializable transformation statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSummary {
    pub source_provider: ProviderId,
    pub quality: QualityGrade,
    pub rows_input: usize,
    pub rows_output: usize,
    pub rows_dropped: usize,
    pub nulls_filled: usize,
    pub outliers_detected: usize,
    #[serde(default)]
    pub rows_repaired: usize,
    #[serde(default)]
    pub warnings: Vec<String>,
}
