use sports_etl_core::{ProviderId, QualityGrade, TransformationResult};

/// Running diagnostics for one batch.
#[derive(Debug)]
pub(crate) struct Tally {
    entity: &'static str,
    provider: ProviderId,
    rows_input: usize,
    rows_dropped: usize,
    nulls_filled: usize,
    outliers: usize,
    repaired: usize,
    warnings: Vec<String>,
}

impl Tally {
    pub(crate) fn new(entity: &'static str, provider: ProviderId, rows_input: usize) -> Self {
        Self {
            entity,
            provider,
            rows_input,
            rows_dropped: 0,
            nulls_filled: 0,
            outliers: 0,
            repaired: 0,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn dropped(&mut self, row: usize, reason: &str) {
        self.rows_dropped += 1;
        let message = format!("row {row}: {reason}; dropped");
        tracing::warn!(entity = self.entity, provider = %self.provider, row, reason, "Dropping row");
        self.warnings.push(message);
    }

    pub(crate) fn filled(&mut self, count: usize) {
        self.nulls_filled += count;
    }

    pub(crate) fn outlier(&mut self, row: usize, detail: &str) {
        self.outliers += 1;
        tracing::warn!(entity = self.entity, provider = %self.provider, row, detail, "Outlier detected");
        self.warnings.push(format!("row {row}: {detail}"));
    }

    pub(crate) fn repaired(&mut self, row: usize, detail: &str) {
        self.repaired += 1;
        tracing::warn!(entity = self.entity, provider = %self.provider, row, detail, "Repaired row");
        self.warnings.push(format!("row {row}: {detail}"));
    }

    pub(crate) fn finish<T>(self, records: Vec<T>) -> TransformationResult<T> {
        let rows_output = records.len();
        let quality = QualityGrade::grade(self.rows_input, rows_output, self.outliers);

        tracing::info!(
            entity = self.entity,
            provider = %self.provider,
            rows_input = self.rows_input,
            rows_output,
            rows_dropped = self.rows_dropped,
            nulls_filled = self.nulls_filled,
            outliers = self.outliers,
            quality = %quality,
            "Transformed batch"
        );

        TransformationResult {
            records,
            provider: self.provider,
            quality,
            rows_input: self.rows_input,
            rows_output,
            rows_dropped: self.rows_dropped,
            nulls_filled: self.nulls_filled,
            outliers_detected: self.outliers,
            rows_repaired: self.repaired,
            warnings: self.warnings,
        }
    }
}
