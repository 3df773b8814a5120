use crate::record::SleepAnalysisRecord;

/// Mean of all scores, rounded half-up to the nearest integer; 0 for no records.
pub fn average_score(records: &[SleepAnalysisRecord]) -> i64 {
    if records.is_empty() {
        return 0;
    }
    // Scores are unbounded; the sum is taken in i128.
    let sum: i128 = records
        .iter()
        .map(|r| i128::from(r.analysis.sleep_score))
        .sum();
    let mean = sum as f64 / records.len() as f64;
    (mean + 0.5).floor() as i64
}

/// What the dashboard shows for a history (newest first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary<'a> {
    pub total: usize,
    pub average_score: i64,
    pub latest: Option<&'a SleepAnalysisRecord>,
    /// Every record except the latest, newest first.
    pub earlier: &'a [SleepAnalysisRecord],
}

impl<'a> DashboardSummary<'a> {
    pub fn new(history: &'a [SleepAnalysisRecord]) -> Self {
        let (latest, earlier) = match history.split_first() {
            Some((latest, rest)) => (Some(latest), rest),
            None => (None, &history[..0]),
        };
        Self {
            total: history.len(),
            average_score: average_score(history),
            latest,
            earlier,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
