//! Batch counters and the report returned by `Pipeline::process_all`.

use serde::Serialize;

use super::result::ProcessingResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingStatistics {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl ProcessingStatistics {
    /// Counts one finalized clip.
    pub fn record(&mut self, result: &ProcessingResult) {
        self.total += 1;
        if result.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Percentage of successful clips, 0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }

    /// Success rate rounded to one decimal.
    pub fn success_rate_rounded(&self) -> f64 {
        (self.success_rate() * 10.0).round() / 10.0
    }
}

/// Results of a batch in processing order, with the counters at its end.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub results: Vec<ProcessingResult>,
    pub statistics: ProcessingStatistics,
    /// Set when cancellation stopped the batch before every clip ran.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.statistics.failed > 0
    }

    pub fn successful(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn total_frames(&self) -> usize {
        self.successful().map(|r| r.frame_paths.len()).sum()
    }

    pub fn flagged(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| r.flagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_handles_empty_and_rounds() {
        let mut stats = ProcessingStatistics::default();
        assert_eq!(stats.success_rate(), 0.0);

        stats.total = 3;
        stats.successful = 2;
        stats.failed = 1;
        assert_eq!(stats.success_rate_rounded(), 66.7);

        stats.reset();
        assert_eq!(stats, ProcessingStatistics::default());
    }
}
