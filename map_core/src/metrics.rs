use serde::Serialize;

/// Running counters for the sync controller.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SyncMetrics {
    pub cycles: u64,
    pub successes: u64,
    pub failures: u64,
    pub demo_fallbacks: u64,
    /// Failures since the last success.
    pub consecutive_failures: u64,
    pub last_record_count: usize,
    pub last_skipped_rows: usize,
}

impl SyncMetrics {
    pub fn record_start(&mut self) {
        self.cycles += 1;
    }

    pub fn record_success(&mut self, records: usize, skipped: usize) {
        self.successes += 1;
        self.consecutive_failures = 0;
        self.last_record_count = records;
        self.last_skipped_rows = skipped;
    }

    pub fn record_failure(&mut self, fell_back_to_demo: bool) {
        self.failures += 1;
        self.consecutive_failures += 1;
        if fell_back_to_demo {
            self.demo_fallbacks += 1;
        }
    }
}
