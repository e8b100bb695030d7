use hdrhistogram::{CreationError, Histogram};

/// Longest latency tracked exactly; slower samples are clamped to it.
const MAX_TRACKED_LATENCY_MS: u64 = 3_600_000;

#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram bounds are rejected.
    pub fn new() -> Result<Self, CreationError> {
        let hist = Histogram::<u64>::new_with_bounds(1, MAX_TRACKED_LATENCY_MS, 3)?;
        Ok(Self { hist })
    }

    pub fn record(&mut self, latency_ms: u64) {
        self.hist.saturating_record(latency_ms.max(1));
    }

    #[must_use]
    pub fn percentiles(&self) -> (u64, u64, u64) {
        if self.count() == 0 {
            return (0, 0, 0);
        }

        (
            self.hist.value_at_quantile(0.5),
            self.hist.value_at_quantile(0.9),
            self.hist.value_at_quantile(0.99),
        )
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}
