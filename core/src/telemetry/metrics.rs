use std::sync::Mutex;

/// Counters for one pass of a driver over many tracks.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub predictions: usize,
    pub declined: usize,
    pub segments: usize,
}

#[derive(Default)]
struct Metrics {
    predictions: usize,
    declined: usize,
    segments: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_prediction(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.predictions += 1;
        }
    }

    pub fn record_declined(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.declined += 1;
        }
    }

    pub fn record_segments(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.segments += count;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                predictions: metrics.predictions,
                declined: metrics.declined,
                segments: metrics.segments,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
