//! Buffer stats exposed to the Room Coordinator's stats snapshots (§4.2, §4.5).

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BufferStats {
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub completed: u64,
    pub failed: u64,
    pub dropped: u64,
    pub pending: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StatsAccumulator {
    latencies_ms: Vec<u64>,
    completed: u64,
    failed: u64,
    dropped: u64,
}

impl StatsAccumulator {
    pub fn record_completed(&mut self, latency_ms: u64) {
        self.completed += 1;
        self.latencies_ms.push(latency_ms);
        if self.latencies_ms.len() > 1000 {
            self.latencies_ms.remove(0);
        }
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    pub fn record_dropped(&mut self) {
        self.dropped += 1;
    }

    pub fn snapshot(&self, pending: usize) -> BufferStats {
        let mut sorted = self.latencies_ms.clone();
        sorted.sort_unstable();
        let avg = if sorted.is_empty() {
            0.0
        } else {
            sorted.iter().sum::<u64>() as f64 / sorted.len() as f64
        };
        let p95 = percentile(&sorted, 0.95);
        BufferStats {
            avg_latency_ms: avg,
            p95_latency_ms: p95,
            completed: self.completed,
            failed: self.failed,
            dropped: self.dropped,
            pending,
        }
    }
}

fn percentile(sorted: &[u64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)] as f64
}
