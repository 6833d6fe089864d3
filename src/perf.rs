use std::time::{Duration, Instant};

/// 性能统计 Guard：drop 时记录 elapsed_ms
///
/// 使用方式：
/// ```ignore
/// let _perf = measurement_importer::perf::PerfGuard::new("import_from_csv");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            "done"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_guard_elapsed_monotonic() {
        let guard = PerfGuard::new("unit");
        let first = guard.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        assert!(guard.elapsed() > first);
    }
}
