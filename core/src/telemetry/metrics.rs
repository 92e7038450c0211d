use std::sync::Mutex;

/// Counters collected while a target's tables are ingested.
pub struct IngestMetrics {
    inner: Mutex<Counts>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub files_read: usize,
    pub pairs_skipped: usize,
    pub detections: usize,
    pub limits: usize,
    pub non_finite: usize,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counts::default()),
        }
    }

    pub fn record_file(&self) {
        self.update(|counts| counts.files_read += 1);
    }

    pub fn record_skipped(&self) {
        self.update(|counts| counts.pairs_skipped += 1);
    }

    pub fn record_point(&self, is_limit: bool, finite: bool) {
        self.update(|counts| {
            if is_limit {
                counts.limits += 1;
            } else {
                counts.detections += 1;
            }
            if !finite {
                counts.non_finite += 1;
            }
        });
    }

    pub fn snapshot(&self) -> Counts {
        if let Ok(counts) = self.inner.lock() {
            *counts
        } else {
            Counts::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut Counts)) {
        if let Ok(mut counts) = self.inner.lock() {
            apply(&mut counts);
        }
    }
}

impl Default for IngestMetrics {
    fn default() -> Self {
        Self::new()
    }
}
