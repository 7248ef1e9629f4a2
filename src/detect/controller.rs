//! Request resolution: counter reconciliation and the bounded retry loop.
//!
//! Each attempt captures one frame and classifies tint and pattern match
//! from that same frame. A match resolves immediately with that attempt's
//! tint; exhausting the attempt budget resolves as not found. Capture or
//! scoring failures consume the whole request (logged, resolved not found)
//! rather than aborting the daemon.

use std::time::Duration;

use crate::counter::CounterStore;
use crate::device::DetectionRequest;
use crate::frame::{MeanColor, RegionSpec};
use crate::ingest::FrameSource;

use super::{DetectionOutcome, PatternMatcher, TintCategory};

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub settle: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            settle: Duration::from_millis(200),
        }
    }
}

/// Terminal record of one request.
#[derive(Clone, Copy, Debug)]
pub struct Resolution {
    pub outcome: DetectionOutcome,
    /// Tint of the resolving attempt (last attempt when nothing matched).
    pub tint: TintCategory,
    /// Mean region color of that same attempt.
    pub mean: MeanColor,
    /// Best correlation score seen across all attempts.
    pub best_score: f64,
    pub attempts: u32,
    /// Counter value after reconciliation, as reported to the device.
    pub counter: u64,
}

pub struct DetectionController {
    store: CounterStore,
    counter: u64,
    matcher: PatternMatcher,
    region: RegionSpec,
    policy: RetryPolicy,
}

impl DetectionController {
    pub fn new(
        store: CounterStore,
        matcher: PatternMatcher,
        region: RegionSpec,
        policy: RetryPolicy,
    ) -> Self {
        let counter = store.read();
        Self {
            store,
            counter,
            matcher,
            region,
            policy,
        }
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Advance the counter for a new request: increment, then let a larger
    /// device-side count win. One persisted write per request.
    fn reconcile_counter(&mut self, request: &DetectionRequest) {
        self.counter += 1;
        if let Some(hint) = request.counter_hint {
            if hint > self.counter {
                log::info!("device counter {hint} ahead of local {}, adopting", self.counter);
                self.counter = hint;
            }
        }
        if let Err(e) = self.store.write(self.counter) {
            log::error!("cannot persist counter {}: {e:#}", self.counter);
        }
    }

    /// Run one request to resolution. Never fails: anything that prevents a
    /// confirmed match resolves as not found.
    pub fn resolve(
        &mut self,
        request: &DetectionRequest,
        source: &mut dyn FrameSource,
    ) -> Resolution {
        self.reconcile_counter(request);
        log::info!("attempt #{}: scanning", self.counter);

        let mut best_score = f64::NEG_INFINITY;
        let mut last_tint = TintCategory::default();
        let mut last_mean = MeanColor::default();

        for attempt in 1..=self.policy.max_attempts {
            if !self.policy.settle.is_zero() {
                std::thread::sleep(self.policy.settle);
            }

            let region = match source
                .next_frame()
                .and_then(|frame| frame.region(&self.region).map_err(Into::into))
            {
                Ok(region) => region,
                Err(e) => {
                    log::error!("capture failed on try {attempt}: {e:#}");
                    return self.resolution(
                        DetectionOutcome::NotFound,
                        last_tint,
                        last_mean,
                        best_score.max(0.0),
                        attempt,
                    );
                }
            };

            let mean = region.mean_color();
            let tint = TintCategory::classify(mean);
            last_tint = tint;
            last_mean = mean;

            let (matched, score) = match self.matcher.matches(&region.to_gray()) {
                Ok(result) => result,
                Err(e) => {
                    log::error!("scoring failed on try {attempt}: {e}");
                    return self.resolution(
                        DetectionOutcome::NotFound,
                        tint,
                        mean,
                        best_score.max(0.0),
                        attempt,
                    );
                }
            };
            if score > best_score {
                best_score = score;
            }
            log::info!(
                "try {attempt}/{}: tint {tint}, score {score:.3} ({})",
                self.policy.max_attempts,
                mean.inspect_url()
            );

            if matched {
                return self.resolution(
                    DetectionOutcome::from_match(tint),
                    tint,
                    mean,
                    best_score,
                    attempt,
                );
            }
        }

        self.resolution(
            DetectionOutcome::NotFound,
            last_tint,
            last_mean,
            best_score,
            self.policy.max_attempts,
        )
    }

    fn resolution(
        &self,
        outcome: DetectionOutcome,
        tint: TintCategory,
        mean: MeanColor,
        best_score: f64,
        attempts: u32,
    ) -> Resolution {
        log::info!(
            "resolved {:?} after {attempts} tries (best score {best_score:.3}, counter {})",
            outcome,
            self.counter
        );
        Resolution {
            outcome,
            tint,
            mean,
            best_score,
            attempts,
            counter: self.counter,
        }
    }
}
