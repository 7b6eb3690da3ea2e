//! Static/dynamic interval detection on the specific-force triad.
//!
//! The detector first gathers `initial_static_samples` to estimate the base
//! noise level of the platform at rest. Afterwards every sample enters a
//! sliding window and is judged against thresholds scaled by that base level:
//!
//! - window std-dev norm above `threshold_factor * base` → moving
//! - distance of the sample from the window mean above
//!   `instantaneous_noise_level_factor * base` → moving
//!
//! Status changes are reported as [`IntervalEvent`]s, at most one per sample.

use std::collections::VecDeque;

use magcal_traits::{GeneratorStatus, IntervalClassifier, IntervalEvent, IntervalStats, Triad};

use crate::accumulator::RunningTriadStats;
use crate::config::DetectorCfg;

/// Reference [`IntervalClassifier`].
#[derive(Debug, Clone)]
pub struct StaticIntervalDetector {
    cfg: DetectorCfg,
    status: GeneratorStatus,
    base_noise_level: f64,
    init_stats: RunningTriadStats,
    // Statistics of the interval in progress (static or dynamic)
    interval_stats: RunningTriadStats,
    window: VecDeque<Triad>,
    processed: u64,
}

impl Default for StaticIntervalDetector {
    fn default() -> Self {
        Self::new(DetectorCfg::default())
    }
}

impl StaticIntervalDetector {
    pub fn new(cfg: DetectorCfg) -> Self {
        let window = VecDeque::with_capacity(cfg.window_size.max(1) + 1);
        Self {
            cfg,
            status: GeneratorStatus::Idle,
            base_noise_level: 0.0,
            init_stats: RunningTriadStats::new(),
            interval_stats: RunningTriadStats::new(),
            window,
            processed: 0,
        }
    }

    pub fn cfg(&self) -> &DetectorCfg {
        &self.cfg
    }

    pub fn processed_samples(&self) -> u64 {
        self.processed
    }

    /// Window std-dev norm above which a sample counts as moving.
    pub fn threshold(&self) -> f64 {
        self.cfg.threshold_factor * self.base_noise_level
    }

    /// Distance from the window mean above which a sample counts as moving.
    pub fn instantaneous_threshold(&self) -> f64 {
        self.cfg.instantaneous_noise_level_factor * self.base_noise_level
    }

    fn push_window(&mut self, t: Triad) {
        self.window.push_back(t);
        while self.window.len() > self.cfg.window_size.max(1) {
            self.window.pop_front();
        }
    }

    fn window_stats(&self) -> RunningTriadStats {
        let mut s = RunningTriadStats::new();
        for t in &self.window {
            s.push(*t);
        }
        s
    }

    fn finish_initialization(&mut self) -> IntervalEvent {
        let base = self.init_stats.std_dev_norm();
        self.base_noise_level = base;
        if base > self.cfg.base_noise_level_absolute_threshold {
            self.status = GeneratorStatus::Failed;
            tracing::warn!(
                base_noise_level = base,
                threshold = self.cfg.base_noise_level_absolute_threshold,
                "initialization failed: environment too noisy"
            );
            IntervalEvent::InitializationFailed {
                base_noise_level: base,
            }
        } else {
            self.status = GeneratorStatus::StaticInterval;
            // First static interval includes the initialization samples
            self.interval_stats = self.init_stats.clone();
            tracing::debug!(base_noise_level = base, "initialization completed");
            IntervalEvent::InitializationCompleted {
                base_noise_level: base,
            }
        }
    }

    fn is_moving(&self, t: Triad) -> bool {
        let w = self.window_stats();
        let window_std = w.std_dev_norm();
        let deviation = (t - w.mean()).norm();
        window_std > self.threshold() || deviation > self.instantaneous_threshold()
    }
}

impl IntervalClassifier for StaticIntervalDetector {
    fn process(
        &mut self,
        triad: Triad,
    ) -> Result<Option<IntervalEvent>, Box<dyn std::error::Error + Send + Sync>> {
        if !triad.is_finite() {
            return Err(format!("non-finite specific force triad: {triad:?}").into());
        }
        self.processed = self.processed.saturating_add(1);

        match self.status {
            GeneratorStatus::Failed => Ok(None),
            GeneratorStatus::Idle | GeneratorStatus::Initializing => {
                self.status = GeneratorStatus::Initializing;
                self.init_stats.push(triad);
                self.push_window(triad);
                if self.init_stats.len() >= self.cfg.initial_static_samples {
                    Ok(Some(self.finish_initialization()))
                } else {
                    Ok(None)
                }
            }
            GeneratorStatus::StaticInterval => {
                self.push_window(triad);
                if self.is_moving(triad) {
                    let stats = IntervalStats {
                        mean: self.interval_stats.mean(),
                        std_dev: self.interval_stats.std_dev(),
                        samples: self.interval_stats.len(),
                    };
                    self.status = GeneratorStatus::DynamicInterval;
                    self.interval_stats.clear();
                    self.interval_stats.push(triad);
                    tracing::debug!(static_samples = stats.samples, "dynamic interval detected");
                    Ok(Some(IntervalEvent::DynamicIntervalDetected { stats }))
                } else {
                    self.interval_stats.push(triad);
                    Ok(None)
                }
            }
            GeneratorStatus::DynamicInterval => {
                self.push_window(triad);
                if self.is_moving(triad) {
                    self.interval_stats.push(triad);
                    Ok(None)
                } else {
                    tracing::debug!(
                        dynamic_samples = self.interval_stats.len(),
                        "static interval detected"
                    );
                    self.status = GeneratorStatus::StaticInterval;
                    self.interval_stats.clear();
                    self.interval_stats.push(triad);
                    Ok(Some(IntervalEvent::StaticIntervalDetected))
                }
            }
        }
    }

    fn status(&self) -> GeneratorStatus {
        self.status
    }

    fn base_noise_level(&self) -> f64 {
        self.base_noise_level
    }

    fn reset(&mut self) {
        self.status = GeneratorStatus::Idle;
        self.base_noise_level = 0.0;
        self.init_stats.clear();
        self.interval_stats.clear();
        self.window.clear();
        self.processed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAVITY: Triad = Triad::new(0.0, 0.0, -9.81);

    fn noisy(i: usize, amp: f64) -> Triad {
        let k = i as f64;
        GRAVITY + Triad::new(
            amp * (0.9 * k).sin(),
            amp * (1.7 * k + 0.5).sin(),
            amp * (2.3 * k + 1.0).sin(),
        )
    }

    fn small_cfg() -> DetectorCfg {
        DetectorCfg {
            initial_static_samples: 20,
            window_size: 10,
            ..DetectorCfg::default()
        }
    }

    #[test]
    fn idle_until_first_sample() {
        let d = StaticIntervalDetector::default();
        assert_eq!(d.status(), GeneratorStatus::Idle);
        assert_eq!(d.base_noise_level(), 0.0);
    }

    #[test]
    fn completes_initialization_on_quiet_input() {
        let mut d = StaticIntervalDetector::new(small_cfg());
        for i in 0..19 {
            assert_eq!(d.process(noisy(i, 0.01)).unwrap(), None);
            assert_eq!(d.status(), GeneratorStatus::Initializing);
        }
        match d.process(noisy(19, 0.01)).unwrap() {
            Some(IntervalEvent::InitializationCompleted { base_noise_level }) => {
                assert!(base_noise_level > 0.0 && base_noise_level < 0.05);
            }
            other => panic!("expected InitializationCompleted, got {other:?}"),
        }
        assert_eq!(d.status(), GeneratorStatus::StaticInterval);
    }

    #[test]
    fn fails_initialization_when_too_noisy() {
        let mut d = StaticIntervalDetector::new(small_cfg());
        let mut last = None;
        for i in 0..20 {
            last = d.process(noisy(i, 5.0)).unwrap();
        }
        assert!(matches!(
            last,
            Some(IntervalEvent::InitializationFailed { .. })
        ));
        assert_eq!(d.status(), GeneratorStatus::Failed);
        // Terminal until reset
        assert_eq!(d.process(noisy(20, 0.0)).unwrap(), None);
        assert_eq!(d.status(), GeneratorStatus::Failed);
        d.reset();
        assert_eq!(d.status(), GeneratorStatus::Idle);
    }

    #[test]
    fn detects_dynamic_then_static_again() {
        let mut d = StaticIntervalDetector::new(small_cfg());
        for i in 0..40 {
            d.process(noisy(i, 0.01)).unwrap();
        }
        assert_eq!(d.status(), GeneratorStatus::StaticInterval);

        let kick = Triad::new(0.0, 3.0, 0.0);
        match d.process(noisy(40, 0.01) + kick).unwrap() {
            Some(IntervalEvent::DynamicIntervalDetected { stats }) => {
                // 20 initialization samples + 20 static ones
                assert_eq!(stats.samples, 40);
                assert!((stats.mean - GRAVITY).norm() < 0.01);
            }
            other => panic!("expected DynamicIntervalDetected, got {other:?}"),
        }
        for j in 1..10 {
            let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
            d.process(noisy(40 + j, 0.01) + kick.scale(sign)).unwrap();
            assert_eq!(d.status(), GeneratorStatus::DynamicInterval);
        }

        // Back at rest: static is reported once the window flushed
        let mut saw_static = false;
        for i in 50..80 {
            if let Some(ev) = d.process(noisy(i, 0.01)).unwrap() {
                assert_eq!(ev, IntervalEvent::StaticIntervalDetected);
                saw_static = true;
            }
        }
        assert!(saw_static);
        assert_eq!(d.status(), GeneratorStatus::StaticInterval);
    }

    #[test]
    fn rejects_non_finite_input() {
        let mut d = StaticIntervalDetector::default();
        assert!(d.process(Triad::new(f64::NAN, 0.0, 0.0)).is_err());
        assert_eq!(d.status(), GeneratorStatus::Idle);
    }
}
