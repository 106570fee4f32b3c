//! Squelch-gated transmission segmenter
//!
//! Consumes batches of mono samples together with the squelch gate signal
//! and emits at most one completed transmission per open-to-quiet cycle.
//! While the gate is closed a rolling pre-roll buffer retains the last
//! half-second of audio so the leading edge of a transmission is not lost;
//! after the gate closes, recording continues for the silence tail so
//! trailing speech is not clipped.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

/// Segmenter tuning
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Look-behind retained while the gate is closed
    pub pre_roll: Duration,
    /// Recording retained after the gate closes before the transmission is
    /// considered complete
    pub silence_tail: Duration,
    /// Gate-open spans shorter than this are discarded as noise
    pub min_duration: Duration,
    /// Recordings reaching this length are force-terminated
    pub max_duration: Duration,
    /// Capture sample rate in Hz
    pub sample_rate: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            pre_roll: Duration::from_millis(500),
            silence_tail: Duration::from_secs(1),
            min_duration: Duration::from_secs(1),
            max_duration: Duration::from_secs(60),
            sample_rate: 48_000,
        }
    }
}

/// A completed squelch-open-to-quiet recording
#[derive(Debug, Clone)]
pub struct RecordedTransmission {
    /// Mono samples at `sample_rate`
    pub samples: Vec<f32>,
    /// Capture sample rate in Hz, carried verbatim from the source
    pub sample_rate: u32,
    /// Wall-clock start of the recording (including pre-roll)
    pub started_at: DateTime<Utc>,
    /// Tuned frequency when the squelch opened, stamped by the coordinator
    pub frequency_hz: Option<u64>,
}

impl RecordedTransmission {
    /// Recording length in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Recording,
}

/// Squelch-gated segmenter state machine
pub struct Segmenter {
    config: SegmenterConfig,
    pre_roll_samples: usize,
    silence_tail_samples: usize,
    min_samples: usize,
    max_samples: usize,

    state: State,
    pre_roll: VecDeque<f32>,
    recording: Vec<f32>,
    /// Samples appended while the gate was open
    open_samples: usize,
    /// Consecutive gate-closed samples since the gate last closed
    silence_run: usize,
    started_at: Option<DateTime<Utc>>,
}

impl Segmenter {
    /// Create a segmenter for the configured sample rate
    pub fn new(config: SegmenterConfig) -> Self {
        let sr = config.sample_rate as f64;
        let to_samples = |d: Duration| (d.as_secs_f64() * sr) as usize;
        Self {
            pre_roll_samples: to_samples(config.pre_roll),
            silence_tail_samples: to_samples(config.silence_tail),
            min_samples: to_samples(config.min_duration),
            max_samples: to_samples(config.max_duration),
            config,
            state: State::Idle,
            pre_roll: VecDeque::new(),
            recording: Vec::new(),
            open_samples: 0,
            silence_run: 0,
            started_at: None,
        }
    }

    /// Return to Idle with empty buffers.
    ///
    /// The coordinator calls this on every fresh squelch-open edge so
    /// pre-roll audio swept up from the previous scan channel does not leak
    /// into the new transmission.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.pre_roll.clear();
        self.recording.clear();
        self.open_samples = 0;
        self.silence_run = 0;
        self.started_at = None;
    }

    /// True while a transmission is being recorded
    pub fn is_recording(&self) -> bool {
        self.state == State::Recording
    }

    /// Feed one batch of samples plus the current gate state.
    ///
    /// Returns a completed transmission when a silence tail elapses after
    /// speech, or when the recording hits the maximum duration.
    pub fn feed(&mut self, samples: &[f32], gate_open: bool) -> Option<RecordedTransmission> {
        match self.state {
            State::Idle => {
                if gate_open {
                    self.begin_recording(samples);
                    self.check_max()
                } else {
                    self.push_pre_roll(samples);
                    None
                }
            }
            State::Recording => {
                self.recording.extend_from_slice(samples);
                if gate_open {
                    self.open_samples += samples.len();
                    self.silence_run = 0;
                } else {
                    self.silence_run += samples.len();
                    if self.silence_run >= self.silence_tail_samples {
                        return self.finish(false);
                    }
                }
                self.check_max()
            }
        }
    }

    fn begin_recording(&mut self, samples: &[f32]) {
        let flushed = self.pre_roll.len();
        self.recording = Vec::with_capacity(flushed + samples.len());
        self.recording.extend(self.pre_roll.drain(..));
        self.recording.extend_from_slice(samples);
        self.open_samples = samples.len();
        self.silence_run = 0;
        self.state = State::Recording;

        let pre_roll_span = if self.config.sample_rate > 0 {
            chrono::Duration::milliseconds(
                (flushed as i64 * 1000) / self.config.sample_rate as i64,
            )
        } else {
            chrono::Duration::zero()
        };
        self.started_at = Some(Utc::now() - pre_roll_span);
        trace!(pre_roll = flushed, "squelch recording started");
    }

    fn push_pre_roll(&mut self, samples: &[f32]) {
        self.pre_roll.extend(samples.iter().copied());
        while self.pre_roll.len() > self.pre_roll_samples {
            self.pre_roll.pop_front();
        }
    }

    fn check_max(&mut self) -> Option<RecordedTransmission> {
        if self.recording.len() >= self.max_samples {
            self.recording.truncate(self.max_samples);
            self.finish(true)
        } else {
            None
        }
    }

    fn finish(&mut self, forced: bool) -> Option<RecordedTransmission> {
        let samples = std::mem::take(&mut self.recording);
        let open_samples = self.open_samples;
        let started_at = self.started_at.take().unwrap_or_else(Utc::now);

        self.state = State::Idle;
        self.open_samples = 0;
        self.silence_run = 0;
        self.pre_roll.clear();

        if !forced && open_samples < self.min_samples {
            debug!(
                open_samples,
                min = self.min_samples,
                "discarding short transmission"
            );
            return None;
        }

        Some(RecordedTransmission {
            samples,
            sample_rate: self.config.sample_rate,
            started_at,
            frequency_hz: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SR: u32 = 1_000; // 1 kHz keeps sample math readable
    const BATCH: usize = 50; // 50 ms batches

    fn test_config() -> SegmenterConfig {
        SegmenterConfig {
            pre_roll: Duration::from_millis(500),
            silence_tail: Duration::from_secs(1),
            min_duration: Duration::from_secs(1),
            max_duration: Duration::from_secs(60),
            sample_rate: SR,
        }
    }

    fn drive(
        seg: &mut Segmenter,
        batches: usize,
        gate_open: bool,
    ) -> Option<RecordedTransmission> {
        let batch = vec![0.25f32; BATCH];
        for _ in 0..batches {
            if let Some(t) = seg.feed(&batch, gate_open) {
                return Some(t);
            }
        }
        None
    }

    #[test]
    fn open_to_quiet_cycle_emits_once() {
        let mut seg = Segmenter::new(test_config());

        // Fill pre-roll, then a 2 s transmission, then silence.
        assert!(drive(&mut seg, 20, false).is_none());
        assert!(drive(&mut seg, 40, true).is_none());
        let t = drive(&mut seg, 40, false).expect("transmission after silence tail");

        // 0.5 s pre-roll + 2 s open + 1 s tail
        assert_eq!(t.samples.len(), 500 + 2_000 + 1_000);
        assert_eq!(t.sample_rate, SR);

        // The cycle is over; more silence emits nothing.
        assert!(drive(&mut seg, 40, false).is_none());
    }

    #[test]
    fn exactly_min_duration_is_emitted() {
        let mut seg = Segmenter::new(test_config());
        // Gate open for exactly min_duration (1 s = 20 batches).
        assert!(drive(&mut seg, 20, true).is_none());
        assert!(drive(&mut seg, 40, false).is_some());
    }

    #[test]
    fn one_sample_short_is_dropped() {
        let mut seg = Segmenter::new(test_config());
        // 19 full batches then one batch short by a sample: 999 open samples.
        assert!(drive(&mut seg, 19, true).is_none());
        assert!(seg.feed(&vec![0.25f32; BATCH - 1], true).is_none());
        assert!(drive(&mut seg, 40, false).is_none());
    }

    #[test]
    fn max_duration_force_emits_clamped() {
        let mut cfg = test_config();
        cfg.max_duration = Duration::from_secs(5);
        let mut seg = Segmenter::new(cfg);

        let t = drive(&mut seg, 200, true).expect("forced emit at max duration");
        assert_eq!(t.samples.len(), 5_000);
        assert!(!seg.is_recording());
    }

    #[test]
    fn gate_flicker_within_tail_is_one_transmission() {
        let mut seg = Segmenter::new(test_config());

        assert!(drive(&mut seg, 20, true).is_none());
        // Gate closes for half the tail, then reopens.
        assert!(drive(&mut seg, 10, false).is_none());
        assert!(drive(&mut seg, 20, true).is_none());
        let t = drive(&mut seg, 40, false).expect("single transmission");

        // Both open spans plus the closed gap plus the tail.
        assert_eq!(t.samples.len(), 1_000 + 500 + 1_000 + 1_000);
    }

    #[test]
    fn pre_roll_ring_retains_exactly_the_configured_span() {
        let mut seg = Segmenter::new(test_config());
        // Long idle: far more than pre_roll worth of closed-gate audio.
        assert!(drive(&mut seg, 200, false).is_none());
        assert_eq!(seg.pre_roll.len(), 500);
    }

    #[test]
    fn reset_clears_pre_roll_and_recording() {
        let mut seg = Segmenter::new(test_config());
        drive(&mut seg, 10, false);
        drive(&mut seg, 10, true);
        assert!(seg.is_recording());

        seg.reset();
        assert!(!seg.is_recording());
        assert_eq!(seg.pre_roll.len(), 0);

        // A fresh open edge after reset starts with no pre-roll.
        drive(&mut seg, 30, true);
        let t = drive(&mut seg, 40, false).unwrap();
        assert_eq!(t.samples.len(), 1_500 + 1_000);
    }

    proptest! {
        #[test]
        fn emitted_length_is_bounded_by_gate_span(
            idle_batches in 0usize..40,
            open_batches in 20usize..200,
        ) {
            let mut seg = Segmenter::new(test_config());
            drive(&mut seg, idle_batches, false);
            prop_assert!(drive(&mut seg, open_batches, true).is_none());
            let t = drive(&mut seg, 60, false).expect("one transmission");

            let gate_span = open_batches * BATCH;
            let pre = idle_batches.min(10) * BATCH; // capped at the 500-sample ring
            // Within one batch of [T + pre_roll, T + pre_roll + silence_tail]
            prop_assert!(t.samples.len() + BATCH >= gate_span + pre);
            prop_assert!(t.samples.len() <= gate_span + pre + 1_000 + BATCH);
        }
    }
}
