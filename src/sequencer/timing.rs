use std::time::Duration;

use crate::error::GrooveError;
use crate::shared::{MAX_BPM, MIN_BPM};

/// Tuning for the two loops. The schedule-ahead window has to outlast the
/// timer interval or a late tick leaves a hole in the audio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub lookahead: Duration,
    pub schedule_ahead: f64,
    pub display_tolerance: f64,
    pub start_offset: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            lookahead: Duration::from_millis(25),
            schedule_ahead: 0.1,
            display_tolerance: 0.02,
            start_offset: 0.05,
        }
    }
}

impl Timing {
    pub fn validate(self) -> Result<Self, GrooveError> {
        if self.lookahead.is_zero() {
            return Err(GrooveError::InvalidTiming("lookahead must be positive".into()));
        }
        if self.schedule_ahead <= self.lookahead.as_secs_f64() {
            return Err(GrooveError::InvalidTiming(format!(
                "schedule-ahead window ({:.3}s) must be longer than the lookahead interval ({:.3}s)",
                self.schedule_ahead,
                self.lookahead.as_secs_f64()
            )));
        }
        if self.display_tolerance <= 0.0 || self.start_offset <= 0.0 {
            return Err(GrooveError::InvalidTiming(
                "display tolerance and start offset must be positive".into(),
            ));
        }
        Ok(self)
    }
}

pub fn clamp_bpm(bpm: i64) -> u32 {
    bpm.clamp(MIN_BPM as i64, MAX_BPM as i64) as u32
}

// Typed-in tempo is committed, never refused: junk falls to the floor.
pub fn parse_bpm(text: &str) -> u32 {
    match text.trim().parse::<i64>() {
        Ok(bpm) => clamp_bpm(bpm),
        Err(_) => MIN_BPM,
    }
}

// one 16th note: a quarter of a beat
pub fn seconds_per_step(bpm: u32) -> f64 {
    60.0 / bpm as f64 / 4.0
}
