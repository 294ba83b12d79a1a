// The seam between the sequencer and whatever actually makes sound.

pub use crate::pipeline::patterns::HitType;

/// Monotonic seconds owned by the audio backend.
pub trait AudioClock {
    fn now(&self) -> f64;
}

/// Fire-and-forget: the hit must begin at `at` on the same clock `AudioClock::now` reads.
pub trait AudioSink {
    fn trigger(&mut self, hit: HitType, at: f64);
}

/// An open backend session: a clock, a sink, and a way to wake it back up.
pub trait AudioSession: AudioClock + AudioSink {
    fn resume(&mut self) -> anyhow::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerParams {
    pub hit: HitType,
    pub at_frame: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCommand {
    // start this hit on exactly this output frame
    Trigger(TriggerParams),
}
