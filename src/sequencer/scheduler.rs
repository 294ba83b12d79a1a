// Lookahead scheduler. Timers on the UI thread are only good to a few milliseconds, so we
// never fire a hit from a timer. Each tick instead books every step that falls inside the
// next window against the audio clock, and the audio thread starts it on the exact frame.

use crate::audio_api::AudioSink;
use crate::pipeline::patterns::Pattern;
use crate::shared::STEPS_PER_PATTERN;

use super::timing::seconds_per_step;
use super::visual_queue::{VisualEvent, VisualQueue};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scheduler {
    cursor: usize,
    next_time: f64,
    last_booked: Option<f64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, start_time: f64) {
        self.cursor = 0;
        self.next_time = start_time;
        self.last_booked = None;
    }

    /// The next step that will be booked.
    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub fn next_time(&self) -> f64 {
        self.next_time
    }

    /// Re-derive the pending step's time from the last booked one, so a tempo change lands
    /// on the very next step. Steps already booked keep their times.
    pub fn retime(&mut self, bpm: u32) {
        if let Some(last) = self.last_booked {
            self.next_time = last + seconds_per_step(bpm);
        }
    }

    /// Book every step whose time is before `now + window`. Rests still get a visual event.
    /// Returns how many steps were booked.
    pub fn fill<S: AudioSink + ?Sized>(
        &mut self,
        now: f64,
        window: f64,
        pattern: &Pattern,
        bpm: u32,
        sink: &mut S,
        queue: &mut VisualQueue,
    ) -> usize {
        let mut booked = 0;
        while self.next_time < now + window {
            let hit = pattern.hit(self.cursor);
            if !hit.is_rest() {
                sink.trigger(hit, self.next_time);
            }
            queue.push(VisualEvent {
                step: self.cursor,
                audio_time: self.next_time,
            });

            self.last_booked = Some(self.next_time);
            self.next_time += seconds_per_step(bpm);
            self.cursor = (self.cursor + 1) % STEPS_PER_PATTERN;
            booked += 1;
        }
        booked
    }
}
