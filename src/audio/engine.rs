use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio_api::{AudioCommand, HitType, TriggerParams};

use super::voice::Voice;

const MAX_VOICES: usize = 32; // hard caps so we never allocate in the audio callback
const MAX_PENDING: usize = 64;
const NOISE_SECONDS: f32 = 2.0;

pub struct Engine {
    sample_rate: f32,
    frame: u64, // next frame to render
    clock: Arc<AtomicU64>,
    noise: Vec<f32>,
    pending: Vec<TriggerParams>,
    voices: [Voice; MAX_VOICES],
}

impl Engine {
    pub fn new(sample_rate: u32, clock: Arc<AtomicU64>) -> Self {
        let noise_len = (sample_rate as f32 * NOISE_SECONDS) as usize;
        let noise = (0..noise_len).map(|_| fastrand::f32() * 2.0 - 1.0).collect();

        Self {
            sample_rate: sample_rate as f32,
            frame: clock.load(Ordering::Acquire),
            clock,
            noise,
            pending: Vec::with_capacity(MAX_PENDING),
            voices: [Voice::silent(); MAX_VOICES],
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Trigger(t) => {
                // a full book drops the hit rather than growing the vec
                if self.pending.len() < MAX_PENDING {
                    self.pending.push(t);
                }
            }
        }
    }

    /// Fill an interleaved buffer. Every channel gets the same mono drum bus.
    pub fn render_block(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            self.start_due(self.frame);
            let s = self.next_sample().clamp(-1.0, 1.0);
            frame.fill(s);
            self.frame += 1;
        }
        self.clock.store(self.frame, Ordering::Release);
    }

    // late triggers just start now
    fn start_due(&mut self, now: u64) {
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].at_frame <= now {
                let t = self.pending.swap_remove(i);
                self.trigger_voices(t.hit);
            } else {
                i += 1;
            }
        }
    }

    fn trigger_voices(&mut self, hit: HitType) {
        let v = hit.voices();
        if v.kick {
            self.spawn(Voice::kick(self.sample_rate));
        }
        if v.snare {
            self.spawn(Voice::snare(self.sample_rate));
        }
        if v.hat {
            self.spawn(Voice::hat(self.sample_rate));
        }
    }

    fn spawn(&mut self, voice: Voice) {
        // what slot do we write to? steal the first one if we're full
        let slot = self.voices.iter().position(|v| !v.active).unwrap_or(0);
        self.voices[slot] = voice;
    }

    fn next_sample(&mut self) -> f32 {
        let noise = &self.noise;
        self.voices
            .iter_mut()
            .filter(|v| v.active)
            .map(|v| v.next_sample(noise))
            .sum()
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
