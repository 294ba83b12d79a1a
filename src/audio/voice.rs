use super::effect::{Compressor, Effect, HighPass};

// Exponential glide from one value to another over a fixed number of frames, like an
// exponential ramp on an audio param. Runs out when the frames do.
#[derive(Clone, Copy, Debug)]
struct Ramp {
    value: f32,
    factor: f32,
    remaining: u32,
}

impl Ramp {
    fn new(from: f32, to: f32, secs: f32, sample_rate: f32) -> Self {
        let frames = (secs * sample_rate).round().max(1.0) as u32;
        Self {
            value: from,
            factor: (to / from).powf(1.0 / frames as f32),
            remaining: frames,
        }
    }

    fn next(&mut self) -> Option<f32> {
        if self.remaining == 0 {
            return None;
        }
        let v = self.value;
        self.value *= self.factor;
        self.remaining -= 1;
        Some(v)
    }
}

// sine with a pitch ramp; lives as long as its gain ramp
#[derive(Clone, Copy, Debug)]
struct Tone {
    phase: f32,
    freq: Ramp,
    gain: Ramp,
    inv_sample_rate: f32,
}

impl Tone {
    fn next(&mut self) -> Option<f32> {
        let gain = self.gain.next()?;
        let freq = self.freq.next().unwrap_or(self.freq.value);
        let out = gain * (std::f32::consts::TAU * self.phase).sin();
        self.phase = (self.phase + freq * self.inv_sample_rate).fract();
        Some(out)
    }
}

#[derive(Clone, Copy, Debug)]
struct NoiseBurst {
    pos: usize,
    filter: HighPass,
    gain: Ramp,
}

impl NoiseBurst {
    fn next(&mut self, noise: &[f32]) -> Option<f32> {
        let gain = self.gain.next()?;
        let raw = if noise.is_empty() { 0.0 } else { noise[self.pos % noise.len()] };
        self.pos += 1;
        Some(gain * self.filter.process(raw))
    }
}

/// One drum hit in flight. A hit is a tone, a noise burst, or both.
#[derive(Clone, Copy, Debug)]
pub struct Voice {
    tone: Option<Tone>,
    noise: Option<NoiseBurst>,
    comp: Option<Compressor>,
    pub active: bool,
}

impl Voice {
    pub fn silent() -> Self {
        Self {
            tone: None,
            noise: None,
            comp: None,
            active: false,
        }
    }

    fn tone(from_hz: f32, to_hz: f32, gain: f32, secs: f32, sr: f32) -> Tone {
        Tone {
            phase: 0.0,
            freq: Ramp::new(from_hz, to_hz, secs, sr),
            gain: Ramp::new(gain, 0.01, secs, sr),
            inv_sample_rate: 1.0 / sr,
        }
    }

    fn burst(cutoff: f32, gain: f32, secs: f32, sr: f32) -> NoiseBurst {
        NoiseBurst {
            pos: 0,
            filter: HighPass::new(cutoff, sr),
            gain: Ramp::new(gain, 0.01, secs, sr),
        }
    }

    // 100 -> 30 Hz drop into a compressor
    pub fn kick(sr: f32) -> Self {
        Self {
            tone: Some(Self::tone(100.0, 30.0, 1.0, 0.5, sr)),
            noise: None,
            comp: Some(Compressor::new(-10.0, 12.0)),
            active: true,
        }
    }

    pub fn snare(sr: f32) -> Self {
        Self {
            tone: Some(Self::tone(250.0, 250.0, 0.4, 0.1, sr)),
            noise: Some(Self::burst(1000.0, 0.8, 0.2, sr)),
            comp: None,
            active: true,
        }
    }

    pub fn hat(sr: f32) -> Self {
        Self {
            tone: None,
            noise: Some(Self::burst(6000.0, 0.3, 0.05, sr)),
            comp: None,
            active: true,
        }
    }

    pub fn next_sample(&mut self, noise: &[f32]) -> f32 {
        if !self.active {
            return 0.0;
        }
        let tone = self.tone.as_mut().and_then(Tone::next);
        let burst = self.noise.as_mut().and_then(|n| n.next(noise));
        if tone.is_none() && burst.is_none() {
            self.active = false;
            return 0.0;
        }

        let mut out = tone.unwrap_or(0.0) + burst.unwrap_or(0.0);
        if let Some(comp) = self.comp.as_mut() {
            out = comp.process(out);
        }
        out
    }
}
