// Small per-voice DSP blocks. Everything works one sample at a time so voices can start mid-block.

pub trait Effect: Send {
    fn process(&mut self, x: f32) -> f32;
}

// Static compressor, no attack/release. Tames the kick's transient the way a hard knee would.
#[derive(Clone, Copy, Debug)]
pub struct Compressor {
    threshold: f32, // linear
    ratio: f32,
}

impl Compressor {
    pub fn new(threshold_db: f32, ratio: f32) -> Self {
        Self {
            threshold: 10.0_f32.powf(threshold_db / 20.0),
            ratio: ratio.max(1.0),
        }
    }
}

impl Effect for Compressor {
    fn process(&mut self, x: f32) -> f32 {
        let level = x.abs();
        if level <= self.threshold {
            return x;
        }
        let squashed = self.threshold + (level - self.threshold) / self.ratio;
        squashed.copysign(x)
    }
}

// RBJ cookbook high-pass, direct form 1
#[derive(Clone, Copy, Debug)]
pub struct HighPass {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl HighPass {
    pub fn new(cutoff: f32, sample_rate: f32) -> Self {
        let q = std::f32::consts::FRAC_1_SQRT_2;
        let w0 = std::f32::consts::TAU * cutoff.min(sample_rate * 0.45) / sample_rate;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 + cos) / 2.0) / a0,
            b1: (-(1.0 + cos)) / a0,
            b2: ((1.0 + cos) / 2.0) / a0,
            a1: (-2.0 * cos) / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }
}

impl Effect for HighPass {
    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2 - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}
