use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::{AudioClock, AudioCommand, AudioSession, AudioSink, HitType, TriggerParams};

mod effect;
mod engine;
mod voice;

use engine::Engine;

/// The open output stream plus the two ends the sequencer talks to: a command
/// channel into the callback and the frame counter that backs the audio clock.
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    frames: Arc<AtomicU64>,
    sample_rate: f64,
    stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        // full channel means the callback is stalled; dropping a hit beats blocking the UI
        let _ = self.tx.try_send(cmd);
    }
}

impl AudioClock for AudioHandle {
    fn now(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate
    }
}

impl AudioSink for AudioHandle {
    fn trigger(&mut self, hit: HitType, at: f64) {
        let at_frame = (at.max(0.0) * self.sample_rate).round() as u64;
        self.send(AudioCommand::Trigger(TriggerParams { hit, at_frame }));
    }
}

impl AudioSession for AudioHandle {
    fn resume(&mut self) -> anyhow::Result<()> {
        self.stream.play().context("failed to resume output stream")
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;
    let frames = Arc::new(AtomicU64::new(0));

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let stream = build_output_stream_f32(
                &device,
                &config.into(),
                rx,
                Engine::new(sample_rate, frames.clone()),
                channels,
            )?;
            stream.play().context("failed to play output stream")?;
            tracing::info!(sample_rate, channels, "output stream running");

            Ok(AudioHandle {
                tx,
                frames,
                sample_rate: sample_rate as f64,
                stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    mut engine: Engine,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let err_fn = |err| tracing::error!("audio output stream error: {err}");

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info| {
                while let Ok(cmd) = rx.try_recv() {
                    engine.handle_cmd(cmd);
                }
                engine.render_block(data, channels);
            },
            err_fn,
            None,
        )
        .context("failed to build output stream")?;

    Ok(stream)
}
