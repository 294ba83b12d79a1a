// Read once on startup; nothing is ever written back.
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::GrooveError;
use crate::pipeline::patterns::PatternId;
use crate::pipeline::theory::{Key, Note, ScaleKind};
use crate::sequencer::Timing;

const BASSGROOVE_DIR: &str = ".bassgroove";
const SETTINGS_FILE: &str = "settings.json";

// <dir>/.bassgroove/settings.json
pub fn settings_file_path(dir: &Path) -> PathBuf {
    dir.join(BASSGROOVE_DIR).join(SETTINGS_FILE)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub key: Option<String>,
    pub scale: Option<String>,
    pub pattern: Option<String>,
    pub bpm: Option<i64>, // clamped later, like anything typed into the bpm field
    pub timing: TimingSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub lookahead_ms: u64,
    pub schedule_ahead_ms: u64,
    pub display_tolerance_ms: u64,
    pub start_offset_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            lookahead_ms: 25,
            schedule_ahead_ms: 100,
            display_tolerance_ms: 20,
            start_offset_ms: 50,
        }
    }
}

impl TimingSettings {
    pub fn to_timing(&self) -> Result<Timing, GrooveError> {
        Timing {
            lookahead: Duration::from_millis(self.lookahead_ms),
            schedule_ahead: self.schedule_ahead_ms as f64 / 1000.0,
            display_tolerance: self.display_tolerance_ms as f64 / 1000.0,
            start_offset: self.start_offset_ms as f64 / 1000.0,
        }
        .validate()
    }
}

impl Settings {
    pub fn resolve_key(&self) -> Result<Key, GrooveError> {
        let root = match &self.key {
            Some(k) => k.parse::<Note>()?,
            None => Note::default(),
        };
        let scale = match &self.scale {
            Some(s) => s.parse::<ScaleKind>()?,
            None => ScaleKind::default(),
        };
        Ok(Key::new(root, scale))
    }

    pub fn resolve_pattern(&self) -> Result<PatternId, GrooveError> {
        match &self.pattern {
            Some(p) => p.parse(),
            None => Ok(PatternId::default()),
        }
    }

    // no explicit bpm means the pattern's own tempo
    pub fn resolve_bpm(&self, pattern: PatternId) -> i64 {
        self.bpm.unwrap_or(pattern.pattern().bpm as i64)
    }
}

// A missing file is fine and means defaults. A file that's there but broken is an error.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::info!(path = %path.display(), "settings loaded");
    Ok(settings)
}
