use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bassgroove")]
#[command(about = "Bass fretboard trainer with a looping drum machine")]
pub struct Cli {
    /// Settings file (defaults to ./.bassgroove/settings.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Root note, e.g. E, F#, A
    #[arg(long)]
    pub key: Option<String>,

    /// Scale key, e.g. minor_pentatonic, dorian, blues
    #[arg(long)]
    pub scale: Option<String>,

    /// Drum pattern key, e.g. funk_jb, hiphop_90s, metronome
    #[arg(long)]
    pub pattern: Option<String>,

    /// Starting tempo, clamped to 40-240
    #[arg(long)]
    pub bpm: Option<i64>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl Cli {
    // command line wins over the settings file
    pub fn apply(&self, settings: &mut crate::pipeline::settings::Settings) {
        if let Some(k) = &self.key {
            settings.key = Some(k.clone());
        }
        if let Some(s) = &self.scale {
            settings.scale = Some(s.clone());
        }
        if let Some(p) = &self.pattern {
            settings.pattern = Some(p.clone());
        }
        if let Some(bpm) = self.bpm {
            settings.bpm = Some(bpm);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::settings::Settings;

    #[test]
    fn flags_override_the_file() {
        let cli = Cli::parse_from(["bassgroove", "--pattern", "metronome", "--bpm", "300"]);
        let mut s = Settings {
            key: Some("A".into()),
            pattern: Some("funk_jb".into()),
            ..Default::default()
        };
        cli.apply(&mut s);
        assert_eq!(s.key.as_deref(), Some("A"));
        assert_eq!(s.pattern.as_deref(), Some("metronome"));
        assert_eq!(s.bpm, Some(300));
    }

    #[test]
    fn no_flags_is_valid() {
        let cli = Cli::parse_from(["bassgroove"]);
        assert!(cli.config.is_none());
        assert!(cli.log.is_none());
    }
}
