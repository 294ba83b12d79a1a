mod audio;
mod audio_api;
mod cli;
mod error;
mod logging;
mod middle;
mod pipeline;
mod sequencer;
mod shared;
mod tui;

use std::time::{Duration, Instant};
use clap::Parser;
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio::AudioHandle;
use cli::Cli;
use middle::Middle;
use pipeline::settings;
use sequencer::{Connect, clamp_bpm};
use shared::InputEvent;

const FRAME: Duration = Duration::from_millis(16); // ~60fps
const SPIN_MS: u128 = 120;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log.as_deref())?;

    // everything that can be wrong with the config fails here, before the terminal is touched
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => settings::settings_file_path(&std::env::current_dir()?),
    };
    let mut settings = settings::load_settings(&config_path)?;
    cli.apply(&mut settings);
    let timing = settings.timing.to_timing()?;
    let key = settings.resolve_key()?;
    let pattern = settings.resolve_pattern()?;
    let bpm = clamp_bpm(settings.resolve_bpm(pattern));
    tracing::info!(key = key.root.name(), scale = key.scale.key(), %pattern, bpm, "starting");

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;

    // the output stream is only opened on the first press of play
    let connect: Connect<AudioHandle> = Box::new(audio::start_audio);
    let mut middle = Middle::new(connect, timing, key, pattern, bpm);

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let started = Instant::now();
    let mut next_frame = started;
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let now = Instant::now();
        middle.run_due(now);

        if now >= next_frame {
            // drain first so the frame shows the step that is sounding now
            middle.frame(now);
            let ds = middle.display_state();
            let spin = (started.elapsed().as_millis() / SPIN_MS) as usize;
            term.draw(|frame| {
                let area = frame.area();
                tui::view::render(frame, area, ds, &tui_state, spin);
            })?;
            next_frame = now + FRAME;
        }

        // sleep in poll until a key, the next scheduler timer, or the next frame
        let wake = middle.next_deadline().map_or(next_frame, |d| d.min(next_frame));
        let timeout = wake.saturating_duration_since(Instant::now());
        for event in tui::input::poll_input(timeout, &mut tui_state)? {
            if event == InputEvent::Quit {
                middle.shutdown();
                tracing::info!("quit");
                return Ok(());
            }
            middle.handle_input(event, Instant::now());
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
