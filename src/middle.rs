// Sits between the TUI and the sequencer. Owns the transport, the run queue its tasks live on,
// and the key/scale selection; turns InputEvents into transport calls and builds DisplayState.

use std::time::Instant;

use crate::audio_api::AudioSession;
use crate::pipeline::fretboard;
use crate::pipeline::patterns::PatternId;
use crate::pipeline::theory::Key;
use crate::sequencer::{Connect, RunQueue, Task, Timing, Transport};
use crate::shared::{DisplayState, InputEvent};

pub struct Middle<S: AudioSession> {
    transport: Transport<S>,
    rq: RunQueue<Task>,
    key: Key,
    display: DisplayState,
}

impl<S: AudioSession> Middle<S> {
    pub fn new(connect: Connect<S>, timing: Timing, key: Key, pattern: PatternId, bpm: u32) -> Self {
        let transport = Transport::new(connect, timing, pattern, bpm);
        let display = build_display(&key, &transport);
        Self {
            transport,
            rq: RunQueue::new(),
            key,
            display,
        }
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::TogglePlay => match self.transport.toggle(&mut self.rq, now) {
                Ok(()) => self.display.status.clear(),
                Err(e) => {
                    tracing::warn!("start failed: {e:#}");
                    self.display.status = format!("{e:#}");
                }
            },

            InputEvent::NextKey => self.set_key(Key::new(self.key.root.next(), self.key.scale)),
            InputEvent::PrevKey => self.set_key(Key::new(self.key.root.prev(), self.key.scale)),
            InputEvent::NextScale => self.set_key(Key::new(self.key.root, self.key.scale.next())),
            InputEvent::PrevScale => self.set_key(Key::new(self.key.root, self.key.scale.prev())),

            InputEvent::NextPattern => self.set_pattern(self.transport.pattern().next()),
            InputEvent::PrevPattern => self.set_pattern(self.transport.pattern().prev()),

            InputEvent::NudgeTempo(delta) => {
                self.transport.nudge_tempo(delta);
            }
            InputEvent::CommitTempo(text) => {
                let bpm = self.transport.commit_tempo_text(&text);
                if text.trim() != bpm.to_string() {
                    self.display.status = format!("tempo set to {bpm}");
                }
            }

            // main loop handles this one
            InputEvent::Quit => {}
        }
    }

    fn set_key(&mut self, key: Key) {
        self.key = key;
        self.display.key_name = key.root.name();
        self.display.scale_name = key.scale.name();
        self.display.degrees = key.degrees();
        self.display.strings = fretboard::layout(&key);
        tracing::debug!(key = key.root.name(), scale = key.scale.key(), "key changed");
    }

    fn set_pattern(&mut self, id: PatternId) {
        self.transport.select_pattern(id);
        let pattern = id.pattern();
        self.display.pattern_name = pattern.name;
        self.display.pattern_group = pattern.group.label();
        self.display.steps = pattern.steps;
    }

    /// Run every timer that has come due. Call as often as the loop wakes up.
    pub fn run_due(&mut self, now: Instant) {
        while let Some((handle, task)) = self.rq.pop_due(now) {
            self.transport.run(handle, task, &mut self.rq, now);
        }
    }

    /// One display refresh: run the frame requests that were pending when it began.
    pub fn frame(&mut self, now: Instant) {
        for (handle, task) in self.rq.take_frame_requests() {
            self.transport.run(handle, task, &mut self.rq, now);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.rq.next_deadline()
    }

    pub fn display_state(&mut self) -> &DisplayState {
        self.display.bpm = self.transport.bpm();
        self.display.playing = self.transport.is_playing();
        self.display.current_step = self.transport.current_step();
        &self.display
    }

    #[cfg(test)]
    pub fn key(&self) -> Key {
        self.key
    }

    /// Stop playback and close the audio session. Also runs on drop.
    pub fn shutdown(&mut self) {
        self.transport.teardown(&mut self.rq);
    }
}

impl<S: AudioSession> Drop for Middle<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn build_display<S: AudioSession>(key: &Key, transport: &Transport<S>) -> DisplayState {
    let pattern = transport.pattern().pattern();
    DisplayState {
        key_name: key.root.name(),
        scale_name: key.scale.name(),
        degrees: key.degrees(),
        strings: fretboard::layout(key),
        pattern_name: pattern.name,
        pattern_group: pattern.group.label(),
        steps: pattern.steps,
        bpm: transport.bpm(),
        playing: transport.is_playing(),
        current_step: transport.current_step(),
        status: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_api::{AudioClock, AudioSink, HitType};
    use crate::pipeline::theory::{Note, ScaleKind};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Session {
        clock: Rc<Cell<f64>>,
    }

    impl AudioClock for Session {
        fn now(&self) -> f64 {
            self.clock.get()
        }
    }

    impl AudioSink for Session {
        fn trigger(&mut self, _hit: HitType, _at: f64) {}
    }

    impl AudioSession for Session {
        fn resume(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn middle(session: Session) -> Middle<Session> {
        let connect: Connect<Session> = Box::new(move || Ok(session.clone()));
        Middle::new(connect, Timing::default(), Key::default(), PatternId::FunkJb, 105)
    }

    #[test]
    fn key_and_scale_changes_rebuild_the_board() {
        let mut m = middle(Session::default());
        let now = Instant::now();
        assert_eq!(m.display_state().key_name, "E");
        assert_eq!(m.display_state().degrees.len(), 5);

        m.handle_input(InputEvent::NextKey, now);
        m.handle_input(InputEvent::NextScale, now);
        assert_eq!(m.key(), Key::new(Note::new(5), ScaleKind::MajorPentatonic));
        let ds = m.display_state();
        assert_eq!(ds.key_name, "F");
        assert!(ds.strings[3].frets[0].is_root());

        m.handle_input(InputEvent::PrevKey, now);
        m.handle_input(InputEvent::PrevScale, now);
        assert_eq!(m.key(), Key::default());
    }

    #[test]
    fn pattern_change_loads_its_tempo() {
        let mut m = middle(Session::default());
        let now = Instant::now();
        m.handle_input(InputEvent::NudgeTempo(5), now);
        assert_eq!(m.display_state().bpm, 110);

        m.handle_input(InputEvent::NextPattern, now);
        let ds = m.display_state();
        assert_eq!(ds.pattern_name, PatternId::FunkOakland.pattern().name);
        assert_eq!(ds.bpm, 98);
        assert_eq!(ds.steps, PatternId::FunkOakland.pattern().steps);
    }

    #[test]
    fn typed_tempo_is_clamped_and_reported() {
        let mut m = middle(Session::default());
        let now = Instant::now();
        m.handle_input(InputEvent::CommitTempo("999".into()), now);
        let ds = m.display_state();
        assert_eq!(ds.bpm, 240);
        assert_eq!(ds.status, "tempo set to 240");

        m.handle_input(InputEvent::CommitTempo("120".into()), now);
        assert_eq!(m.display_state().bpm, 120);
    }

    #[test]
    fn playing_moves_the_step_indicator() {
        let session = Session::default();
        let clock = session.clock.clone();
        let mut m = middle(session);
        let mut now = Instant::now();
        m.handle_input(InputEvent::TogglePlay, now);
        assert!(m.display_state().playing);

        for _ in 0..100 {
            now += Duration::from_millis(16);
            clock.set(clock.get() + 0.016);
            m.run_due(now);
            m.frame(now);
        }
        assert_ne!(m.display_state().current_step, 0);

        m.handle_input(InputEvent::TogglePlay, now);
        let ds = m.display_state();
        assert!(!ds.playing);
        assert_eq!(ds.current_step, 0);
        assert!(m.next_deadline().is_none());
    }

    #[test]
    fn audio_failure_shows_up_in_the_status_line() {
        let connect: Connect<Session> = Box::new(|| anyhow::bail!("no default output device"));
        let mut m = Middle::new(connect, Timing::default(), Key::default(), PatternId::FunkJb, 105);
        m.handle_input(InputEvent::TogglePlay, Instant::now());
        let ds = m.display_state();
        assert!(!ds.playing);
        assert!(ds.status.contains("no default output device"));
    }

    #[test]
    fn shutdown_leaves_nothing_scheduled() {
        let mut m = middle(Session::default());
        let now = Instant::now();
        m.handle_input(InputEvent::TogglePlay, now);
        assert!(m.next_deadline().is_some());
        m.shutdown();
        m.shutdown();
        assert!(m.next_deadline().is_none());
        assert!(!m.display_state().playing);
    }
}
