// Play/stop lifecycle. Owns the audio session, the scheduler cursor and the visual queue, and is
// the only thing that arms or cancels their run-queue tasks. At most one scheduler timer and one
// frame request are ever outstanding, and both are cancelled synchronously on stop.

use std::time::{Duration, Instant};

use anyhow::Context;

use crate::audio_api::AudioSession;
use crate::error::GrooveError;
use crate::pipeline::patterns::PatternId;

use super::run_queue::{RunQueue, TaskHandle};
use super::scheduler::Scheduler;
use super::timing::{Timing, clamp_bpm, parse_bpm};
use super::visual_queue::{VisualEvent, VisualQueue};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    Schedule,
    Drain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

// Opens the audio session. Only called on the first start that needs one.
pub type Connect<S> = Box<dyn FnMut() -> anyhow::Result<S>>;

pub struct Transport<S> {
    connect: Connect<S>,
    session: Option<S>,
    timing: Timing,
    scheduler: Scheduler,
    queue: VisualQueue,
    pattern: PatternId,
    bpm: u32,
    state: PlayState,
    current_step: usize,
    shown: Option<VisualEvent>,
    schedule_timer: Option<TaskHandle>,
    frame_request: Option<TaskHandle>,
}

impl<S: AudioSession> Transport<S> {
    pub fn new(connect: Connect<S>, timing: Timing, pattern: PatternId, bpm: u32) -> Self {
        Self {
            connect,
            session: None,
            timing,
            scheduler: Scheduler::new(),
            queue: VisualQueue::new(),
            pattern,
            bpm: clamp_bpm(bpm as i64),
            state: PlayState::Stopped,
            current_step: 0,
            shown: None,
            schedule_timer: None,
            frame_request: None,
        }
    }

    pub fn start(&mut self, rq: &mut RunQueue<Task>, now: Instant) -> anyhow::Result<()> {
        if self.is_playing() {
            return Ok(());
        }

        if self.session.is_none() {
            let session = (self.connect)().context("could not open the audio output")?;
            tracing::info!("audio session opened");
            self.session = Some(session);
        }
        let session = self
            .session
            .as_mut()
            .ok_or(GrooveError::SessionUnavailable)?;
        session.resume().context("could not resume the audio output")?;

        let start_time = session.now() + self.timing.start_offset;
        self.cancel_pending(rq);
        self.queue.clear();
        self.scheduler.reset(start_time);
        self.current_step = 0;
        self.shown = None;
        self.state = PlayState::Playing;

        // first tick goes out on the very next pass of the run queue
        self.schedule_timer = Some(rq.set_timeout(Task::Schedule, Duration::ZERO, now));
        self.frame_request = Some(rq.request_frame(Task::Drain));

        tracing::info!(
            pattern = %self.pattern,
            bpm = self.bpm,
            start_time,
            "transport started"
        );
        Ok(())
    }

    pub fn stop(&mut self, rq: &mut RunQueue<Task>) {
        let was_playing = self.is_playing();
        self.state = PlayState::Stopped;
        self.cancel_pending(rq);
        self.queue.clear();
        self.current_step = 0;
        self.shown = None;
        if was_playing {
            tracing::info!("transport stopped");
        }
    }

    /// Stop and close the audio session. Safe to call any number of times.
    pub fn teardown(&mut self, rq: &mut RunQueue<Task>) {
        self.stop(rq);
        if self.session.take().is_some() {
            tracing::info!("audio session closed");
        }
    }

    pub fn toggle(&mut self, rq: &mut RunQueue<Task>, now: Instant) -> anyhow::Result<()> {
        if self.is_playing() {
            self.stop(rq);
            Ok(())
        } else {
            self.start(rq, now)
        }
    }

    /// Entry point for anything popped off the run queue.
    pub fn run(&mut self, handle: TaskHandle, task: Task, rq: &mut RunQueue<Task>, now: Instant) {
        match task {
            Task::Schedule => {
                if self.schedule_timer != Some(handle) {
                    return;
                }
                self.schedule_timer = None;
                if let Err(e) = self.tick(rq, now) {
                    tracing::error!("scheduler halted: {e}");
                    self.stop(rq);
                }
            }
            Task::Drain => {
                if self.frame_request != Some(handle) {
                    return;
                }
                self.frame_request = None;
                self.drain(rq);
            }
        }
    }

    fn tick(&mut self, rq: &mut RunQueue<Task>, now: Instant) -> Result<(), GrooveError> {
        if !self.is_playing() {
            return Ok(());
        }
        let session = self.session.as_mut().ok_or(GrooveError::SessionUnavailable)?;
        let audio_now = session.now();
        let booked = self.scheduler.fill(
            audio_now,
            self.timing.schedule_ahead,
            self.pattern.pattern(),
            self.bpm,
            session,
            &mut self.queue,
        );
        if booked > 0 {
            tracing::trace!(booked, audio_now, "scheduler tick");
        }

        if self.is_playing() {
            self.schedule_timer = Some(rq.set_timeout(Task::Schedule, self.timing.lookahead, now));
        }
        Ok(())
    }

    fn drain(&mut self, rq: &mut RunQueue<Task>) {
        if !self.is_playing() {
            return;
        }
        if let Some(session) = &self.session {
            if let Some(event) = self.queue.drain_due(session.now(), self.timing.display_tolerance) {
                self.current_step = event.step;
                self.shown = Some(event);
            }
        }
        if self.is_playing() {
            self.frame_request = Some(rq.request_frame(Task::Drain));
        }
    }

    fn cancel_pending(&mut self, rq: &mut RunQueue<Task>) {
        if let Some(h) = self.schedule_timer.take() {
            rq.cancel(h);
        }
        if let Some(h) = self.frame_request.take() {
            rq.cancel(h);
        }
    }

    pub fn set_tempo(&mut self, bpm: i64) -> u32 {
        let bpm = clamp_bpm(bpm);
        if bpm != self.bpm {
            self.bpm = bpm;
            if self.is_playing() {
                self.scheduler.retime(bpm);
            }
            tracing::debug!(bpm, "tempo changed");
        }
        self.bpm
    }

    pub fn nudge_tempo(&mut self, delta: i64) -> u32 {
        self.set_tempo(self.bpm as i64 + delta)
    }

    pub fn commit_tempo_text(&mut self, text: &str) -> u32 {
        self.set_tempo(parse_bpm(text) as i64)
    }

    // The new steps are read on the next booked step; the pattern's own tempo becomes the BPM.
    pub fn select_pattern(&mut self, id: PatternId) {
        self.pattern = id;
        self.set_tempo(id.pattern().bpm as i64);
        tracing::info!(pattern = %id, bpm = self.bpm, "pattern selected");
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    #[cfg(test)]
    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn pattern(&self) -> PatternId {
        self.pattern
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// The event behind `current_step`, if one has been shown since the last start.
    #[cfg(test)]
    pub fn shown_event(&self) -> Option<VisualEvent> {
        self.shown
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.scheduler.cursor()
    }

    #[cfg(test)]
    pub fn next_scheduled_time(&self) -> f64 {
        self.scheduler.next_time()
    }

    #[cfg(test)]
    pub fn queue(&self) -> &VisualQueue {
        &self.queue
    }

    #[cfg(test)]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    #[cfg(test)]
    pub fn has_pending_tasks(&self) -> bool {
        self.schedule_timer.is_some() || self.frame_request.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_api::{AudioClock, AudioSink, HitType};
    use crate::sequencer::timing::seconds_per_step;
    use approx::assert_relative_eq;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FakeSession {
        clock: Rc<Cell<f64>>,
        hits: Rc<RefCell<Vec<(HitType, f64)>>>,
        resumes: Rc<Cell<u32>>,
    }

    impl AudioClock for FakeSession {
        fn now(&self) -> f64 {
            self.clock.get()
        }
    }

    impl AudioSink for FakeSession {
        fn trigger(&mut self, hit: HitType, at: f64) {
            self.hits.borrow_mut().push((hit, at));
        }
    }

    impl AudioSession for FakeSession {
        fn resume(&mut self) -> anyhow::Result<()> {
            self.resumes.set(self.resumes.get() + 1);
            Ok(())
        }
    }

    const TICK: f64 = 0.004;

    struct Rig {
        transport: Transport<FakeSession>,
        rq: RunQueue<Task>,
        fake: FakeSession,
        wall: Instant,
        connects: Rc<Cell<u32>>,
    }

    impl Rig {
        fn new(pattern: PatternId, bpm: u32, t0: f64) -> Self {
            let fake = FakeSession::default();
            fake.clock.set(t0);
            let connects = Rc::new(Cell::new(0));
            let (session, count) = (fake.clone(), connects.clone());
            let connect: Connect<FakeSession> = Box::new(move || {
                count.set(count.get() + 1);
                Ok(session.clone())
            });
            Self {
                transport: Transport::new(connect, Timing::default(), pattern, bpm),
                rq: RunQueue::new(),
                fake,
                wall: Instant::now(),
                connects,
            }
        }

        fn start(&mut self) {
            self.transport.start(&mut self.rq, self.wall).unwrap();
        }

        fn stop(&mut self) {
            self.transport.stop(&mut self.rq);
        }

        // one pass of the main loop: due timers, then one display refresh
        fn pump(&mut self) {
            while let Some((h, task)) = self.rq.pop_due(self.wall) {
                self.transport.run(h, task, &mut self.rq, self.wall);
            }
            for (h, task) in self.rq.take_frame_requests() {
                self.transport.run(h, task, &mut self.rq, self.wall);
            }
        }

        fn advance(&mut self, secs: f64) {
            let passes = (secs / TICK).round() as usize;
            for _ in 0..passes {
                self.wall += Duration::from_secs_f64(TICK);
                self.fake.clock.set(self.fake.clock.get() + TICK);
                self.pump();
            }
        }

        fn hits(&self) -> Vec<(HitType, f64)> {
            self.fake.hits.borrow().clone()
        }
    }

    #[test]
    fn standard_funk_at_90_lands_on_the_grid() {
        let t0 = 10.0;
        let mut rig = Rig::new(PatternId::FunkSync, 90, t0);
        assert_eq!(rig.transport.bpm(), 90);
        rig.start();
        assert_eq!(rig.transport.cursor(), 0);
        assert!(rig.transport.queue().is_empty());

        // first tick: only step 0 fits inside t0 + 0.1
        rig.pump();
        assert_eq!(rig.hits(), vec![(HitType(4), t0 + 0.05)]);
        assert_eq!(rig.transport.cursor(), 1);

        // step 1 is a rest: booked for the display, silent for the sink
        rig.fake.clock.set(t0 + 0.2);
        rig.wall += Duration::from_millis(25);
        while let Some((h, task)) = rig.rq.pop_due(rig.wall) {
            rig.transport.run(h, task, &mut rig.rq, rig.wall);
        }
        let step = seconds_per_step(90);
        let last = rig.transport.queue().iter().last().copied().unwrap();
        assert_eq!(last.step, 1);
        assert_relative_eq!(last.audio_time, t0 + 0.05 + step, epsilon = 1e-9);
        assert_eq!(rig.hits().len(), 1);

        rig.advance(0.6);
        let hits = rig.hits();
        let (hit, at) = hits[3];
        assert_eq!(hit, HitType(5));
        assert_relative_eq!(at, t0 + 0.05 + 4.0 * step, epsilon = 1e-9);
        assert_relative_eq!(step, 0.1667, epsilon = 1e-4);
        assert_eq!(hits[1].0, HitType(3));
        assert_eq!(hits[2].0, HitType(1));
    }

    #[test]
    fn tempo_change_mid_loop_halves_the_next_interval() {
        // JB's Funk sounds on every step, so every booked step shows up as a hit
        let mut rig = Rig::new(PatternId::FunkJb, 90, 0.0);
        rig.start();
        rig.advance(0.5);

        let queued: Vec<VisualEvent> = rig.transport.queue().iter().copied().collect();
        assert!(!queued.is_empty());
        let last_booked = queued.last().unwrap().audio_time;

        assert_eq!(rig.transport.set_tempo(180), 180);
        assert_relative_eq!(
            rig.transport.next_scheduled_time() - last_booked,
            seconds_per_step(180),
            epsilon = 1e-9
        );
        // nothing already queued moved
        let still: Vec<VisualEvent> = rig.transport.queue().iter().copied().collect();
        assert_eq!(still, queued);

        rig.advance(0.5);
        let after: Vec<f64> = rig
            .hits()
            .iter()
            .map(|(_, t)| *t)
            .filter(|&t| t > last_booked + 1e-9)
            .collect();
        assert!(after.len() >= 2);
        assert_relative_eq!(after[0] - last_booked, seconds_per_step(180), epsilon = 1e-9);
        assert_relative_eq!(after[1] - after[0], seconds_per_step(180), epsilon = 1e-9);
    }

    #[test]
    fn stop_when_stopped_changes_nothing() {
        let mut rig = Rig::new(PatternId::FunkJb, 105, 0.0);
        rig.stop();
        rig.stop();
        assert_eq!(rig.transport.state(), PlayState::Stopped);
        assert_eq!(rig.transport.current_step(), 0);
        assert!(rig.rq.is_idle());
        assert!(!rig.transport.has_pending_tasks());
        // stopping never needs a session
        assert_eq!(rig.connects.get(), 0);
    }

    #[test]
    fn exactly_one_timer_and_one_frame_while_playing() {
        let mut rig = Rig::new(PatternId::HipHopTrap, 140, 0.0);
        rig.start();
        rig.start();
        assert_eq!(rig.rq.pending_timers(), 1);
        assert_eq!(rig.rq.pending_frames(), 1);

        for _ in 0..200 {
            rig.advance(TICK);
            assert_eq!(rig.rq.pending_timers(), 1);
            assert_eq!(rig.rq.pending_frames(), 1);
        }
        rig.start();
        assert_eq!(rig.rq.pending_timers(), 1);
        assert_eq!(rig.rq.pending_frames(), 1);
        assert_eq!(rig.connects.get(), 1);

        rig.stop();
        assert!(rig.rq.is_idle());
    }

    #[test]
    fn shown_steps_are_never_early_or_very_late() {
        let mut rig = Rig::new(PatternId::FunkOakland, 98, 3.0);
        rig.start();
        let tolerance = Timing::default().display_tolerance;
        let mut seen = 0;
        let mut last = None;
        for _ in 0..1000 {
            rig.advance(TICK);
            let shown = rig.transport.shown_event();
            if shown != last {
                let event = shown.unwrap();
                let now = rig.fake.clock.get();
                assert!(event.audio_time <= now + tolerance);
                assert!(event.audio_time >= now - tolerance - TICK);
                assert_eq!(rig.transport.current_step(), event.step);
                seen += 1;
                last = shown;
            }
        }
        assert!(seen > 16);
    }

    #[test]
    fn stop_then_start_begins_from_step_zero() {
        let mut rig = Rig::new(PatternId::RockStraight, 100, 0.0);
        rig.start();
        rig.advance(0.7);
        assert_ne!(rig.transport.current_step(), 0);

        rig.stop();
        assert_eq!(rig.transport.current_step(), 0);
        assert!(rig.transport.queue().is_empty());
        assert!(rig.rq.is_idle());

        rig.advance(0.3);
        rig.start();
        assert_eq!(rig.transport.cursor(), 0);
        assert_eq!(rig.transport.current_step(), 0);
        assert!(rig.transport.queue().is_empty());
        assert_relative_eq!(rig.transport.next_scheduled_time(), 1.05, epsilon = 1e-6);
        assert_eq!(rig.fake.resumes.get(), 2);
        assert_eq!(rig.connects.get(), 1);
    }

    #[test]
    fn new_pattern_is_picked_up_on_the_next_step() {
        let mut rig = Rig::new(PatternId::Metronome, 90, 0.0);
        rig.start();
        rig.pump();
        let cursor = rig.transport.cursor();

        rig.transport.select_pattern(PatternId::FunkJb);
        assert_eq!(rig.transport.bpm(), 105);
        rig.advance(0.3);

        // JB's Funk has a hit on every step, the metronome didn't
        let hits = rig.hits();
        let expected = PatternId::FunkJb.pattern().hit(cursor);
        assert_eq!(hits[1].0, expected);
    }

    #[test]
    fn failed_session_leaves_the_transport_stopped() {
        let attempts = Rc::new(Cell::new(0));
        let counter = attempts.clone();
        let connect: Connect<FakeSession> = Box::new(move || {
            counter.set(counter.get() + 1);
            if counter.get() == 1 {
                anyhow::bail!("device busy");
            }
            Ok(FakeSession::default())
        });
        let mut transport = Transport::new(connect, Timing::default(), PatternId::FunkJb, 105);
        let mut rq = RunQueue::new();
        let now = Instant::now();

        assert!(transport.start(&mut rq, now).is_err());
        assert_eq!(transport.state(), PlayState::Stopped);
        assert!(rq.is_idle());

        // the user presses play again
        transport.start(&mut rq, now).unwrap();
        assert!(transport.is_playing());
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn tick_without_a_session_halts_playback() {
        let mut rig = Rig::new(PatternId::FunkJb, 105, 0.0);
        rig.start();
        rig.advance(0.5);
        assert_ne!(rig.transport.current_step(), 0);

        // the session vanishes under a running transport
        rig.transport.session = None;
        rig.advance(0.03);

        assert!(!rig.transport.is_playing());
        assert_eq!(rig.transport.current_step(), 0);
        assert!(!rig.transport.has_pending_tasks());
        assert!(rig.rq.is_idle());
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut rig = Rig::new(PatternId::LofiChill, 75, 0.0);
        rig.start();
        rig.advance(0.1);
        rig.transport.teardown(&mut rig.rq);
        rig.transport.teardown(&mut rig.rq);
        assert!(!rig.transport.has_session());
        assert!(rig.rq.is_idle());
        assert_eq!(rig.transport.current_step(), 0);
    }

    #[test]
    fn tempo_entry_is_clamped() {
        let mut rig = Rig::new(PatternId::FunkJb, 105, 0.0);
        assert_eq!(rig.transport.commit_tempo_text("500"), 240);
        assert_eq!(rig.transport.commit_tempo_text("abc"), 40);
        assert_eq!(rig.transport.nudge_tempo(-5), 40);
        assert_eq!(rig.transport.nudge_tempo(5), 45);
    }

    #[test]
    fn handles_it_does_not_own_are_ignored() {
        let mut rig = Rig::new(PatternId::FunkJb, 105, 0.0);
        rig.start();
        let foreign = rig.rq.set_timeout(Task::Schedule, Duration::from_secs(10), rig.wall);
        rig.transport.run(foreign, Task::Schedule, &mut rig.rq, rig.wall);

        // no tick ran and the real timer is still the one armed
        assert_eq!(rig.transport.cursor(), 0);
        assert!(rig.transport.queue().is_empty());
        assert_eq!(rig.rq.pending_timers(), 2);
        rig.rq.cancel(foreign);
        rig.pump();
        assert_eq!(rig.transport.cursor(), 1);
    }
}
