// Cooperative run queue for the UI thread. Two kinds of pending work: timers that come due
// at an Instant, and frame requests that run on the next display refresh. Nothing here runs
// a task itself; the main loop pops work and hands it to whoever owns the task type.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Timer<T> {
    handle: TaskHandle,
    due: Instant,
    task: T,
}

#[derive(Debug)]
pub struct RunQueue<T> {
    next_id: u64,
    timers: Vec<Timer<T>>,
    frames: Vec<(TaskHandle, T)>,
}

impl<T> Default for RunQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RunQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            timers: Vec::new(),
            frames: Vec::new(),
        }
    }

    fn handle(&mut self) -> TaskHandle {
        self.next_id += 1;
        TaskHandle(self.next_id)
    }

    pub fn set_timeout(&mut self, task: T, delay: Duration, now: Instant) -> TaskHandle {
        let handle = self.handle();
        self.timers.push(Timer {
            handle,
            due: now + delay,
            task,
        });
        handle
    }

    pub fn request_frame(&mut self, task: T) -> TaskHandle {
        let handle = self.handle();
        self.frames.push((handle, task));
        handle
    }

    /// Returns false if the handle already fired or was never ours.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if let Some(i) = self.timers.iter().position(|t| t.handle == handle) {
            self.timers.swap_remove(i);
            return true;
        }
        if let Some(i) = self.frames.iter().position(|(h, _)| *h == handle) {
            self.frames.remove(i);
            return true;
        }
        false
    }

    /// Earliest timer due at or before `now`. Ties go to whichever was armed first.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TaskHandle, T)> {
        let i = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| (t.due, t.handle.0))
            .map(|(i, _)| i)?;
        let timer = self.timers.swap_remove(i);
        Some((timer.handle, timer.task))
    }

    // Everything requested before this refresh. Requests made while running these wait for the next one.
    pub fn take_frame_requests(&mut self) -> Vec<(TaskHandle, T)> {
        std::mem::take(&mut self.frames)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.due).min()
    }

    #[cfg(test)]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    #[cfg(test)]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty() && self.frames.is_empty()
    }
}
