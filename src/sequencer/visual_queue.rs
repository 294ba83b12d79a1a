use std::collections::VecDeque;

/// A step the scheduler has already sent to the audio sink, stamped with the
/// audio-clock time it will sound at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualEvent {
    pub step: usize,
    pub audio_time: f64,
}

// Single producer (scheduler), single consumer (frame drain). Only ever touched at the ends.
#[derive(Debug, Default)]
pub struct VisualQueue {
    events: VecDeque<VisualEvent>,
}

impl VisualQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: VisualEvent) {
        debug_assert!(
            self.events.back().is_none_or(|last| last.audio_time < event.audio_time),
            "visual events must be pushed in time order"
        );
        self.events.push_back(event);
    }

    /// Pop every event that is due by `now + tolerance` and return the last one popped.
    /// Stops at the first event still in the future.
    pub fn drain_due(&mut self, now: f64, tolerance: f64) -> Option<VisualEvent> {
        let mut latest = None;
        while let Some(head) = self.events.front() {
            if head.audio_time > now + tolerance {
                break;
            }
            latest = self.events.pop_front();
        }
        latest
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[cfg(test)]
    pub fn front(&self) -> Option<&VisualEvent> {
        self.events.front()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &VisualEvent> {
        self.events.iter()
    }
}
