// The input plan:
//
// Transport:
//   Space         //  TogglePlay
//
// Selection (lowercase = forward, shifted = back):
//   k / K         //  NextKey / PrevKey
//   s / S         //  NextScale / PrevScale
//   p / P         //  NextPattern / PrevPattern
//
// Tempo:
//   - / =         //  NudgeTempo(-1 or 1), Left / Right do the same
//   [ / ]         //  NudgeTempo(-5 or 5)
//   b             //  start typing a bpm, Enter sends CommitTempo(text), Esc drops it
//
// Quit:
//   q, Esc        //  Quit
//
// The idea of the rendering process:
//   - Only the middle layer owns the transport and the selection. The TUI renders
//     a `DisplayState` every frame and never reaches into the sequencer.
//      - Each frame, call `middle.frame()` (runs the step drain) then
//        `middle.display_state()` and draw it
//      - The fretboard rows and scale chips are rebuilt only when key or scale change
//      - The bpm entry buffer is TUI-local, the middle layer only sees the commit

use crate::pipeline::fretboard::StringRow;
use crate::pipeline::patterns::HitType;
use crate::pipeline::theory::ScaleDegree;

pub const STEPS_PER_PATTERN: usize = 16;
pub const MIN_BPM: u32 = 40;
pub const MAX_BPM: u32 = 240;

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    TogglePlay,

    NextKey,
    PrevKey,
    NextScale,
    PrevScale,
    NextPattern,
    PrevPattern,

    NudgeTempo(i64),
    CommitTempo(String), // raw text from the bpm field, clamped by the middle layer

    Quit,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub key_name: &'static str,
    pub scale_name: &'static str,
    pub degrees: Vec<ScaleDegree>, // chips in the header
    pub strings: Vec<StringRow>,   // fretboard, top string first
    pub pattern_name: &'static str,
    pub pattern_group: &'static str,
    pub steps: [HitType; STEPS_PER_PATTERN],
    pub bpm: u32,
    pub playing: bool,
    pub current_step: usize,
    pub status: String, // last error or notice, empty when there's nothing to say
}
