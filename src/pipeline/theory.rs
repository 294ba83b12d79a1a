use std::str::FromStr;

use crate::error::GrooveError;

pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

// Pitch class, 0 = C
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Note(u8);

impl Note {
    pub const C: Note = Note(0);
    pub const D: Note = Note(2);
    pub const E: Note = Note(4);
    pub const G: Note = Note(7);
    pub const A: Note = Note(9);

    pub fn new(pitch_class: u8) -> Self {
        Note(pitch_class % 12)
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }

    pub fn transpose(self, semitones: u8) -> Self {
        Note::new(self.0 + semitones % 12)
    }

    pub fn next(self) -> Self {
        self.transpose(1)
    }

    pub fn prev(self) -> Self {
        self.transpose(11)
    }
}

impl Default for Note {
    fn default() -> Self {
        Note::E
    }
}

impl FromStr for Note {
    type Err = GrooveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        NOTE_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(wanted))
            .map(|i| Note(i as u8))
            .ok_or_else(|| GrooveError::NoteNotFound(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalName {
    pub long: &'static str,
    pub short: &'static str,
}

pub fn interval_name(semitones: u8) -> IntervalName {
    let (long, short) = match semitones % 12 {
        0 => ("Root", "R"),
        1 => ("Minor 2nd", "m2"),
        2 => ("Major 2nd", "M2"),
        3 => ("Minor 3rd", "m3"),
        4 => ("Major 3rd", "M3"),
        5 => ("Perfect 4th", "P4"),
        6 => ("Diminished 5th", "d5"), // a.k.a. the tritone
        7 => ("Perfect 5th", "P5"),
        8 => ("Minor 6th", "m6"),
        9 => ("Major 6th", "M6"),
        10 => ("Minor 7th", "m7"),
        _ => ("Major 7th", "M7"),
    };
    IntervalName { long, short }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScaleKind {
    #[default]
    MinorPentatonic,
    MajorPentatonic,
    Blues,
    Dorian,
    Mixolydian,
    Major,
    Minor,
    Chromatic,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 8] = [
        ScaleKind::MinorPentatonic,
        ScaleKind::MajorPentatonic,
        ScaleKind::Blues,
        ScaleKind::Dorian,
        ScaleKind::Mixolydian,
        ScaleKind::Major,
        ScaleKind::Minor,
        ScaleKind::Chromatic,
    ];

    pub fn intervals(&self) -> &'static [u8] {
        match self {
            ScaleKind::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleKind::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleKind::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleKind::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ScaleKind::MinorPentatonic => "minor_pentatonic",
            ScaleKind::MajorPentatonic => "major_pentatonic",
            ScaleKind::Blues => "blues",
            ScaleKind::Dorian => "dorian",
            ScaleKind::Mixolydian => "mixolydian",
            ScaleKind::Major => "major",
            ScaleKind::Minor => "minor",
            ScaleKind::Chromatic => "chromatic",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScaleKind::MinorPentatonic => "Minor Pentatonic (Funk/Rock)",
            ScaleKind::MajorPentatonic => "Major Pentatonic (Country/Pop)",
            ScaleKind::Blues => "Blues",
            ScaleKind::Dorian => "Dorian (Funk/Jazz)",
            ScaleKind::Mixolydian => "Mixolydian (Jam)",
            ScaleKind::Major => "Major (Ionian)",
            ScaleKind::Minor => "Natural Minor (Aeolian)",
            ScaleKind::Chromatic => "Chromatic (finger drills)",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for ScaleKind {
    type Err = GrooveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScaleKind::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GrooveError::ScaleNotFound(s.to_string()))
    }
}

/// One degree of a scale spelled from a root.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleDegree {
    pub degree: usize,
    pub note: Note,
    pub interval: IntervalName,
    pub is_root: bool,
}

/// A root note paired with a scale. Answers "is this pitch class in the scale, and which degree".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Key {
    pub root: Note,
    pub scale: ScaleKind,
}

impl Key {
    pub fn new(root: Note, scale: ScaleKind) -> Self {
        Self { root, scale }
    }

    pub fn degree_of(&self, note: Note) -> Option<usize> {
        self.scale
            .intervals()
            .iter()
            .position(|&iv| self.root.transpose(iv) == note)
    }

    pub fn degrees(&self) -> Vec<ScaleDegree> {
        self.scale
            .intervals()
            .iter()
            .enumerate()
            .map(|(degree, &iv)| ScaleDegree {
                degree,
                note: self.root.transpose(iv),
                interval: interval_name(iv),
                is_root: iv == 0,
            })
            .collect()
    }
}
