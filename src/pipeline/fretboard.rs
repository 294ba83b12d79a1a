// Marker layout for a 4-string bass neck. Pure lookups, the TUI only paints what comes out of here.

use super::theory::{Key, Note};

pub const NUM_FRETS: usize = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenString {
    pub name: &'static str,
    pub note: Note,
}

// top of the screen first, like looking down at the neck
pub const BASS_STRINGS: [OpenString; 4] = [
    OpenString { name: "G", note: Note::G },
    OpenString { name: "D", note: Note::D },
    OpenString { name: "A", note: Note::A },
    OpenString { name: "E", note: Note::E },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    pub note: Note,
    pub degree: Option<usize>,
}

impl Marker {
    pub fn in_scale(&self) -> bool {
        self.degree.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.degree == Some(0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringRow {
    pub name: &'static str,
    pub open: Marker,
    pub frets: [Marker; NUM_FRETS], // frets[0] is fret 1
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inlay {
    None,
    Single,
    Double,
}

pub fn inlay(fret: usize) -> Inlay {
    match fret {
        3 | 5 | 7 | 9 | 15 => Inlay::Single,
        12 => Inlay::Double,
        _ => Inlay::None,
    }
}

fn marker(key: &Key, note: Note) -> Marker {
    Marker {
        note,
        degree: key.degree_of(note),
    }
}

pub fn layout(key: &Key) -> Vec<StringRow> {
    BASS_STRINGS
        .iter()
        .map(|s| StringRow {
            name: s.name,
            open: marker(key, s.note),
            frets: std::array::from_fn(|i| marker(key, s.note.transpose((i + 1) as u8))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::theory::ScaleKind;

    #[test]
    fn e_string_fifth_fret_is_a() {
        let rows = layout(&Key::new(Note::E, ScaleKind::MinorPentatonic));
        let e = &rows[3];
        assert_eq!(e.name, "E");
        assert!(e.open.is_root());
        assert_eq!(e.frets[4].note, Note::A);
        assert_eq!(e.frets[4].degree, Some(2));
        // F is not in E minor pentatonic
        assert!(!e.frets[0].in_scale());
        assert!(e.frets[11].is_root());
    }

    #[test]
    fn chromatic_marks_every_cell() {
        let rows = layout(&Key::new(Note::C, ScaleKind::Chromatic));
        assert!(rows.iter().all(|r| r.open.in_scale() && r.frets.iter().all(Marker::in_scale)));
    }

    #[test]
    fn inlays_follow_a_standard_neck() {
        let singles: Vec<_> = (1..=NUM_FRETS).filter(|&f| inlay(f) == Inlay::Single).collect();
        assert_eq!(singles, [3, 5, 7, 9, 15]);
        assert_eq!(inlay(12), Inlay::Double);
        assert_eq!(inlay(1), Inlay::None);
    }
}
