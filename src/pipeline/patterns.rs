// The drum pattern table. Every pattern is one 4/4 bar on a 16th-note grid.

use std::fmt;
use std::str::FromStr;

use crate::error::GrooveError;
use crate::shared::STEPS_PER_PATTERN;

// A step's hit code. 0 is a rest, anything else picks one or more voices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HitType(pub u8);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voices {
    pub kick: bool,
    pub snare: bool,
    pub hat: bool,
}

impl HitType {
    pub const REST: HitType = HitType(0);

    pub fn is_rest(self) -> bool {
        self.0 == 0
    }

    // codes 4-6 are the stacked hits; unknown codes sound nothing
    pub fn voices(self) -> Voices {
        let (kick, snare, hat) = match self.0 {
            1 => (true, false, false),
            2 => (false, true, false),
            3 => (false, false, true),
            4 => (true, false, true),
            5 => (false, true, true),
            6 => (true, true, false),
            _ => (false, false, false),
        };
        Voices { kick, snare, hat }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternGroup {
    FunkSoul,
    HipHop,
    Others,
}

impl PatternGroup {
    pub fn label(self) -> &'static str {
        match self {
            PatternGroup::FunkSoul => "Funk & Soul",
            PatternGroup::HipHop => "Hip Hop",
            PatternGroup::Others => "Others",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PatternId {
    #[default]
    FunkJb,
    FunkOakland,
    FunkSlap,
    FunkNola,
    FunkSync,
    HipHop90s,
    HipHopTrap,
    LofiChill,
    JazzSwing,
    RockStraight,
    Metronome,
}

#[derive(Debug)]
pub struct Pattern {
    pub id: PatternId,
    pub key: &'static str,
    pub name: &'static str,
    pub group: PatternGroup,
    pub bpm: u32,
    pub steps: [HitType; STEPS_PER_PATTERN],
}

impl Pattern {
    pub fn hit(&self, step: usize) -> HitType {
        self.steps[step % STEPS_PER_PATTERN]
    }
}

const fn steps(codes: [u8; STEPS_PER_PATTERN]) -> [HitType; STEPS_PER_PATTERN] {
    let mut out = [HitType::REST; STEPS_PER_PATTERN];
    let mut i = 0;
    while i < STEPS_PER_PATTERN {
        out[i] = HitType(codes[i]);
        i += 1;
    }
    out
}

// order here is the order the selector cycles through
pub static PATTERNS: [Pattern; 11] = [
    Pattern {
        id: PatternId::FunkJb,
        key: "funk_jb",
        name: "JB's Funk (The One)",
        group: PatternGroup::FunkSoul,
        bpm: 105,
        steps: steps([4, 3, 3, 3, 5, 3, 3, 3, 1, 3, 3, 3, 5, 3, 3, 3]),
    },
    Pattern {
        id: PatternId::FunkOakland,
        key: "funk_oakland",
        name: "Oakland Sync (16th)",
        group: PatternGroup::FunkSoul,
        bpm: 98,
        steps: steps([4, 0, 1, 0, 5, 0, 1, 1, 0, 1, 3, 0, 5, 0, 3, 1]),
    },
    Pattern {
        id: PatternId::FunkSlap,
        key: "funk_slap",
        name: "Slap Machine (Open)",
        group: PatternGroup::FunkSoul,
        bpm: 110,
        steps: steps([4, 0, 0, 0, 5, 0, 0, 1, 0, 0, 0, 1, 5, 0, 0, 0]),
    },
    Pattern {
        id: PatternId::FunkNola,
        key: "funk_nola",
        name: "NOLA Strut (N.O.)",
        group: PatternGroup::FunkSoul,
        bpm: 90,
        steps: steps([4, 0, 1, 0, 2, 0, 4, 0, 0, 0, 1, 0, 5, 0, 2, 0]),
    },
    Pattern {
        id: PatternId::FunkSync,
        key: "funk_sync",
        name: "Standard Funk",
        group: PatternGroup::FunkSoul,
        bpm: 95,
        steps: steps([4, 0, 3, 1, 5, 0, 3, 0, 0, 1, 3, 0, 5, 0, 3, 0]),
    },
    Pattern {
        id: PatternId::HipHop90s,
        key: "hiphop_90s",
        name: "Boom Bap (90s)",
        group: PatternGroup::HipHop,
        bpm: 90,
        steps: steps([4, 0, 3, 1, 5, 0, 1, 0, 4, 1, 3, 0, 5, 0, 3, 0]),
    },
    Pattern {
        id: PatternId::HipHopTrap,
        key: "hiphop_trap",
        name: "Trap (Modern)",
        group: PatternGroup::HipHop,
        bpm: 140,
        steps: steps([4, 0, 3, 0, 3, 0, 3, 0, 5, 0, 3, 0, 3, 0, 4, 0]),
    },
    Pattern {
        id: PatternId::LofiChill,
        key: "lofi_chill",
        name: "Lo-Fi Chill",
        group: PatternGroup::HipHop,
        bpm: 75,
        steps: steps([4, 0, 0, 0, 5, 0, 0, 1, 0, 0, 1, 0, 5, 0, 0, 0]),
    },
    Pattern {
        id: PatternId::JazzSwing,
        key: "jazz_swing",
        name: "Jazz Swing",
        group: PatternGroup::Others,
        bpm: 120,
        steps: steps([3, 0, 3, 0, 2, 0, 3, 0, 3, 0, 3, 0, 2, 0, 3, 0]),
    },
    Pattern {
        id: PatternId::RockStraight,
        key: "rock_straight",
        name: "Rock (8-Beat)",
        group: PatternGroup::Others,
        bpm: 100,
        steps: steps([4, 0, 3, 0, 5, 0, 3, 0, 4, 0, 3, 0, 5, 0, 3, 0]),
    },
    Pattern {
        id: PatternId::Metronome,
        key: "metronome",
        name: "Metronome",
        group: PatternGroup::Others,
        bpm: 90,
        steps: steps([3, 0, 0, 0, 3, 0, 0, 0, 3, 0, 0, 0, 3, 0, 0, 0]),
    },
];

impl PatternId {
    fn index(self) -> usize {
        PATTERNS
            .iter()
            .position(|p| p.id == self)
            .unwrap_or(0)
    }

    pub fn pattern(self) -> &'static Pattern {
        &PATTERNS[self.index()]
    }

    pub fn next(self) -> Self {
        PATTERNS[(self.index() + 1) % PATTERNS.len()].id
    }

    pub fn prev(self) -> Self {
        PATTERNS[(self.index() + PATTERNS.len() - 1) % PATTERNS.len()].id
    }
}

impl FromStr for PatternId {
    type Err = GrooveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PATTERNS
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(s.trim()))
            .map(|p| p.id)
            .ok_or_else(|| GrooveError::PatternNotFound(s.to_string()))
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern().key)
    }
}
