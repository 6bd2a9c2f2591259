//! Chord Shapes
//!
//! Static chord definitions for a GCEA-tuned ukulele. Every shape is four
//! frets and four finger labels, indexed by [`Lane`]: lane 0 is the G
//! string (4th), lane 3 the A string (1st). Fret 0 means the string is
//! played open and needs no finger, so the engine spawns no token for it.

use alloc::collections::BTreeMap;
use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Number of strings, and therefore lanes.
pub const LANE_COUNT: usize = 4;

/// One string of the instrument, in chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lane {
    G,
    C,
    E,
    A,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::G, Lane::C, Lane::E, Lane::A];

    /// Lane index (0..4)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable hint, e.g. "4th (G)"
    pub fn hint(self) -> &'static str {
        match self {
            Lane::G => "4th (G)",
            Lane::C => "3rd (C)",
            Lane::E => "2nd (E)",
            Lane::A => "1st (A)",
        }
    }
}

/// Fretting-hand finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finger {
    #[serde(rename = "1")]
    Index,
    #[serde(rename = "2")]
    Middle,
    #[serde(rename = "3")]
    Ring,
    #[serde(rename = "4")]
    Pinky,
}

impl Finger {
    /// Parse a finger label ("1".."4"). Anything else means no finger.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "1" => Some(Finger::Index),
            "2" => Some(Finger::Middle),
            "3" => Some(Finger::Ring),
            "4" => Some(Finger::Pinky),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Finger::Index => "1",
            Finger::Middle => "2",
            Finger::Ring => "3",
            Finger::Pinky => "4",
        }
    }
}

/// Fingering for one chord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordDef {
    /// Fret per lane, 0 = open
    pub frets: [u8; LANE_COUNT],
    /// Finger per lane, `None` for open strings
    pub fingers: [Option<Finger>; LANE_COUNT],
}

impl ChordDef {
    pub fn new(frets: [u8; LANE_COUNT], fingers: [Option<Finger>; LANE_COUNT]) -> Self {
        Self { frets, fingers }
    }

    /// Lanes that need a finger, with their fret and finger.
    pub fn fretted(&self) -> impl Iterator<Item = (Lane, u8, Option<Finger>)> + '_ {
        Lane::ALL
            .iter()
            .filter(move |lane| self.frets[lane.index()] > 0)
            .map(move |&lane| (lane, self.frets[lane.index()], self.fingers[lane.index()]))
    }

    /// True when every string rings open (e.g. Am7).
    pub fn is_open(&self) -> bool {
        self.frets.iter().all(|&f| f == 0)
    }
}

/// A lookup table of chord shapes by name.
#[derive(Debug, Clone, Default)]
pub struct ChordBook {
    chords: BTreeMap<String, ChordDef>,
}

impl ChordBook {
    /// Create an empty chord book
    pub fn new() -> Self {
        Self::default()
    }

    /// Common first-position shapes for GCEA tuning.
    pub fn standard() -> Self {
        use Finger::*;

        let mut book = Self::new();
        book.insert("C", [0, 0, 0, 3], [None, None, None, Some(Ring)]);
        book.insert("C7", [0, 0, 0, 1], [None, None, None, Some(Index)]);
        book.insert("Am", [2, 0, 0, 0], [Some(Middle), None, None, None]);
        book.insert("Am7", [0, 0, 0, 0], [None, None, None, None]);
        book.insert("F", [2, 0, 1, 0], [Some(Middle), None, Some(Index), None]);
        book.insert("G", [0, 2, 3, 2], [None, Some(Index), Some(Ring), Some(Middle)]);
        book.insert("G7", [0, 2, 1, 2], [None, Some(Middle), Some(Index), Some(Ring)]);
        book.insert("Dm", [2, 2, 1, 0], [Some(Middle), Some(Ring), Some(Index), None]);
        book.insert("D", [2, 2, 2, 0], [Some(Index), Some(Middle), Some(Ring), None]);
        book.insert("D7", [2, 2, 2, 3], [Some(Index), Some(Index), Some(Index), Some(Middle)]);
        book.insert("Em", [0, 4, 3, 2], [None, Some(Ring), Some(Middle), Some(Index)]);
        book.insert("Em7", [0, 2, 0, 2], [None, Some(Index), None, Some(Middle)]);
        book.insert("A", [2, 1, 0, 0], [Some(Middle), Some(Index), None, None]);
        book.insert("A7", [0, 1, 0, 0], [None, Some(Index), None, None]);
        book.insert("E7", [1, 2, 0, 2], [Some(Index), Some(Middle), None, Some(Ring)]);
        book.insert("Bb", [3, 2, 1, 1], [Some(Ring), Some(Middle), Some(Index), Some(Index)]);
        book.insert("Fmaj7", [2, 4, 1, 3], [Some(Middle), Some(Pinky), Some(Index), Some(Ring)]);
        book
    }

    /// Add or replace a chord shape
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        frets: [u8; LANE_COUNT],
        fingers: [Option<Finger>; LANE_COUNT],
    ) {
        self.chords.insert(name.into(), ChordDef::new(frets, fingers));
    }

    pub fn get(&self, name: &str) -> Option<&ChordDef> {
        self.chords.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.chords.contains_key(name)
    }

    /// Chord names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.chords.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}
