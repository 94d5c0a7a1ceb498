use std::fmt;
use std::sync::Arc;

use crate::{IntervalPattern, PatternTable, Pitch, PitchClass, RandomOptions, octave_shift};

pub const DEFAULT_OCTAVE: i32 = 4;

/// A tonic plus an interval pattern. Immutable once built.
#[derive(Clone, Debug)]
pub struct Scale {
    tonic: PitchClass,
    pattern: Arc<IntervalPattern>,
}

impl Scale {
    /// Builds a scale from the builtin pattern table.
    pub fn new(tonic: &str, pattern: &str) -> Result<Self, ScaleError> {
        Self::with_table(tonic, pattern, PatternTable::global())
    }

    pub fn with_table(tonic: &str, pattern: &str, table: &PatternTable) -> Result<Self, ScaleError> {
        let resolved = table
            .lookup(pattern)
            .ok_or_else(|| ScaleError::InvalidPattern(pattern.to_string()))?;
        let tonic: PitchClass = tonic.parse()?;
        tracing::debug!("built scale {tonic} {pattern} ({} degrees)", resolved.len());
        Ok(Scale {
            tonic,
            pattern: resolved,
        })
    }

    pub fn tonic(&self) -> PitchClass {
        self.tonic
    }

    pub fn pattern(&self) -> &IntervalPattern {
        &self.pattern
    }

    pub fn pattern_name(&self) -> &str {
        &self.pattern.name
    }

    /// Semitones from `C` up to the tonic.
    pub fn tonic_offset(&self) -> u8 {
        self.tonic.index()
    }

    /// Degrees per cycle.
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    /// Always false: every pattern has at least one degree.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Pitch at a signed scale degree, relative to `octave`.
    ///
    /// Degree 0 is the tonic in `octave`. Positive degrees climb the pattern,
    /// negative degrees descend it, and the octave moves whenever the running
    /// semitone total crosses a multiple of 12 (floor division, so a total of
    /// -1 lands in the octave below).
    pub fn note(&self, degree: i32, octave: i32) -> Pitch {
        self.resolve(degree as i64, octave)
    }

    /// One ascending cycle starting at the tonic.
    pub fn notes(&self, octave: i32) -> Vec<Pitch> {
        self.notes_counted(octave, self.len() as i32)
    }

    /// `|count|` consecutive degrees from the tonic; a negative count descends.
    pub fn notes_counted(&self, octave: i32, count: i32) -> Vec<Pitch> {
        let descending = count < 0;
        (0..count.unsigned_abs())
            .map(|i| {
                let i = i as i64;
                let degree = if descending { -i } else { i };
                self.resolve(degree, octave)
            })
            .collect()
    }

    /// Ascending cycles for every octave in `start..=end`; empty when `start > end`.
    pub fn notes_in_range(&self, start: i32, end: i32) -> Vec<Pitch> {
        (start..=end).flat_map(|octave| self.notes(octave)).collect()
    }

    /// A uniformly chosen degree in `0..len`, from fastrand's thread-local generator.
    pub fn random_note(&self, octave: i32) -> Pitch {
        self.random_note_with(octave, &mut RandomOptions::new())
    }

    pub fn random_note_with<F: FnMut() -> f64>(
        &self,
        octave: i32,
        options: &mut RandomOptions<F>,
    ) -> Pitch {
        let degree = options.pick(self.len());
        self.note(degree as i32, octave)
    }

    /// Pitch class labelled by the raw pattern step at the reduced degree.
    ///
    /// This is `tonic + step[degree mod len]`, not a cumulative sum, so it
    /// differs from `note(degree, _).class` for most degrees.
    pub fn note_name(&self, degree: i32) -> PitchClass {
        let step = self.pattern.step(degree as i64);
        PitchClass::from_index(self.tonic_offset() as i64 + step as i64)
    }

    // Takes i64 because `notes_counted` can reach |i32::MIN|.
    fn resolve(&self, degree: i64, octave: i32) -> Pitch {
        if degree == 0 {
            return Pitch::new(self.tonic, octave as i64);
        }
        let total = self.tonic_offset() as i64 + self.pattern.offset(degree);
        Pitch::new(
            PitchClass::from_index(total),
            octave as i64 + octave_shift(total),
        )
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let notes: Vec<String> = self
            .notes(DEFAULT_OCTAVE)
            .iter()
            .map(|p| p.to_string())
            .collect();
        write!(f, "{} {}: {}", self.tonic, self.pattern.name, notes.join(" "))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScaleError {
    InvalidTonic(String),
    InvalidPattern(String),
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleError::InvalidTonic(name) => write!(f, "unknown tonic: {name}"),
            ScaleError::InvalidPattern(name) => write!(f, "unknown scale pattern: {name}"),
        }
    }
}

impl std::error::Error for ScaleError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pitches: &[Pitch]) -> Vec<String> {
        pitches.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_c_major_ascending_and_descending() {
        let scale = Scale::new("C", "major").unwrap();
        assert_eq!(
            names(&scale.notes_counted(4, 7)),
            ["C4", "D4", "E4", "F4", "G4", "A4", "B4"]
        );
        assert_eq!(
            names(&scale.notes_counted(4, -7)),
            ["C4", "B3", "A3", "G3", "F3", "E3", "D3"]
        );
    }

    #[test]
    fn test_a_minor_pentatonic() {
        let scale = Scale::new("A", "minorPentatonic").unwrap();
        assert_eq!(names(&scale.notes(3)), ["A3", "C4", "D4", "E4", "G4"]);
    }

    #[test]
    fn test_degree_zero_is_tonic() {
        for tonic in PitchClass::ALL {
            let scale = Scale::new(tonic.name(), "harmonicMinor").unwrap();
            for octave in -3..10 {
                assert_eq!(scale.note(0, octave), Pitch::new(tonic, octave as i64));
                assert_eq!(
                    scale.note(0, octave).to_string(),
                    format!("{}{}", tonic.name(), octave)
                );
            }
        }
    }

    #[test]
    fn test_octave_shift_consistency() {
        let scale = Scale::new("F#", "minor").unwrap();
        for degree in -40..40 {
            for octave in -2..6 {
                let low = scale.note(degree, octave);
                let high = scale.note(degree, octave + 1);
                assert_eq!(low.class, high.class);
                assert_eq!(high.octave - low.octave, 1);
            }
        }
    }

    #[test]
    fn test_full_cycle_returns_to_tonic() {
        for name in ["major", "minor", "harmonicMinor", "majorPentatonic", "minorPentatonic"] {
            for tonic in PitchClass::ALL {
                let scale = Scale::new(tonic.name(), name).unwrap();
                let len = scale.len() as i32;
                assert_eq!(scale.note(len, 4), Pitch::new(tonic, 5));
                assert_eq!(scale.note(-len, 4), Pitch::new(tonic, 3));
                assert_eq!(scale.note(3 * len, 4), Pitch::new(tonic, 7));
            }
        }
    }

    #[test]
    fn test_degree_past_pattern_length() {
        let scale = Scale::new("C", "major").unwrap();
        assert_eq!(scale.note(7, 4).to_string(), "C5");
        assert_eq!(scale.note(8, 4).to_string(), "D5");
        assert_eq!(scale.note(-8, 4).to_string(), "B2");
        assert_eq!(scale.note(-1, 4).to_string(), "B3");
    }

    #[test]
    fn test_descending_from_high_tonic() {
        // total semitones go negative only below C
        let scale = Scale::new("B", "major").unwrap();
        assert_eq!(scale.note(-1, 4).to_string(), "A#4");
        assert_eq!(scale.note(1, 4).to_string(), "C#5");
        let scale = Scale::new("C#", "minorPentatonic").unwrap();
        assert_eq!(scale.note(-1, 4).to_string(), "B3");
    }

    #[test]
    fn test_negative_octave_strings() {
        let scale = Scale::new("C", "major").unwrap();
        assert_eq!(scale.note(0, -1).to_string(), "C-1");
        assert_eq!(scale.note(-1, 0).to_string(), "B-1");
    }

    #[test]
    fn test_steps_are_monotonic() {
        let scale = Scale::new("D", "blues").unwrap();
        let run = scale.notes_counted(2, 30);
        for pair in run.windows(2) {
            assert!(pair[1].semitone() > pair[0].semitone());
        }
        let run = scale.notes_counted(2, -30);
        for pair in run.windows(2) {
            assert!(pair[1].semitone() < pair[0].semitone());
        }
    }

    #[test]
    fn test_extreme_degrees_do_not_overflow() {
        let scale = Scale::new("G", "major").unwrap();
        let top = scale.note(i32::MAX, i32::MAX);
        let bottom = scale.note(i32::MIN, i32::MIN);
        assert!(top.octave > i32::MAX as i64);
        assert!(bottom.octave < i32::MIN as i64);
    }

    #[test]
    fn test_notes_is_restartable() {
        let scale = Scale::new("E", "dorian").unwrap();
        assert_eq!(scale.notes(4), scale.notes(4));
        assert_eq!(scale.notes(4).len(), 7);
        assert!(!scale.is_empty());
        assert!(scale.notes_counted(4, 0).is_empty());
    }

    #[test]
    fn test_notes_in_range() {
        let scale = Scale::new("C", "majorPentatonic").unwrap();
        assert_eq!(scale.notes_in_range(4, 4), scale.notes(4));
        assert!(scale.notes_in_range(5, 4).is_empty());
        let span = scale.notes_in_range(3, 5);
        assert_eq!(span.len(), 15);
        assert_eq!(span[0].to_string(), "C3");
        assert_eq!(span[5].to_string(), "C4");
        assert_eq!(span[14].to_string(), "A5");
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(
            Scale::new("H", "major").unwrap_err(),
            ScaleError::InvalidTonic("H".to_string())
        );
        assert_eq!(
            Scale::new("C", "bogus").unwrap_err(),
            ScaleError::InvalidPattern("bogus".to_string())
        );
        // pattern is resolved first
        assert_eq!(
            Scale::new("H", "bogus").unwrap_err(),
            ScaleError::InvalidPattern("bogus".to_string())
        );
    }

    #[test]
    fn test_custom_table() {
        let mut table = PatternTable::empty();
        table.insert("fifths", vec![7]).unwrap();
        let scale = Scale::with_table("C", "fifths", &table).unwrap();
        assert_eq!(names(&scale.notes_counted(4, 3)), ["C4", "G4", "D5"]);
        assert!(Scale::with_table("C", "major", &table).is_err());
    }

    #[test]
    fn test_random_note_stubbed() {
        let scale = Scale::new("D", "minor").unwrap();
        let mut zero = RandomOptions::with_source(|| 0.0);
        assert_eq!(scale.random_note_with(5, &mut zero).to_string(), "D5");
        let mut top = RandomOptions::with_source(|| 0.999_999_9);
        assert_eq!(scale.random_note_with(5, &mut top), scale.note(6, 5));
    }

    #[test]
    fn test_random_note_stays_in_cycle() {
        let scale = Scale::new("A", "majorPentatonic").unwrap();
        let cycle = scale.notes(4);
        for _ in 0..200 {
            assert!(cycle.contains(&scale.random_note(4)));
        }
        let mut seeded = RandomOptions::seeded(7);
        for _ in 0..200 {
            assert!(cycle.contains(&scale.random_note_with(4, &mut seeded)));
        }
    }

    #[test]
    fn test_note_name_is_raw_step_lookup() {
        let scale = Scale::new("C", "major").unwrap();
        // steps [2,2,1,2,2,2,1] -> C+2, C+2, C+1, ...
        assert_eq!(scale.note_name(0), PitchClass::D);
        assert_eq!(scale.note_name(2), PitchClass::CSharp);
        assert_eq!(scale.note_name(6), PitchClass::CSharp);
        assert_eq!(scale.note_name(7), PitchClass::D);
        assert_eq!(scale.note_name(-1), PitchClass::CSharp);
        // differs from the cumulative pitch
        assert_ne!(scale.note_name(2), scale.note(2, 4).class);

        let scale = Scale::new("B", "minorPentatonic").unwrap();
        assert_eq!(scale.note_name(0), PitchClass::D);
    }

    #[test]
    fn test_display() {
        let scale = Scale::new("C", "major").unwrap();
        assert_eq!(scale.to_string(), "C major: C4 D4 E4 F4 G4 A4 B4");
    }

    #[test]
    fn test_scale_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Scale>();

        let scale = Scale::new("G", "mixolydian").unwrap();
        let expected = scale.notes_in_range(2, 6);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let scale = scale.clone();
                std::thread::spawn(move || scale.notes_in_range(2, 6))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }
}
