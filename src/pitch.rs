use nom::{
    Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{all_consuming, opt},
};
use std::fmt;
use std::str::FromStr;

use crate::ScaleError;

pub const SEMITONES_PER_OCTAVE: i64 = 12;

/// One of the twelve sharp-spelled pitch classes, `C` through `B`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// The alphabet, ordered by ascending semitone above `C`.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Wraps any semitone count onto the alphabet (12 is `C`, -1 is `B`).
    pub fn from_index(index: i64) -> Self {
        Self::ALL[wrap_pitch_class(index)]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|pc| pc.name() == name)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ScaleError::InvalidTonic(s.to_string()))
    }
}

/// Floor-modulo of a signed semitone total into `0..12`.
pub fn wrap_pitch_class(total: i64) -> usize {
    total.rem_euclid(SEMITONES_PER_OCTAVE) as usize
}

/// Floor division of a signed semitone total by 12 (-1 maps to -1, not 0).
pub fn octave_shift(total: i64) -> i64 {
    total.div_euclid(SEMITONES_PER_OCTAVE)
}

/// A pitch class in a specific octave, rendered as `<name><octave>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub class: PitchClass,
    pub octave: i64,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: i64) -> Self {
        Pitch { class, octave }
    }

    /// Absolute semitone position, with `C0` at 0.
    pub fn semitone(&self) -> i64 {
        self.octave * SEMITONES_PER_OCTAVE + self.class.index() as i64
    }

    pub fn transpose(&self, semitones: i64) -> Pitch {
        let total = self.class.index() as i64 + semitones;
        Pitch {
            class: PitchClass::from_index(total),
            octave: self.octave + octave_shift(total),
        }
    }
}

impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.octave
            .cmp(&other.octave)
            .then(self.class.cmp(&other.class))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class.name(), self.octave)
    }
}

impl FromStr for Pitch {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match all_consuming(parse_pitch).parse(s) {
            Ok((_, pitch)) => Ok(pitch),
            Err(_) => Err(ParseError::Pitch(s.to_string())),
        }
    }
}

fn parse_letter(input: &str) -> nom::IResult<&str, u8> {
    alt((
        char('C').map(|_| 0u8),
        char('D').map(|_| 2u8),
        char('E').map(|_| 4u8),
        char('F').map(|_| 5u8),
        char('G').map(|_| 7u8),
        char('A').map(|_| 9u8),
        char('B').map(|_| 11u8),
    ))
    .parse(input)
}

fn parse_pitch_class(input: &str) -> nom::IResult<&str, PitchClass> {
    let (input, natural) = parse_letter(input)?;
    let (input, sharp) = opt(tag("#")).parse(input)?;
    let index = natural + sharp.map_or(0, |_| 1);
    // E# and B# are not alphabet entries.
    if sharp.is_some() && (natural == 4 || natural == 11) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((input, PitchClass::from_index(index as i64)))
}

pub(crate) fn parse_signed(input: &str) -> nom::IResult<&str, i64> {
    let (input, sign) = opt(char('-')).parse(input)?;
    let (rest, digits) = digit1.parse(input)?;
    let val: i64 = digits.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((rest, if sign.is_some() { -val } else { val }))
}

fn parse_pitch(input: &str) -> nom::IResult<&str, Pitch> {
    let (input, class) = parse_pitch_class(input)?;
    let (input, octave) = parse_signed(input)?;
    Ok((input, Pitch { class, octave }))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    Pitch(String),
    Phrase { position: usize, message: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Pitch(input) => write!(f, "not a pitch: {input:?}"),
            ParseError::Phrase { position, message } => {
                write!(f, "phrase error at {position}: {message}")
            }
        }
    }
}

impl std::error::Error for ParseError {}
