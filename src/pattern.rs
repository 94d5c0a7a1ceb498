use std::fmt;
use std::sync::{Arc, LazyLock};

/// A named, cyclic sequence of semitone steps between consecutive degrees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntervalPattern {
    pub name: String,
    steps: Vec<u8>,
}

impl IntervalPattern {
    pub fn new(name: impl Into<String>, steps: Vec<u8>) -> Result<Self, PatternError> {
        let name = name.into();
        if steps.is_empty() {
            return Err(PatternError::Empty { name });
        }
        if let Some(index) = steps.iter().position(|&s| s == 0) {
            return Err(PatternError::ZeroStep { name, index });
        }
        Ok(IntervalPattern { name, steps })
    }

    pub fn steps(&self) -> &[u8] {
        &self.steps
    }

    /// Number of distinct degrees per cycle. Never zero.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: `new` rejects empty step lists.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Semitones covered by one full cycle.
    pub fn span(&self) -> i64 {
        self.steps.iter().map(|&s| s as i64).sum()
    }

    /// Step leaving the given position, wrapping both ways.
    pub fn step(&self, index: i64) -> u8 {
        self.steps[index.rem_euclid(self.len() as i64) as usize]
    }

    /// Signed semitone distance from degree 0 to `degree`.
    ///
    /// Walking up adds `step(0) .. step(degree - 1)`; walking down subtracts
    /// `step(-1) .. step(degree)`. Both collapse to whole cycles plus a prefix
    /// of the pattern.
    pub fn offset(&self, degree: i64) -> i64 {
        let len = self.len() as i64;
        let cycles = degree.div_euclid(len);
        let rem = degree.rem_euclid(len) as usize;
        let prefix: i64 = self.steps[..rem].iter().map(|&s| s as i64).sum();
        cycles * self.span() + prefix
    }
}

impl fmt::Display for IntervalPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.steps.iter().map(|s| s.to_string()).collect();
        write!(f, "{} [{}]", self.name, steps.join(", "))
    }
}

const BUILTIN: &[(&str, &[u8])] = &[
    ("major", &[2, 2, 1, 2, 2, 2, 1]),
    ("minor", &[2, 1, 2, 2, 1, 2, 2]),
    ("harmonicMinor", &[2, 1, 2, 2, 1, 3, 1]),
    ("majorPentatonic", &[2, 2, 3, 2, 3]),
    ("minorPentatonic", &[3, 2, 2, 3, 2]),
    ("dorian", &[2, 1, 2, 2, 2, 1, 2]),
    ("phrygian", &[1, 2, 2, 2, 1, 2, 2]),
    ("lydian", &[2, 2, 2, 1, 2, 2, 1]),
    ("mixolydian", &[2, 2, 1, 2, 2, 1, 2]),
    ("locrian", &[1, 2, 2, 1, 2, 2, 2]),
    ("blues", &[3, 2, 1, 1, 3, 2]),
    ("chromatic", &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]),
];

static GLOBAL: LazyLock<PatternTable> = LazyLock::new(PatternTable::builtin);

/// Registry of interval patterns keyed by name, in registration order.
#[derive(Clone, Debug, Default)]
pub struct PatternTable {
    patterns: Vec<Arc<IntervalPattern>>,
}

impl PatternTable {
    pub fn empty() -> Self {
        PatternTable::default()
    }

    pub fn builtin() -> Self {
        let patterns = BUILTIN
            .iter()
            .map(|(name, steps)| {
                Arc::new(IntervalPattern {
                    name: name.to_string(),
                    steps: steps.to_vec(),
                })
            })
            .collect();
        PatternTable { patterns }
    }

    /// The shared, never-mutated builtin table.
    pub fn global() -> &'static PatternTable {
        &GLOBAL
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<IntervalPattern>> {
        self.patterns.iter().find(|p| p.name == name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<IntervalPattern>> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Registers a pattern, replacing any existing one with the same name.
    pub fn insert(&mut self, name: &str, steps: Vec<u8>) -> Result<(), PatternError> {
        let pattern = Arc::new(IntervalPattern::new(name, steps)?);
        match self.patterns.iter_mut().find(|p| p.name == name) {
            Some(slot) => {
                tracing::debug!("replacing interval pattern {name}");
                *slot = pattern;
            }
            None => self.patterns.push(pattern),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternError {
    Empty { name: String },
    ZeroStep { name: String, index: usize },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Empty { name } => write!(f, "pattern {name} has no steps"),
            PatternError::ZeroStep { name, index } => {
                write!(f, "pattern {name} has a zero step at index {index}")
            }
        }
    }
}

impl std::error::Error for PatternError {}
