use std::collections::BTreeMap;

use crate::{Phrase, Pitch, RandomOptions, Scale};

/// Playback parameters handed through to the sound engine untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Strike {
    /// Engine-specific length, e.g. `"8n"` or `"0.5"`.
    pub duration: String,
    /// Start offset in the engine's clock, or `None` for immediately.
    pub time: Option<f64>,
    pub velocity: f32,
}

impl Default for Strike {
    fn default() -> Self {
        Strike {
            duration: "8n".to_string(),
            time: None,
            velocity: 0.8,
        }
    }
}

/// Anything that can sound a pitch.
pub trait PitchSink {
    fn play_pitch(&mut self, pitch: &Pitch, strike: &Strike);
}

impl<F: FnMut(&Pitch, &Strike)> PitchSink for F {
    fn play_pitch(&mut self, pitch: &Pitch, strike: &Strike) {
        self(pitch, strike)
    }
}

pub type Overrides = BTreeMap<String, f64>;

/// Builds named, parameterised sound sources (`"mono"`, `"fm"`, ...).
pub trait SoundSourceFactory {
    type Source;
    type Error;

    fn create(&mut self, kind: &str, overrides: &Overrides) -> Result<Self::Source, Self::Error>;
}

/// Feeds pitches from a scale into a sink.
pub struct Performer<S> {
    scale: Scale,
    sink: S,
    strike: Strike,
}

impl<S: PitchSink> Performer<S> {
    pub fn new(scale: Scale, sink: S) -> Self {
        Performer {
            scale,
            sink,
            strike: Strike::default(),
        }
    }

    pub fn from_factory<F>(
        scale: Scale,
        factory: &mut F,
        kind: &str,
        overrides: &Overrides,
    ) -> Result<Self, F::Error>
    where
        F: SoundSourceFactory<Source = S>,
    {
        let sink = factory.create(kind, overrides)?;
        tracing::debug!("created {kind} source for {}", scale.pattern_name());
        Ok(Performer::new(scale, sink))
    }

    pub fn strike(&mut self, strike: Strike) -> &mut Self {
        self.strike = strike;
        self
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn play_degree(&mut self, degree: i32, octave: i32) -> Pitch {
        let pitch = self.scale.note(degree, octave);
        self.sink.play_pitch(&pitch, &self.strike);
        pitch
    }

    pub fn play_run(&mut self, octave: i32, count: i32) -> Vec<Pitch> {
        let pitches = self.scale.notes_counted(octave, count);
        for pitch in &pitches {
            self.sink.play_pitch(pitch, &self.strike);
        }
        pitches
    }

    /// Rests are returned as `None` and skipped.
    pub fn play_phrase(&mut self, phrase: &Phrase, octave: i32) -> Vec<Option<Pitch>> {
        let pitches = phrase.render(&self.scale, octave);
        for pitch in pitches.iter().flatten() {
            self.sink.play_pitch(pitch, &self.strike);
        }
        pitches
    }

    pub fn play_random<F: FnMut() -> f64>(
        &mut self,
        octave: i32,
        options: &mut RandomOptions<F>,
    ) -> Pitch {
        let pitch = self.scale.random_note_with(octave, options);
        self.sink.play_pitch(&pitch, &self.strike);
        pitch
    }
}
