/// Where random degree choices come from.
///
/// `source` returns a value in `[0, 1)` each call. The default draws from
/// fastrand's thread-local generator; tests and replays substitute their own.
pub struct RandomOptions<F = fn() -> f64>
where
    F: FnMut() -> f64,
{
    pub source: F,
}

impl RandomOptions {
    pub fn new() -> Self {
        RandomOptions {
            source: fastrand::f64,
        }
    }

    /// A reproducible source: equal seeds give equal draws.
    pub fn seeded(seed: u64) -> RandomOptions<impl FnMut() -> f64> {
        let mut rng = fastrand::Rng::with_seed(seed);
        RandomOptions {
            source: move || rng.f64(),
        }
    }
}

impl Default for RandomOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FnMut() -> f64> RandomOptions<F> {
    pub fn with_source(source: F) -> Self {
        RandomOptions { source }
    }

    /// Picks an index in `0..len`. Out-of-range or NaN draws are clamped.
    pub fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let draw = (self.source)();
        // NaN saturates to 0 in the cast.
        let index = (draw * len as f64).floor() as i64;
        index.clamp(0, len as i64 - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_stubbed() {
        assert_eq!(RandomOptions::with_source(|| 0.0).pick(7), 0);
        assert_eq!(RandomOptions::with_source(|| 0.999_999).pick(7), 6);
        assert_eq!(RandomOptions::with_source(|| 0.5).pick(4), 2);
    }

    #[test]
    fn test_pick_clamps_bad_sources() {
        assert_eq!(RandomOptions::with_source(|| 1.0).pick(5), 4);
        assert_eq!(RandomOptions::with_source(|| -0.3).pick(5), 0);
        assert_eq!(RandomOptions::with_source(|| f64::NAN).pick(5), 0);
        assert_eq!(RandomOptions::with_source(|| f64::INFINITY).pick(5), 4);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomOptions::seeded(42);
        let mut b = RandomOptions::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.pick(12), b.pick(12));
        }
    }

    #[test]
    fn test_default_stays_in_range() {
        let mut options = RandomOptions::new();
        for _ in 0..1000 {
            assert!(options.pick(5) < 5);
        }
    }
}
