use crate::common::{vec1, Int, NonEmpty};
use rand::Rng;

/// The only source of randomness used while evaluating.
///
/// `next(low, high)` must return a value uniformly distributed over the closed
/// range `[low, high]`; callers guarantee `low <= high`. Every [`rand::Rng`] is
/// a `RandomSource`, so `rand::thread_rng()` works for play and a seeded
/// `StdRng` for reproducible runs.
///
/// Implementations are free to be stateful. Evaluation borrows the source
/// mutably for its whole duration, so concurrent evaluations each need their
/// own source, or one that synchronizes internally.
pub trait RandomSource {
    fn next(&mut self, low: Int, high: Int) -> Int;
}

impl<R: Rng> RandomSource for R {
    fn next(&mut self, low: Int, high: Int) -> Int {
        self.gen_range(low..=high)
    }
}

/// Replays a fixed sequence of values.
///
/// The sequence repeats once exhausted. A value outside the requested range is
/// wrapped into it, so a script written for a d6 stays valid on a d4.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: NonEmpty<Int>,
    position: usize,
}

impl ScriptedSource {
    pub fn new(values: NonEmpty<Int>) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    pub fn from_slice(values: &[Int]) -> Option<Self> {
        NonEmpty::try_from_vec(values.to_vec()).ok().map(Self::new)
    }

    pub fn constant(value: Int) -> Self {
        Self::new(vec1![value])
    }

    /// How many values have been handed out so far.
    pub fn calls(&self) -> usize {
        self.position
    }
}

impl RandomSource for ScriptedSource {
    fn next(&mut self, low: Int, high: Int) -> Int {
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        wrap(value, low, high)
    }
}

fn wrap(value: Int, low: Int, high: Int) -> Int {
    if (low..=high).contains(&value) {
        return value;
    }
    let width = high as i128 - low as i128 + 1;
    let offset = (value as i128 - low as i128).rem_euclid(width);
    (low as i128 + offset) as Int
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_scripted_replays_and_cycles() {
        let mut source = ScriptedSource::from_slice(&[4, 5]).unwrap();
        assert_eq!(source.next(1, 6), 4);
        assert_eq!(source.next(1, 6), 5);
        assert_eq!(source.next(1, 6), 4);
        assert_eq!(source.calls(), 3);
    }

    #[test]
    fn test_scripted_wraps_into_range() {
        let mut source = ScriptedSource::from_slice(&[6, 0, 13]).unwrap();
        assert_eq!(source.next(1, 4), 2);
        assert_eq!(source.next(1, 4), 4);
        assert_eq!(source.next(1, 4), 1);
    }

    #[test]
    fn test_scripted_rejects_empty() {
        assert!(ScriptedSource::from_slice(&[]).is_none());
    }

    #[test]
    fn test_rng_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let x = RandomSource::next(&mut rng, 1, 6);
            assert!((1..=6).contains(&x));
        }
        assert_eq!(RandomSource::next(&mut rng, 3, 3), 3);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..20).map(|_| RandomSource::next(&mut rng, 1, 20)).collect()
        };
        let b: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..20).map(|_| RandomSource::next(&mut rng, 1, 20)).collect()
        };
        assert_eq!(a, b);
    }
}
