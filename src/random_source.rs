use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };

/// Handle to a stream of random draws. Every function that needs randomness
/// takes one explicitly, so a session, each baseline and each test decide
/// which stream is consumed and in which order.
///
/// Both methods consume exactly one draw from the stream.
pub trait RandomSource {
    /// Generates random number in range: [0; 1)
    fn next_uniform(&mut self) -> f64;

    /// Generates random number in range: [0, upper)
    fn next_index(&mut self, upper: usize) -> usize {
        assert!(upper > 0, "Cannot pick an index from an empty range!");
        let index = (self.next_uniform() * (upper as f64)) as usize;
        index.min(upper - 1)
    }
}

/// Pseudo-random stream backed by `StdRng`. Two streams created from the
/// same seed produce identical draws.
#[derive(Debug, Clone)]
pub struct SeededStream {
    rng: StdRng,
}

impl SeededStream {
    pub fn from_seed(seed: u64) -> Self {
        SeededStream {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Non reproducible stream seeded from the operating system.
    pub fn from_entropy() -> Self {
        SeededStream {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededStream {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen()
    }

    fn next_index(&mut self, upper: usize) -> usize {
        assert!(upper > 0, "Cannot pick an index from an empty range!");
        self.rng.gen_range(0..upper)
    }
}

/// Replays a fixed list of uniform draws. Panics when the script runs out,
/// which means a caller consumed more draws than expected.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    draws: std::collections::VecDeque<f64>,
}

#[cfg(test)]
impl ScriptedDraws {
    pub fn new(draws: &[f64]) -> Self {
        ScriptedDraws {
            draws: draws.iter().copied().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

#[cfg(test)]
impl RandomSource for ScriptedDraws {
    fn next_uniform(&mut self) -> f64 {
        self.draws.pop_front().expect("Scripted draws exhausted")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_uniform_draws_within_range() {
        let mut stream = SeededStream::from_seed(7);
        for _ in 0..1000 {
            let number = stream.next_uniform();

            assert!(
                (0.0..1.0).contains(&number),
                "Generated random number is not within the range [0, 1): {}",
                number
            );
        }
    }

    #[test]
    fn test_index_draws_within_range() {
        let upper = 10;
        let mut stream = SeededStream::from_seed(7);
        for _ in 0..1000 {
            let number = stream.next_index(upper);
            assert!(number < upper, "Index {} is not below {}", number, upper);
        }
    }

    #[test]
    #[should_panic(expected = "Cannot pick an index from an empty range!")]
    fn test_index_draw_from_empty_range() {
        SeededStream::from_seed(1).next_index(0);
    }

    #[test]
    fn test_same_seed_gives_same_draws() {
        let mut first = SeededStream::from_seed(42);
        let mut second = SeededStream::from_seed(42);

        for _ in 0..100 {
            assert_eq!(first.next_uniform(), second.next_uniform());
            assert_eq!(first.next_index(3), second.next_index(3));
        }
    }

    #[test]
    fn test_scripted_index_uses_one_draw() {
        let mut draws = ScriptedDraws::new(&[0.0, 0.34, 0.999, 0.5]);

        assert_eq!(draws.next_index(3), 0);
        assert_eq!(draws.next_index(3), 1);
        assert_eq!(draws.next_index(3), 2);
        assert_eq!(draws.remaining(), 1);
    }

    #[test]
    #[should_panic(expected = "Scripted draws exhausted")]
    fn test_scripted_draws_run_out() {
        let mut draws = ScriptedDraws::new(&[0.5]);
        draws.next_uniform();
        draws.next_uniform();
    }
}
