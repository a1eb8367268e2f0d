use std::time::Instant;

use log::info;
use rayon::prelude::*;

use crate::environments::medicine::Medicine;
use crate::environments::population::{ generate_patients, CategoryWeights };
use crate::policies::Policy;
use crate::random_source::SeededStream;
use crate::session::{ baseline_run, require_medicines, PolicyRun, SessionError };

/// Baseline results for one independently generated patient queue.
#[derive(PartialEq, Debug, Clone)]
pub struct BaselineComparison {
    pub seed: u64,
    pub greedy: Option<PolicyRun>,
    pub epsilon_greedy: Option<PolicyRun>,
}

impl BaselineComparison {
    fn new(seed: u64) -> Self {
        BaselineComparison {
            seed,
            greedy: None,
            epsilon_greedy: None,
        }
    }

    /// Generates the patients and runs both baselines, consuming the
    /// session's stream in the same order as `Session::new`.
    fn run(
        &mut self,
        num_of_patients: usize,
        medicines: &[Medicine],
        weights: &CategoryWeights
    ) -> Result<(), SessionError> {
        let mut source = SeededStream::from_seed(self.seed);
        let patients = generate_patients(num_of_patients, weights, &mut source);
        self.greedy = Some(baseline_run(Policy::Greedy, &patients, medicines, &mut source)?);
        self.epsilon_greedy = Some(
            baseline_run(Policy::epsilon_greedy(), &patients, medicines, &mut source)?
        );
        Ok(())
    }
}

/// Averages over all sessions of a batch.
#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub struct BatchSummary {
    pub num_of_sessions: usize,
    pub mean_greedy_survived: f64,
    pub mean_epsilon_greedy_survived: f64,
    pub greedy_wins: usize,
    pub epsilon_greedy_wins: usize,
    pub ties: usize,
}

/// This struct allows to compare the baselines over many sessions run in
/// parallel. Session `i` uses the seed `base_seed + i`, so a batch gives the
/// same results as playing those sessions one after another.
#[derive(Debug)]
pub struct BaselineBatchRunner {
    pub num_of_sessions: usize,
    pub num_of_patients: usize,
    medicines: Vec<Medicine>,
    weights: CategoryWeights,
    pub comparisons: Vec<BaselineComparison>,
}

impl BaselineBatchRunner {
    pub fn new(
        num_of_sessions: usize,
        num_of_patients: usize,
        medicines: Vec<Medicine>,
        weights: CategoryWeights,
        base_seed: u64
    ) -> Result<Self, SessionError> {
        require_medicines(&medicines)?;
        let comparisons = (0..num_of_sessions as u64)
            .map(|index| BaselineComparison::new(base_seed.wrapping_add(index)))
            .collect();

        Ok(BaselineBatchRunner {
            num_of_sessions,
            num_of_patients,
            medicines,
            weights,
            comparisons,
        })
    }

    pub fn run_all_sessions_in_parallel(&mut self) -> Result<(), SessionError> {
        let start_time = Instant::now();
        let num_of_patients = self.num_of_patients;
        let medicines = &self.medicines;
        let weights = &self.weights;
        self.comparisons
            .par_iter_mut()
            .try_for_each(|comparison| comparison.run(num_of_patients, medicines, weights))?;
        let elapsed_time = start_time.elapsed();
        info!("# Parallel Run: {} sessions, elapsed time: {:.2?}", self.num_of_sessions, elapsed_time);
        Ok(())
    }

    /// Summary over the sessions that have been run. Sessions not run yet
    /// are skipped.
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut greedy_total = 0.0;
        let mut epsilon_greedy_total = 0.0;

        for comparison in &self.comparisons {
            let (greedy, epsilon_greedy) = match (&comparison.greedy, &comparison.epsilon_greedy) {
                (Some(greedy), Some(epsilon_greedy)) => (greedy, epsilon_greedy),
                _ => {
                    continue;
                }
            };
            summary.num_of_sessions += 1;
            greedy_total += greedy.result.survived as f64;
            epsilon_greedy_total += epsilon_greedy.result.survived as f64;
            match greedy.result.survived.cmp(&epsilon_greedy.result.survived) {
                std::cmp::Ordering::Greater => {
                    summary.greedy_wins += 1;
                }
                std::cmp::Ordering::Less => {
                    summary.epsilon_greedy_wins += 1;
                }
                std::cmp::Ordering::Equal => {
                    summary.ties += 1;
                }
            }
        }

        if summary.num_of_sessions > 0 {
            summary.mean_greedy_survived = greedy_total / (summary.num_of_sessions as f64);
            summary.mean_epsilon_greedy_survived =
                epsilon_greedy_total / (summary.num_of_sessions as f64);
        }
        summary
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::session::Session;

    fn medicines() -> Vec<Medicine> {
        vec![
            Medicine::new("Medicine A", [0.8, 0.6, 0.7, 0.5]),
            Medicine::new("Medicine B", [0.6, 0.7, 0.8, 0.5]),
            Medicine::new("Medicine C", [0.5, 0.5, 0.6, 0.8])
        ]
    }

    #[test]
    fn test_batch_runner_creation() {
        let runner = BaselineBatchRunner::new(8, 20, medicines(), CategoryWeights::uniform(), 100).unwrap();

        assert_eq!(runner.num_of_sessions, 8);
        assert_eq!(runner.comparisons.len(), 8);
        assert_eq!(runner.comparisons[3].seed, 103);
        assert!(runner.comparisons.iter().all(|c| c.greedy.is_none() && c.epsilon_greedy.is_none()));
        assert_eq!(runner.summary(), BatchSummary::default());
    }

    #[test]
    fn test_batch_runner_without_medicines_is_rejected() {
        let result = BaselineBatchRunner::new(4, 10, vec![], CategoryWeights::uniform(), 0);

        assert!(matches!(result, Err(SessionError::InvalidArgument(_))));
    }

    #[test]
    fn test_run_all_sessions_records_results() {
        let mut runner = BaselineBatchRunner::new(16, 30, medicines(), CategoryWeights::uniform(), 1).unwrap();

        runner.run_all_sessions_in_parallel().unwrap();

        for comparison in &runner.comparisons {
            let greedy = comparison.greedy.as_ref().expect("Greedy results are not recorded");
            let epsilon_greedy = comparison.epsilon_greedy
                .as_ref()
                .expect("Epsilon-greedy results are not recorded");
            assert_eq!(greedy.survival_trace.len(), 31);
            assert_eq!(epsilon_greedy.choices.len(), 30);
        }
        let summary = runner.summary();
        assert_eq!(summary.num_of_sessions, 16);
        assert_eq!(summary.greedy_wins + summary.epsilon_greedy_wins + summary.ties, 16);
        assert!((0.0..=30.0).contains(&summary.mean_greedy_survived));
        assert!((0.0..=30.0).contains(&summary.mean_epsilon_greedy_survived));
    }

    #[test]
    fn test_parallel_results_match_sessions_with_same_seed() {
        let mut runner = BaselineBatchRunner::new(4, 25, medicines(), CategoryWeights::uniform(), 50).unwrap();

        runner.run_all_sessions_in_parallel().unwrap();

        for comparison in &runner.comparisons {
            let session = Session::new(
                25,
                medicines(),
                &CategoryWeights::uniform(),
                SeededStream::from_seed(comparison.seed)
            ).unwrap();
            assert_eq!(comparison.greedy.as_ref(), Some(session.greedy_baseline()));
            assert_eq!(comparison.epsilon_greedy.as_ref(), Some(session.epsilon_greedy_baseline()));
        }
    }
}
