use log::debug;

use crate::constants::{ EPSILON, UNPULLED_ESTIMATE };
use crate::random_source::RandomSource;

/// Observed number of survivals and deaths for each medicine. Index is the
/// medicine's position in the session's medicine list.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ArmCounts {
    counts: Vec<(u32, u32)>,
}

impl ArmCounts {
    /// Zeroed counts for `num_of_arms` medicines.
    pub fn new(num_of_arms: usize) -> Self {
        ArmCounts {
            counts: vec![(0, 0); num_of_arms],
        }
    }

    /// Counts from `(successes, failures)` pairs.
    pub fn from_pairs(counts: Vec<(u32, u32)>) -> Self {
        ArmCounts { counts }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn successes(&self, arm: usize) -> u32 {
        self.counts[arm].0
    }

    pub fn failures(&self, arm: usize) -> u32 {
        self.counts[arm].1
    }

    pub fn pulls(&self, arm: usize) -> u32 {
        self.successes(arm) + self.failures(arm)
    }

    pub fn as_pairs(&self) -> &[(u32, u32)] {
        &self.counts
    }

    pub fn record(&mut self, arm: usize, survived: bool) {
        let (successes, failures) = &mut self.counts[arm];
        if survived {
            *successes += 1;
        } else {
            *failures += 1;
        }
    }

    /// Empirical survival rate of the arm, or `UNPULLED_ESTIMATE` when the
    /// arm has not been pulled yet.
    pub fn estimate(&self, arm: usize) -> f64 {
        let pulls = self.pulls(arm);
        if pulls == 0 {
            return UNPULLED_ESTIMATE;
        }
        (self.successes(arm) as f64) / (pulls as f64)
    }
}

/// Arm with the highest estimate. Ties go to the lowest index: arms are
/// scanned in order and the best is replaced only on a strictly greater
/// estimate. Returns 0 when there are no arms.
pub fn greedy_choice(arm_counts: &ArmCounts) -> usize {
    let mut best_estimate = f64::NEG_INFINITY;
    let mut choice = 0;
    for arm in 0..arm_counts.len() {
        let estimate = arm_counts.estimate(arm);
        if estimate > best_estimate {
            best_estimate = estimate;
            choice = arm;
        }
    }
    choice
}

/// With probability `epsilon` picks a uniformly random arm, otherwise the
/// greedy arm. The explore decision takes one draw and the random arm, when
/// exploring, takes one more.
pub fn epsilon_greedy_choice(
    arm_counts: &ArmCounts,
    epsilon: f64,
    source: &mut impl RandomSource
) -> usize {
    assert!((0.0..=1.0).contains(&epsilon), "Epsilon must be in the range [0, 1].");
    if source.next_uniform() < epsilon {
        let choice = source.next_index(arm_counts.len());
        debug!("# Random Action selected :{} #", choice);
        return choice;
    }
    greedy_choice(arm_counts)
}

/// Scripted way of choosing a medicine, used for the baselines.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Policy {
    Greedy,
    EpsilonGreedy {
        epsilon: f64,
    },
}

impl Policy {
    /// Epsilon-greedy with the standard `EPSILON`.
    pub fn epsilon_greedy() -> Self {
        Policy::EpsilonGreedy { epsilon: EPSILON }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Greedy => "Greedy",
            Policy::EpsilonGreedy { .. } => "Epsilon-Greedy",
        }
    }

    pub fn choose(&self, arm_counts: &ArmCounts, source: &mut impl RandomSource) -> usize {
        match *self {
            Policy::Greedy => greedy_choice(arm_counts),
            Policy::EpsilonGreedy { epsilon } => epsilon_greedy_choice(arm_counts, epsilon, source),
        }
    }
}
