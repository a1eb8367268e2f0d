use log::{ debug, warn };

use crate::environments::patient::{ Category, Patient };
use crate::random_source::RandomSource;

/// Relative frequency of each patient category, in `Category::ALL` order.
/// Weights do not have to sum to one.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct CategoryWeights {
    weights: [f64; Category::COUNT],
}

impl Default for CategoryWeights {
    fn default() -> Self {
        CategoryWeights::uniform()
    }
}

impl CategoryWeights {
    pub fn new(weights: [f64; Category::COUNT]) -> Self {
        CategoryWeights { weights }
    }

    pub fn uniform() -> Self {
        CategoryWeights { weights: [0.25; Category::COUNT] }
    }

    pub fn weight(&self, category: Category) -> f64 {
        self.weights[category.index()]
    }

    /// Weights scaled to sum to one. Negative or non finite weights, or
    /// weights that are all zero, fall back to the uniform distribution.
    pub fn normalized(&self) -> [f64; Category::COUNT] {
        let is_valid = self.weights.iter().all(|weight| weight.is_finite() && *weight >= 0.0);
        let total: f64 = self.weights.iter().sum();
        if !is_valid || total <= 0.0 || !total.is_finite() {
            warn!("Invalid patient category weights {:?}, using uniform weights", self.weights);
            return CategoryWeights::uniform().weights;
        }
        self.weights.map(|weight| weight / total)
    }
}

/// Draws a category from normalized probabilities using one uniform draw.
fn sample_category(probabilities: &[f64; Category::COUNT], source: &mut impl RandomSource) -> Category {
    let number = source.next_uniform();
    let mut cumulative = 0.0;
    let mut last_possible = Category::ALL[0];
    for category in Category::ALL {
        let probability = probabilities[category.index()];
        if probability <= 0.0 {
            continue;
        }
        cumulative += probability;
        last_possible = category;
        if number < cumulative {
            return category;
        }
    }
    // rounding can leave the cumulative sum slightly below one
    last_possible
}

/// Generates the queue of patients for one session. Each patient's category
/// is drawn independently from the weighted categories, consuming one
/// uniform draw per patient.
pub fn generate_patients(
    num_of_patients: usize,
    weights: &CategoryWeights,
    source: &mut impl RandomSource
) -> Vec<Patient> {
    let probabilities = weights.normalized();
    let patients: Vec<Patient> = (0..num_of_patients)
        .map(|position| Patient::new(position, sample_category(&probabilities, source)))
        .collect();
    debug!("Generated {} patients with category probabilities {:?}", patients.len(), probabilities);
    patients
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;
    use crate::random_source::{ ScriptedDraws, SeededStream };

    #[test]
    fn test_generate_requested_number_of_patients() {
        let mut stream = SeededStream::from_seed(1);
        for n in [0, 1, 10, 257] {
            let patients = generate_patients(n, &CategoryWeights::uniform(), &mut stream);

            assert_eq!(patients.len(), n);
            for (position, patient) in patients.iter().enumerate() {
                assert_eq!(patient.position, position);
            }
        }
    }

    #[test]
    fn test_no_patients_consumes_no_draws() {
        let mut draws = ScriptedDraws::new(&[]);

        let patients = generate_patients(0, &CategoryWeights::uniform(), &mut draws);

        assert!(patients.is_empty());
    }

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let weights = CategoryWeights::new([2.0, 1.0, 1.0, 0.0]);

        let normalized = weights.normalized();

        assert_relative_eq!(normalized[0], 0.5);
        assert_relative_eq!(normalized[1], 0.25);
        assert_relative_eq!(normalized[2], 0.25);
        assert_relative_eq!(normalized[3], 0.0);
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_uniform() {
        let weights = CategoryWeights::new([0.0; Category::COUNT]);

        assert_eq!(weights.normalized(), [0.25; Category::COUNT]);
    }

    #[test]
    fn test_invalid_weights_fall_back_to_uniform() {
        assert_eq!(CategoryWeights::new([1.0, -1.0, 1.0, 1.0]).normalized(), [0.25; 4]);
        assert_eq!(CategoryWeights::new([1.0, f64::NAN, 1.0, 1.0]).normalized(), [0.25; 4]);
        assert_eq!(CategoryWeights::new([f64::INFINITY, 1.0, 1.0, 1.0]).normalized(), [0.25; 4]);
    }

    #[test]
    fn test_scripted_draws_pick_categories_by_cumulative_weight() {
        let weights = CategoryWeights::uniform();
        let mut draws = ScriptedDraws::new(&[0.1, 0.3, 0.6, 0.9]);

        let categories: Vec<Category> = generate_patients(4, &weights, &mut draws)
            .iter()
            .map(|patient| patient.category)
            .collect();

        assert_eq!(categories, Category::ALL.to_vec());
    }

    #[test]
    fn test_zero_weight_category_is_never_drawn() {
        let weights = CategoryWeights::new([0.0, 1.0, 0.0, 1.0]);
        let mut stream = SeededStream::from_seed(5);

        let patients = generate_patients(1000, &weights, &mut stream);

        assert!(
            patients
                .iter()
                .all(|p| p.category == Category::MaleOld || p.category == Category::FemaleOld)
        );
    }

    #[test]
    fn test_draw_close_to_one_picks_last_weighted_category() {
        let weights = CategoryWeights::new([1.0, 1.0, 1.0, 0.0]);
        let mut draws = ScriptedDraws::new(&[0.9999999999999999]);

        let patients = generate_patients(1, &weights, &mut draws);

        assert_eq!(patients[0].category, Category::FemaleYoung);
    }

    #[test]
    fn test_category_frequencies_follow_skewed_weights() {
        let weights = CategoryWeights::new([0.7, 0.1, 0.15, 0.05]);
        let num_of_patients = 20_000;
        let mut stream = SeededStream::from_seed(2024);

        let patients = generate_patients(num_of_patients, &weights, &mut stream);

        let mut frequency = [0usize; Category::COUNT];
        for patient in &patients {
            frequency[patient.category.index()] += 1;
        }
        for category in Category::ALL {
            let observed = (frequency[category.index()] as f64) / (num_of_patients as f64);
            assert_relative_eq!(observed, weights.weight(category), epsilon = 0.02);
        }
    }
}
