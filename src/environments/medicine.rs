use log::debug;

use crate::constants::DEFAULT_EFFECTIVE_RATE;
use crate::environments::patient::{ Category, Patient };
use crate::random_source::RandomSource;

/// Medicine represents one arm of the bandit. For every patient category it
/// has a constant probability of survival that does not change over time
/// and is not known to whoever picks the medicine.
#[derive(PartialEq, Debug, Clone)]
pub struct Medicine {
    name: String,
    effective_rates: [f64; Category::COUNT],
}

impl Medicine {
    /// Creates a medicine with the survival probability for each category
    /// given in `Category::ALL` order.
    pub fn new(name: impl Into<String>, effective_rates: [f64; Category::COUNT]) -> Self {
        for rate in effective_rates {
            assert!((0.0..=1.0).contains(&rate), "Probability must be in the range [0, 1].");
        }
        Medicine {
            name: name.into(),
            effective_rates,
        }
    }

    /// Creates a medicine from (category, rate) pairs. Categories that are
    /// not listed get `DEFAULT_EFFECTIVE_RATE`.
    pub fn from_rates(
        name: impl Into<String>,
        rates: impl IntoIterator<Item = (Category, f64)>
    ) -> Self {
        let mut effective_rates = [DEFAULT_EFFECTIVE_RATE; Category::COUNT];
        for (category, rate) in rates {
            effective_rates[category.index()] = rate;
        }
        Medicine::new(name, effective_rates)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn effective_rate(&self, category: Category) -> f64 {
        self.effective_rates[category.index()]
    }

    /// Treats the patient and reports whether they survived. Consumes exactly
    /// one uniform draw `u` and returns `u < p` where `p` is the survival
    /// probability for the patient's category.
    pub fn evaluate(&self, patient: &Patient, source: &mut impl RandomSource) -> bool {
        let probability = self.effective_rate(patient.category);
        let survived = source.next_uniform() < probability;
        debug!(
            "Patient {} ({}) treated with {} (p={}): survived={}",
            patient.position,
            patient.category,
            self.name,
            probability,
            survived
        );
        survived
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::random_source::{ ScriptedDraws, SeededStream };

    fn medicine_a() -> Medicine {
        Medicine::new("Medicine A", [0.8, 0.6, 0.7, 0.5])
    }

    #[test]
    fn test_create_medicine_with_valid_probabilities() {
        let medicine = medicine_a();

        assert_eq!(medicine.name(), "Medicine A");
        assert_eq!(medicine.effective_rate(Category::MaleYoung), 0.8);
        assert_eq!(medicine.effective_rate(Category::MaleOld), 0.6);
        assert_eq!(medicine.effective_rate(Category::FemaleYoung), 0.7);
        assert_eq!(medicine.effective_rate(Category::FemaleOld), 0.5);
    }

    #[test]
    #[should_panic(expected = "Probability must be in the range [0, 1].")]
    fn test_create_medicine_with_probability_greater_than_one() {
        Medicine::new("Broken", [0.5, 1.5, 0.5, 0.5]);
    }

    #[test]
    #[should_panic(expected = "Probability must be in the range [0, 1].")]
    fn test_create_medicine_with_probability_less_than_zero() {
        Medicine::new("Broken", [0.5, 0.5, -0.5, 0.5]);
    }

    #[test]
    fn test_missing_category_gets_default_rate() {
        let medicine = Medicine::from_rates("Partial", [(Category::MaleOld, 0.9)]);

        assert_eq!(medicine.effective_rate(Category::MaleOld), 0.9);
        assert_eq!(medicine.effective_rate(Category::MaleYoung), DEFAULT_EFFECTIVE_RATE);
        assert_eq!(medicine.effective_rate(Category::FemaleYoung), DEFAULT_EFFECTIVE_RATE);
        assert_eq!(medicine.effective_rate(Category::FemaleOld), DEFAULT_EFFECTIVE_RATE);
    }

    #[test]
    fn test_young_male_survives_when_draw_below_rate() {
        let patient = Patient::new(0, Category::MaleYoung);
        let mut draws = ScriptedDraws::new(&[0.5]);

        assert!(medicine_a().evaluate(&patient, &mut draws));
        assert_eq!(draws.remaining(), 0);
    }

    #[test]
    fn test_old_female_dies_when_draw_not_below_rate() {
        let patient = Patient::new(0, Category::FemaleOld);
        let mut draws = ScriptedDraws::new(&[0.6]);

        assert!(!medicine_a().evaluate(&patient, &mut draws));
    }

    #[test]
    fn test_draw_equal_to_rate_means_death() {
        let patient = Patient::new(0, Category::FemaleOld);
        let mut draws = ScriptedDraws::new(&[0.5]);

        assert!(!medicine_a().evaluate(&patient, &mut draws));
    }

    #[test]
    fn test_patient_never_survives_when_probability_is_zero() {
        let medicine = Medicine::new("Placebo", [0.0; Category::COUNT]);
        let patient = Patient::new(0, Category::MaleOld);
        let mut stream = SeededStream::from_seed(3);
        for _ in 0..100 {
            assert!(!medicine.evaluate(&patient, &mut stream), "Survived with zero probability");
        }
    }

    #[test]
    fn test_patient_always_survives_when_probability_is_one() {
        let medicine = Medicine::new("Cure", [1.0; Category::COUNT]);
        let patient = Patient::new(0, Category::FemaleYoung);
        let mut stream = SeededStream::from_seed(3);
        for _ in 0..100 {
            assert!(medicine.evaluate(&patient, &mut stream), "Died with probability one");
        }
    }

    #[test]
    fn test_survival_when_probability_is_half() {
        let medicine = Medicine::new("Coin", [0.5; Category::COUNT]);
        let patient = Patient::new(0, Category::MaleYoung);
        let mut stream = SeededStream::from_seed(11);
        let expected_range = 450..550; // 1000 trials

        let survivors = (0..1000).filter(|_| medicine.evaluate(&patient, &mut stream)).count();

        assert!(
            expected_range.contains(&survivors),
            "Number of survivors not within the expected range [450, 550): {}",
            survivors
        );
    }
}
