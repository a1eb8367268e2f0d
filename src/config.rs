use std::fs;
use std::path::Path;

use anyhow::Context;
use log::{ error, warn };
use serde::{ Deserialize, Serialize };

use crate::constants::{ DEFAULT_EFFECTIVE_RATE, DEFAULT_NUM_OF_PATIENTS };
use crate::environments::medicine::Medicine;
use crate::environments::patient::Category;
use crate::environments::population::CategoryWeights;
use crate::random_source::RandomSource;
use crate::session::{ Session, SessionError };

/// One value per patient category, keyed like `male_young` in the file.
#[derive(PartialEq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PerCategory {
    pub male_young: Option<f64>,
    pub male_old: Option<f64>,
    pub female_young: Option<f64>,
    pub female_old: Option<f64>,
}

impl PerCategory {
    pub fn new(values: [f64; Category::COUNT]) -> Self {
        PerCategory {
            male_young: Some(values[0]),
            male_old: Some(values[1]),
            female_young: Some(values[2]),
            female_old: Some(values[3]),
        }
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        match category {
            Category::MaleYoung => self.male_young,
            Category::MaleOld => self.male_old,
            Category::FemaleYoung => self.female_young,
            Category::FemaleOld => self.female_old,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GameSection {
    #[serde(default = "default_num_of_patients", alias = "num_persons")]
    pub num_patients: usize,
}

impl Default for GameSection {
    fn default() -> Self {
        GameSection { num_patients: DEFAULT_NUM_OF_PATIENTS }
    }
}

fn default_num_of_patients() -> usize {
    DEFAULT_NUM_OF_PATIENTS
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MedicineConfig {
    pub name: String,
    #[serde(default)]
    pub effective_rates: PerCategory,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub game: GameSection,
    #[serde(default)]
    pub medicines: Vec<MedicineConfig>,
    #[serde(default, alias = "person_probabilities")]
    pub patient_probabilities: Option<PerCategory>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            game: GameSection::default(),
            medicines: default_medicines(),
            patient_probabilities: None,
        }
    }
}

fn default_medicines() -> Vec<MedicineConfig> {
    [
        ("Medicine A", [0.8, 0.6, 0.7, 0.5]),
        ("Medicine B", [0.6, 0.7, 0.8, 0.5]),
        ("Medicine C", [0.5, 0.5, 0.6, 0.8]),
    ]
        .into_iter()
        .map(|(name, rates)| MedicineConfig {
            name: name.to_string(),
            effective_rates: PerCategory::new(rates),
        })
        .collect()
}

impl GameConfig {
    /// Medicines described by the configuration. Missing or invalid rates
    /// become `DEFAULT_EFFECTIVE_RATE`; an empty list becomes the default
    /// medicines.
    pub fn medicines(&self) -> Vec<Medicine> {
        let configured = if self.medicines.is_empty() {
            warn!("No medicines configured, using the default medicines");
            default_medicines()
        } else {
            self.medicines.clone()
        };

        configured
            .iter()
            .map(|medicine| {
                let rates = Category::ALL.map(|category| {
                    match medicine.effective_rates.get(category) {
                        None => DEFAULT_EFFECTIVE_RATE,
                        Some(rate) if rate.is_finite() && (0.0..=1.0).contains(&rate) => rate,
                        Some(rate) => {
                            warn!(
                                "Effective rate {} for {} of {} is not a probability, using {}",
                                rate,
                                category.key(),
                                medicine.name,
                                DEFAULT_EFFECTIVE_RATE
                            );
                            DEFAULT_EFFECTIVE_RATE
                        }
                    }
                });
                Medicine::new(medicine.name.clone(), rates)
            })
            .collect()
    }

    /// Patient category weights. A missing section or a missing category
    /// weight means uniform weights.
    pub fn category_weights(&self) -> CategoryWeights {
        let probabilities = match &self.patient_probabilities {
            Some(probabilities) => probabilities,
            None => {
                return CategoryWeights::uniform();
            }
        };
        let mut weights = [0.0; Category::COUNT];
        for category in Category::ALL {
            match probabilities.get(category) {
                Some(weight) => {
                    weights[category.index()] = weight;
                }
                None => {
                    warn!("No weight for {} patients, using uniform weights", category.key());
                    return CategoryWeights::uniform();
                }
            }
        }
        CategoryWeights::new(weights)
    }

    /// Starts a session using this configuration. `num_of_patients`
    /// overrides the configured number when given.
    pub fn start_session<R: RandomSource>(
        &self,
        num_of_patients: Option<usize>,
        source: R
    ) -> Result<Session<R>, SessionError> {
        Session::new(
            num_of_patients.unwrap_or(self.game.num_patients),
            self.medicines(),
            &self.category_weights(),
            source
        )
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<GameConfig> {
    let content = fs::read_to_string(path).with_context(||
        format!("Failed to read config file {}", path.display())
    )?;
    let config = serde_json
        ::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Loads the configuration, falling back to the built in defaults when the
/// file cannot be read or parsed.
pub fn load_config_or_default(path: &Path) -> GameConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading config file: {:#}", err);
            GameConfig::default()
        }
    }
}
