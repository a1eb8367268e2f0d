/// Represents the probability with which the epsilon-greedy baseline selects a random medicine.
/// The probability that it takes the medicine that exploits what it has learned is (1-EPSILON).
pub const EPSILON: f64 = 0.1;
/// Estimated survival probability of a medicine that has not been given to anyone yet.
/// Baseline comparisons depend on this exact value.
pub const UNPULLED_ESTIMATE: f64 = 0.5;
/// Survival probability used for a patient category missing from a medicine's rates.
pub const DEFAULT_EFFECTIVE_RATE: f64 = 0.5;
/// Number of patients treated in one session when the configuration does not say otherwise.
pub const DEFAULT_NUM_OF_PATIENTS: usize = 10;
/// Number of independent sessions evaluated by the batch runner by default.
pub const NUM_OF_SESSIONS_TO_COMPARE: usize = 100;
/// Configuration file read by the console driver.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const REPORT_DIRECTORY: &str = "files/medicine_bandits";
pub const POLARS_MAX_COLS: &str = "10";
/// Row limit for printed dataframes, large enough for a full survival trace.
pub const POLARS_MAX_ROWS: &str = "1000";
