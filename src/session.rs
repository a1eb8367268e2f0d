use std::fmt;

use log::{ debug, info, warn };

use crate::environments::medicine::Medicine;
use crate::environments::patient::Patient;
use crate::environments::population::{ generate_patients, CategoryWeights };
use crate::policies::{ greedy_choice, ArmCounts, Policy };
use crate::random_source::RandomSource;

/// Errors reported by a session. None of them change the session's state.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum SessionError {
    /// The call was made with a value the session cannot use, e.g. a
    /// medicine index outside the medicine list.
    InvalidArgument(String),
    /// A choice was applied after every patient had been treated.
    InvalidState,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
            SessionError::InvalidState => write!(f, "session is over, every patient was treated"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Number of patients who survived and died under one policy.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct SessionResult {
    pub survived: u32,
    pub died: u32,
}

impl SessionResult {
    pub fn record(&mut self, survived: bool) {
        if survived {
            self.survived += 1;
        } else {
            self.died += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.survived + self.died
    }

    /// Survivors as a percentage of `num_of_patients`; 0.0 when there are none.
    pub fn survival_rate(&self, num_of_patients: usize) -> f64 {
        if num_of_patients == 0 {
            return 0.0;
        }
        ((self.survived as f64) * 100.0) / (num_of_patients as f64)
    }
}

/// Outcome of running a baseline policy over a whole patient queue.
#[derive(PartialEq, Debug, Clone)]
pub struct PolicyRun {
    pub policy: Policy,
    pub result: SessionResult,
    /// Cumulative number of survivors, starting with 0 before the first
    /// patient. Length is number of patients + 1.
    pub survival_trace: Vec<u32>,
    /// Medicine index given to each patient.
    pub choices: Vec<usize>,
}

pub(crate) fn require_medicines(medicines: &[Medicine]) -> Result<(), SessionError> {
    if medicines.is_empty() {
        return Err(SessionError::InvalidArgument("at least one medicine is required".to_string()));
    }
    Ok(())
}

/// Plays `policy` over the whole queue with its own zeroed arm counts,
/// drawing every outcome from `source`. Fails without drawing when there
/// are no medicines.
pub fn baseline_run(
    policy: Policy,
    patients: &[Patient],
    medicines: &[Medicine],
    source: &mut impl RandomSource
) -> Result<PolicyRun, SessionError> {
    require_medicines(medicines)?;
    let mut arm_counts = ArmCounts::new(medicines.len());
    let mut result = SessionResult::default();
    let mut survival_trace = Vec::with_capacity(patients.len() + 1);
    let mut choices = Vec::with_capacity(patients.len());
    survival_trace.push(0);

    for patient in patients {
        let medicine_index = policy.choose(&arm_counts, source);
        let survived = medicines[medicine_index].evaluate(patient, source);
        arm_counts.record(medicine_index, survived);
        result.record(survived);
        survival_trace.push(result.survived);
        choices.push(medicine_index);
    }

    info!(
        "{} baseline: {} survived, {} died out of {} patients",
        policy.name(),
        result.survived,
        result.died,
        patients.len()
    );
    Ok(PolicyRun {
        policy,
        result,
        survival_trace,
        choices,
    })
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SessionState {
    /// Some patients are still waiting for treatment.
    Active,
    /// Every patient was treated; the session no longer changes.
    Terminal,
}

/// One playthrough: a queue of patients treated one at a time with the
/// medicine picked by the caller, compared against the greedy and
/// epsilon-greedy baselines run over the same queue.
///
/// The random source is consumed in a fixed order: patient generation, the
/// whole greedy baseline, the whole epsilon-greedy baseline, and then one
/// outcome draw per `apply_choice`. A session built twice from the same
/// seeded source therefore replays identically.
#[derive(Debug, Clone)]
pub struct Session<R: RandomSource> {
    patients: Vec<Patient>,
    medicines: Vec<Medicine>,
    arm_counts: ArmCounts,
    result: SessionResult,
    history: Vec<bool>,
    choices: Vec<usize>,
    survival_trace: Vec<u32>,
    cursor: usize,
    greedy_baseline: PolicyRun,
    epsilon_greedy_baseline: PolicyRun,
    source: R,
}

impl<R: RandomSource> Session<R> {
    /// Generates `num_of_patients` patients and runs both baselines over
    /// them. Fails only when `medicines` is empty.
    pub fn new(
        num_of_patients: usize,
        medicines: Vec<Medicine>,
        weights: &CategoryWeights,
        mut source: R
    ) -> Result<Self, SessionError> {
        require_medicines(&medicines)?;

        let patients = generate_patients(num_of_patients, weights, &mut source);
        let greedy_baseline = baseline_run(Policy::Greedy, &patients, &medicines, &mut source)?;
        let epsilon_greedy_baseline = baseline_run(
            Policy::epsilon_greedy(),
            &patients,
            &medicines,
            &mut source
        )?;

        info!(
            "# New session with {} patients and {} medicines #",
            patients.len(),
            medicines.len()
        );
        Ok(Session {
            arm_counts: ArmCounts::new(medicines.len()),
            result: SessionResult::default(),
            history: Vec::with_capacity(patients.len()),
            choices: Vec::with_capacity(patients.len()),
            survival_trace: vec![0],
            cursor: 0,
            patients,
            medicines,
            greedy_baseline,
            epsilon_greedy_baseline,
            source,
        })
    }

    pub fn state(&self) -> SessionState {
        if self.cursor < self.patients.len() { SessionState::Active } else { SessionState::Terminal }
    }

    pub fn is_terminal(&self) -> bool {
        self.state() == SessionState::Terminal
    }

    /// Patient waiting for treatment, or `None` once the session is over.
    pub fn current_patient(&self) -> Option<&Patient> {
        self.patients.get(self.cursor)
    }

    /// Treats the current patient with the medicine at `medicine_index` and
    /// returns whether they survived.
    pub fn apply_choice(&mut self, medicine_index: usize) -> Result<bool, SessionError> {
        let patient = match self.patients.get(self.cursor) {
            Some(patient) => *patient,
            None => {
                warn!("Medicine {} chosen after the session ended", medicine_index);
                return Err(SessionError::InvalidState);
            }
        };
        let medicine = match self.medicines.get(medicine_index) {
            Some(medicine) => medicine,
            None => {
                warn!(
                    "Medicine index {} rejected, only {} medicines",
                    medicine_index,
                    self.medicines.len()
                );
                return Err(
                    SessionError::InvalidArgument(
                        format!(
                            "medicine index {} out of range for {} medicines",
                            medicine_index,
                            self.medicines.len()
                        )
                    )
                );
            }
        };

        let survived = medicine.evaluate(&patient, &mut self.source);
        self.history.push(survived);
        self.choices.push(medicine_index);
        self.arm_counts.record(medicine_index, survived);
        self.result.record(survived);
        self.survival_trace.push(self.result.survived);
        self.cursor += 1;

        debug!(
            "Turn={} \t Medicine {} \t Survived {} \t Totals {:?}",
            patient.position,
            medicine_index,
            survived,
            self.result
        );
        if self.is_terminal() {
            info!(
                "# Session over: {} survived, {} died #",
                self.result.survived,
                self.result.died
            );
        }
        Ok(survived)
    }

    /// What the greedy policy would give the current patient, based on the
    /// caller's own observations so far.
    pub fn greedy_recommendation(&self) -> Option<usize> {
        self.current_patient().map(|_| greedy_choice(&self.arm_counts))
    }

    pub fn num_of_patients(&self) -> usize {
        self.patients.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn medicines(&self) -> &[Medicine] {
        &self.medicines
    }

    pub fn arm_counts(&self) -> &ArmCounts {
        &self.arm_counts
    }

    pub fn result(&self) -> SessionResult {
        self.result
    }

    /// Outcome of every treated patient, in order.
    pub fn history(&self) -> &[bool] {
        &self.history
    }

    /// Medicine index chosen for every treated patient, in order.
    pub fn choices(&self) -> &[usize] {
        &self.choices
    }

    /// Cumulative survivors after each step, starting at 0. Has
    /// `cursor + 1` entries.
    pub fn survival_trace(&self) -> &[u32] {
        &self.survival_trace
    }

    pub fn greedy_baseline(&self) -> &PolicyRun {
        &self.greedy_baseline
    }

    pub fn epsilon_greedy_baseline(&self) -> &PolicyRun {
        &self.epsilon_greedy_baseline
    }
}
