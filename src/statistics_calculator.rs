use std::cmp;
use std::fs::{ self, OpenOptions };
use std::io::prelude::*;
use std::path::{ Path, PathBuf };
use std::sync::Once;

use anyhow::Context;
use chrono::prelude::*;
use log::{ debug, info };
use polars::prelude::*;

use crate::constants::{ EPSILON, POLARS_MAX_COLS, POLARS_MAX_ROWS };
use crate::random_source::RandomSource;
use crate::session::Session;

const PLAYER: &str = "Player";
const GREEDY: &str = "Greedy";
const EPSILON_GREEDY: &str = "Epsilon-Greedy";

static POLARS_ENVIRONMENT: Once = Once::new();

/// Set environment variabls so that the whole dataframe is printed. Runs once
/// per process, before the first dataframe is formatted.
fn set_polars_environment_variables() {
    POLARS_ENVIRONMENT.call_once(|| {
        std::env::set_var("POLARS_FMT_MAX_COLS", POLARS_MAX_COLS);
        std::env::set_var("POLARS_FMT_MAX_ROWS", POLARS_MAX_ROWS);
    });
}

/// Renders a dataframe as a printable table.
pub fn format_dataframe(df: &DataFrame) -> String {
    set_polars_environment_variables();
    format!("{:?}", df)
}

/// Creates directory and its parents if they don't exist
fn create_directory(directory: &Path) -> std::io::Result<()> {
    if directory.is_dir() {
        debug!("Directory '{}' already exists", directory.display());
        return Ok(());
    }
    fs::create_dir_all(directory)?;
    info!("Directory '{}' created successfully", directory.display());
    Ok(())
}

/// Path of a report file that does not exist yet. A counter is appended when
/// a file with the same timestamp is already there.
fn get_timestamped_file_path(directory: &Path, file_name: &str) -> PathBuf {
    let local: DateTime<Local> = Local::now();
    let datetime_str: &str = &local.format("%Y-%m-%d_%H-%M-%S%.3f").to_string();
    let mut path = directory.join(format!("{}_{}.txt", file_name, datetime_str));
    let mut counter = 1;
    while path.exists() {
        path = directory.join(format!("{}_{}_{}.txt", file_name, datetime_str, counter));
        counter += 1;
    }
    path
}

/// One row per policy with survivors, deaths, survival rate in percent and
/// the difference to the player's rate in percentage points. Sorted from
/// the best survival rate down.
pub fn summary_dataframe<R: RandomSource>(session: &Session<R>) -> PolarsResult<DataFrame> {
    let num_of_patients = session.num_of_patients();
    let results = [
        session.result(),
        session.greedy_baseline().result,
        session.epsilon_greedy_baseline().result,
    ];
    let survived: Vec<u32> = results
        .iter()
        .map(|result| result.survived)
        .collect();
    let died: Vec<u32> = results
        .iter()
        .map(|result| result.died)
        .collect();
    let player_rate = session.result().survival_rate(num_of_patients);
    // zero patients means zero survivors, so dividing by one keeps the rate at 0.0
    let denominator = cmp::max(num_of_patients, 1) as f64;

    let df = DataFrame::new(
        vec![
            Series::new("policy", &[PLAYER, GREEDY, EPSILON_GREEDY]),
            Series::new("survived", &survived),
            Series::new("died", &died)
        ]
    )?;

    let df = df
        .lazy()
        .with_column(
            ((col("survived").cast(DataType::Float64) * lit(100.0)) / lit(denominator)).alias(
                "survival_rate"
            )
        )
        .with_column((col("survival_rate") - lit(player_rate)).alias("diff_vs_player"))
        .collect()?;

    df.sort(["survival_rate"], true)
}

/// Cumulative survivors after each step for every policy. The player column
/// is null for steps that have not been played yet.
pub fn trace_dataframe<R: RandomSource>(session: &Session<R>) -> PolarsResult<DataFrame> {
    let num_of_steps = session.num_of_patients() + 1;
    let steps: Vec<u32> = (0..num_of_steps as u32).collect();
    let player: Vec<Option<u32>> = (0..num_of_steps)
        .map(|step| session.survival_trace().get(step).copied())
        .collect();

    DataFrame::new(
        vec![
            Series::new("step", &steps),
            Series::new("player", &player),
            Series::new("greedy", &session.greedy_baseline().survival_trace),
            Series::new("epsilon_greedy", &session.epsilon_greedy_baseline().survival_trace)
        ]
    )
}

/// Sentence comparing the player's survival rate with a baseline's.
pub fn comparison_message(player_rate: f64, baseline_rate: f64, baseline_name: &str) -> String {
    let diff = player_rate - baseline_rate;
    if diff.abs() < 0.01 {
        format!("Your performance equals the {} baseline", baseline_name)
    } else if diff > 0.0 {
        format!("You outperformed {} by {:.1}%", baseline_name, diff.abs())
    } else {
        format!("{} outperformed you by {:.1}%", baseline_name, diff.abs())
    }
}

/// Comparison of the player against both baselines.
pub fn comparison_messages<R: RandomSource>(session: &Session<R>) -> Vec<String> {
    let num_of_patients = session.num_of_patients();
    let player_rate = session.result().survival_rate(num_of_patients);
    vec![
        comparison_message(
            player_rate,
            session.greedy_baseline().result.survival_rate(num_of_patients),
            GREEDY
        ),
        comparison_message(
            player_rate,
            session.epsilon_greedy_baseline().result.survival_rate(num_of_patients),
            EPSILON_GREEDY
        )
    ]
}

fn get_data_to_write_in_file<R: RandomSource>(session: &Session<R>) -> anyhow::Result<Vec<String>> {
    let mut lines: Vec<String> = Vec::new();

    lines.push("### Survival statistics for the session ###".to_string());
    lines.push(
        format!(
            "Treated {} of {} patients with {} medicines",
            session.cursor(),
            session.num_of_patients(),
            session.medicines().len()
        )
    );
    lines.push(format!("Epsilon: {}", EPSILON));
    lines.push(format!("{}\n", format_dataframe(&summary_dataframe(session)?)));
    lines.extend(comparison_messages(session));
    lines.push("\n### Accumulated survival per patient ###".to_string());
    lines.push(format_dataframe(&trace_dataframe(session)?));
    Ok(lines)
}

/// Writes the summary, comparison and survival traces of the session to a
/// timestamped file in `directory` and returns its path.
pub fn write_report<R: RandomSource>(session: &Session<R>, directory: &Path) -> anyhow::Result<PathBuf> {
    create_directory(directory).with_context(||
        format!("Failed to create directory {}", directory.display())
    )?;

    let file_path = get_timestamped_file_path(directory, "session_report");
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&file_path)
        .with_context(|| format!("Failed to create report file {}", file_path.display()))?;

    for line in get_data_to_write_in_file(session)? {
        writeln!(output, "{}", line)?;
    }

    info!("Statistics for the session saved in file: {:?}", file_path);
    Ok(file_path)
}
