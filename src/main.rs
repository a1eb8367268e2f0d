use std::path::{ Path, PathBuf };

use clap::Parser;
use dialoguer::Select;
use log::info;

use medicine_bandits::batch_runner::BaselineBatchRunner;
use medicine_bandits::config::{ load_config_or_default, GameConfig };
use medicine_bandits::constants::{
    DEFAULT_CONFIG_PATH,
    NUM_OF_SESSIONS_TO_COMPARE,
    REPORT_DIRECTORY,
};
use medicine_bandits::random_source::{ RandomSource, SeededStream };
use medicine_bandits::session::Session;
use medicine_bandits::statistics_calculator::{
    comparison_messages,
    format_dataframe,
    summary_dataframe,
    write_report,
};

#[derive(Parser)]
#[command(author, version, about = "Treat patients with medicines of unknown effectiveness", long_about = None)]
enum Command {
    #[command(about = "Treat the patients yourself and compare with the baselines")]
    Play {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,
        /// Overrides the number of patients in the config
        #[arg(long)]
        patients: Option<usize>,
    },
    #[command(about = "Compare the greedy and epsilon-greedy baselines over many sessions")]
    Compare {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        #[arg(long, default_value_t = NUM_OF_SESSIONS_TO_COMPARE)]
        sessions: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Command::parse() {
        Command::Play { config, seed, patients } => {
            let config = load_config_or_default(&config);
            play(&config, seed, patients)
        }
        Command::Compare { config, sessions, seed } => {
            let config = load_config_or_default(&config);
            compare(&config, sessions, seed)
        }
    }
}

fn play(config: &GameConfig, seed: Option<u64>, patients: Option<usize>) -> anyhow::Result<()> {
    let source = match seed {
        Some(seed) => SeededStream::from_seed(seed),
        None => SeededStream::from_entropy(),
    };
    let mut session = config.start_session(patients, source)?;
    let names: Vec<String> = session
        .medicines()
        .iter()
        .map(|medicine| medicine.name().to_string())
        .collect();

    while let Some(patient) = session.current_patient().copied() {
        let recommendation = session.greedy_recommendation().unwrap_or(0);
        let choice = Select::new()
            .with_prompt(
                format!(
                    "Patient {} of {}: {} (greedy would pick {})",
                    patient.position + 1,
                    session.num_of_patients(),
                    patient.category,
                    names[recommendation]
                )
            )
            .items(&names)
            .default(recommendation)
            .interact()?;

        let survived = session.apply_choice(choice)?;
        println!("{}: {}", names[choice], if survived { "Survived" } else { "Died" });
    }

    print_results(&session)?;
    let file_path = write_report(&session, Path::new(REPORT_DIRECTORY))?;
    println!("Report saved in file: {}", file_path.display());
    Ok(())
}

fn print_results<R: RandomSource>(session: &Session<R>) -> anyhow::Result<()> {
    let history: String = session
        .history()
        .iter()
        .map(|&survived| if survived { 'S' } else { 'D' })
        .collect();
    println!("\n### Game Over ###");
    println!("History: {}", history);
    println!("{}", format_dataframe(&summary_dataframe(session)?));
    for message in comparison_messages(session) {
        println!("{}", message);
    }
    Ok(())
}

fn compare(config: &GameConfig, num_of_sessions: usize, seed: u64) -> anyhow::Result<()> {
    let mut runner = BaselineBatchRunner::new(
        num_of_sessions,
        config.game.num_patients,
        config.medicines(),
        config.category_weights(),
        seed
    )?;
    runner.run_all_sessions_in_parallel()?;

    let summary = runner.summary();
    info!("Compared baselines over {} sessions", summary.num_of_sessions);
    println!("### Baselines over {} sessions of {} patients ###", summary.num_of_sessions, config.game.num_patients);
    println!(
        "Greedy: mean survived {:.2} \t wins {}",
        summary.mean_greedy_survived,
        summary.greedy_wins
    );
    println!(
        "Epsilon-Greedy: mean survived {:.2} \t wins {}",
        summary.mean_epsilon_greedy_survived,
        summary.epsilon_greedy_wins
    );
    println!("Ties: {}", summary.ties);
    Ok(())
}
