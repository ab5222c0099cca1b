use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sama_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sama")]
#[command(about = "Habit, medication, and period tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print list and status output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Track habits and completion streaks
    Habit {
        #[command(subcommand)]
        action: HabitCommand,
    },

    /// Track medications and doses taken
    Med {
        #[command(subcommand)]
        action: MedCommand,
    },

    /// Track the menstrual cycle
    Period {
        #[command(subcommand)]
        action: PeriodCommand,
    },
}

#[derive(Subcommand)]
enum HabitCommand {
    /// Add a habit (replaces an existing habit of the same name)
    Add {
        name: String,

        /// daily, weekly, or monthly
        #[arg(long, default_value = "daily", value_parser = parse_habit_frequency)]
        frequency: HabitFrequency,
    },

    /// Change a habit's frequency
    Edit {
        name: String,

        #[arg(long, value_parser = parse_habit_frequency)]
        frequency: HabitFrequency,
    },

    /// Mark a habit completed today
    Done { name: String },

    /// List habits and streaks
    List,

    /// Remove all habits
    Reset,
}

#[derive(Subcommand)]
enum MedCommand {
    /// Add a medication
    Add {
        name: String,

        /// Dose, must be positive
        #[arg(long)]
        dosage: f64,

        /// daily, weekly, or as-needed
        #[arg(long, default_value = "daily", value_parser = parse_medication_frequency)]
        frequency: MedicationFrequency,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
    },

    /// Mark the first medication with this name as taken today
    Take { name: String },

    /// List medications
    List,

    /// Remove all medications
    Reset,
}

#[derive(Subcommand)]
enum PeriodCommand {
    /// Record the last period start date (defaults to today)
    Set {
        #[arg(value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Show the next predicted period and the current phase
    Status {
        /// Date to classify (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Cycle length in days (21-35)
        #[arg(long, value_parser = clap::value_parser!(u32).range(21..=35))]
        cycle_length: Option<u32>,

        /// Menstrual length in days (3-7)
        #[arg(long, value_parser = clap::value_parser!(u32).range(3..=7))]
        menstrual_length: Option<u32>,
    },
}

fn parse_habit_frequency(s: &str) -> std::result::Result<HabitFrequency, String> {
    s.parse().map_err(|e: Error| e.to_string())
}

fn parse_medication_frequency(s: &str) -> std::result::Result<MedicationFrequency, String> {
    s.parse().map_err(|e: Error| e.to_string())
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    sama_core::logging::init(cli.verbose);

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Habit { action } => {
            cmd_habit(action, &config.data.habits_path(&data_dir), cli.json)
        }
        Commands::Med { action } => {
            cmd_med(action, &config.data.medications_path(&data_dir), cli.json)
        }
        Commands::Period { action } => {
            cmd_period(action, &config.data.period_path(&data_dir), &config, cli.json)
        }
    }
}

fn cmd_habit(action: HabitCommand, path: &std::path::Path, json: bool) -> Result<()> {
    let mut tracker = HabitTracker::open(path);

    match action {
        HabitCommand::Add { name, frequency } => {
            tracker.add(&name, frequency)?;
            println!("✓ Habit '{}' added ({})", name, frequency);
        }
        HabitCommand::Edit { name, frequency } => match tracker.edit(&name, frequency)? {
            Outcome::NotFound => println!("Habit '{}' not found.", name),
            _ => println!("✓ Habit '{}' updated to '{}' frequency", name, frequency),
        },
        HabitCommand::Done { name } => match tracker.mark_completed(&name)? {
            Outcome::NotFound => println!("Habit '{}' not found.", name),
            Outcome::Unchanged => println!("Habit '{}' already completed today.", name),
            Outcome::Updated => {
                let streak = tracker.get(&name).map(|h| h.streak).unwrap_or_default();
                println!("✓ Habit '{}' marked as completed (streak {})", name, streak);
            }
        },
        HabitCommand::List => {
            if json {
                let habits: Vec<&Habit> = tracker.habits().collect();
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else {
                display_habits(&tracker);
            }
        }
        HabitCommand::Reset => {
            tracker.reset()?;
            println!("✓ All habits have been reset");
        }
    }

    Ok(())
}

fn cmd_med(action: MedCommand, path: &std::path::Path, json: bool) -> Result<()> {
    let mut tracker = MedicationTracker::open(path);

    match action {
        MedCommand::Add {
            name,
            dosage,
            frequency,
            start,
            end,
        } => {
            let today = today();
            tracker.add(NewMedication {
                name: name.clone(),
                dosage,
                frequency,
                start_date: start.unwrap_or(today),
                end_date: end.unwrap_or(today),
            })?;
            println!("✓ Medication '{}' added", name);
        }
        MedCommand::Take { name } => match tracker.mark_as_taken(&name)? {
            Outcome::NotFound => println!("Medication '{}' not found.", name),
            _ => println!("✓ Medication '{}' marked as taken on {}", name, today()),
        },
        MedCommand::List => {
            if json {
                println!("{}", serde_json::to_string_pretty(tracker.medications())?);
            } else {
                display_medications(&tracker);
            }
        }
        MedCommand::Reset => {
            tracker.reset()?;
            println!("✓ All medications have been reset");
        }
    }

    Ok(())
}

fn cmd_period(
    action: PeriodCommand,
    path: &std::path::Path,
    config: &Config,
    json: bool,
) -> Result<()> {
    match action {
        PeriodCommand::Set { date } => {
            let date = date.unwrap_or_else(today);
            let mut tracker = PeriodTracker::open(path, config.cycle.profile());
            tracker.update_last_period_start_date(date)?;
            println!("✓ Last period date updated to {}", format_date(date));
        }
        PeriodCommand::Status {
            date,
            cycle_length,
            menstrual_length,
        } => {
            let profile = CycleProfile::new(
                cycle_length.unwrap_or(config.cycle.cycle_length),
                menstrual_length.unwrap_or(config.cycle.menstrual_length),
            );
            let tracker = PeriodTracker::open(path, profile);
            let current = date.unwrap_or_else(today);

            if json {
                let status = serde_json::json!({
                    "profile": tracker.profile(),
                    "last_period_start_date": tracker.last_period_start(),
                    "next_period": tracker.predict_next_period(),
                    "date": current,
                    "phase": tracker.current_phase(current),
                    "proportions": tracker.phase_proportions(),
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                display_period_status(&tracker, current);
            }
        }
    }

    Ok(())
}

fn display_habits(tracker: &HabitTracker) {
    if tracker.is_empty() {
        println!("No habits to display.");
        return;
    }

    println!("{:<24} {:<10} {:>6}  LAST COMPLETED", "HABIT", "FREQUENCY", "STREAK");
    for habit in tracker.habits() {
        println!(
            "{:<24} {:<10} {:>6}  {}",
            habit.name,
            habit.frequency,
            habit.streak,
            habit
                .last_completed
                .map(format_date)
                .unwrap_or_else(|| "-".into())
        );
    }
}

fn display_medications(tracker: &MedicationTracker) {
    if tracker.is_empty() {
        println!("No medications to display.");
        return;
    }

    println!(
        "{:<20} {:>8} {:<10} {:<10} {:<10}  LAST TAKEN",
        "MEDICATION", "DOSAGE", "FREQUENCY", "START", "END"
    );
    for med in tracker.medications() {
        println!(
            "{:<20} {:>8} {:<10} {:<10} {:<10}  {}",
            med.name,
            med.dosage,
            med.frequency,
            format_date(med.start_date),
            format_date(med.end_date),
            med.last_taken.map(format_date).unwrap_or_else(|| "-".into())
        );
    }

    if tracker.doses_taken().is_empty() {
        println!();
        println!("No medication doses recorded yet.");
    }
}

fn display_period_status(tracker: &PeriodTracker, current: NaiveDate) {
    let profile = tracker.profile();

    match tracker.predict_next_period() {
        Some(next) => println!("Next predicted period start date: {}", format_date(next)),
        None => println!("Please set a valid last period date to predict the next period."),
    }
    println!("Current phase: {}", tracker.current_phase(current));

    println!();
    println!(
        "Cycle phases ({}-day cycle, {}-day period):",
        profile.cycle_length, profile.menstrual_length
    );
    for share in tracker.phase_proportions() {
        println!(
            "  {:<11} {:>2} days  {:>5.1}%",
            share.phase.label(),
            share.days,
            share.fraction * 100.0
        );
    }
}
