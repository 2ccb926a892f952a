// src/cli.rs
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use mapty_lib::WorkoutType;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log running and cycling workouts on a map", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output `list` as CSV instead of a table
    #[arg(long, global = true)]
    pub export_csv: bool,

    /// Skip geolocation and run without a map
    #[arg(long, global = true)]
    pub no_map: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkoutTypeCli {
    Running,
    Cycling,
}

impl From<WorkoutTypeCli> for WorkoutType {
    fn from(value: WorkoutTypeCli) -> Self {
        match value {
            WorkoutTypeCli::Running => Self::Running,
            WorkoutTypeCli::Cycling => Self::Cycling,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a workout at a map location
    Add {
        /// Type of workout
        #[arg(value_enum)]
        type_: WorkoutTypeCli,
        /// Latitude of the workout location
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the workout location
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Distance in km
        #[arg(short, long, allow_hyphen_values = true)]
        distance: String,
        /// Duration in minutes
        #[arg(short = 't', long, allow_hyphen_values = true)]
        duration: String,
        /// Cadence in steps/min (running)
        #[arg(short, long, allow_hyphen_values = true)]
        cadence: Option<String>,
        /// Elevation gain in meters (cycling)
        #[arg(short, long, allow_hyphen_values = true)]
        elevation: Option<String>,
    },
    /// Change the measurements of a workout (the type cannot change)
    Edit {
        /// ID of the workout to edit
        id: String,
        #[arg(short, long, allow_hyphen_values = true)]
        distance: Option<String>,
        #[arg(short = 't', long, allow_hyphen_values = true)]
        duration: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        cadence: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        elevation: Option<String>,
    },
    /// Delete one or more workouts
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Delete every workout, keeping an empty saved list
    DeleteAll {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every workout and the saved list itself
    Reset {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// List workouts, newest first
    List,
    /// Print the list entry markup of a workout
    Show { id: String },
    /// Center the map on a workout
    Locate { id: String },
    /// Set the position used as the starting map center
    SetLocation {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
    /// Forget the configured position (the map will not load)
    ClearLocation,
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Generate shell completion scripts
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
