//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdin, stdout, Write};
use tracing::{debug, info};

use mapty_lib::render::format_metric;
use mapty_lib::{
    logging, AppService, Coords, FormField, NoticeLevel, Notifier, Theme, ValidationError, Workout,
    WorkoutId, WorkoutType,
};

fn main() -> Result<()> {
    let cli_args = cli::parse_args();

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    logging::init_stderr_logging("warn").context("Failed to set up logging")?;

    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;
    if !cli_args.no_map {
        service.start_map();
    }
    print_notices(&mut service);

    let result = run(&mut service, cli_args.command, cli_args.export_csv);
    print_notices(&mut service);
    result
}

fn run(service: &mut AppService, command: cli::Commands, export_csv: bool) -> Result<()> {
    debug!(?command, degraded = service.app.is_degraded(), "Running command");
    match command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Add {
            type_,
            lat,
            lng,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            let workout_type = WorkoutType::from(type_);
            let at = Coords::new(lat, lng);
            if !at.is_valid() {
                bail!("Location {at} is outside the valid latitude/longitude range");
            }
            let type_specific = match workout_type {
                WorkoutType::Running => cadence,
                WorkoutType::Cycling => elevation,
            }
            .unwrap_or_default();

            let app = &mut service.app;
            app.handle_map_click(at);
            app.set_workout_type(workout_type);
            let form = app.form_mut();
            form.set_value(FormField::Distance, &distance);
            form.set_value(FormField::Duration, &duration);
            form.set_value(FormField::for_type(workout_type), &type_specific);

            match app.submit() {
                Ok(Some(id)) => {
                    let workout = app.workout(&id).context("New workout not found")?;
                    info!(%id, "Workout logged");
                    println!(
                        "Logged {} (ID: {id}), {}",
                        workout.description(),
                        metric_summary(workout)
                    );
                }
                Ok(None) => bail!("The workout form was not open"),
                Err(e) => return Err(reject_form(service, e)),
            }
        }
        cli::Commands::Edit {
            id,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            let id = WorkoutId::from(id);
            let app = &mut service.app;
            if !app.begin_edit(&id) {
                bail!("Workout '{id}' not found");
            }
            let type_field = app.form().type_field();
            let type_specific = match type_field {
                FormField::Cadence => cadence,
                _ => elevation,
            };
            let form = app.form_mut();
            for (field, value) in [
                (FormField::Distance, distance),
                (FormField::Duration, duration),
                (type_field, type_specific),
            ] {
                if let Some(value) = value {
                    form.set_value(field, &value);
                }
            }

            match app.submit() {
                Ok(_) => {
                    let workout = app.workout(&id).context("Edited workout not found")?;
                    info!(%id, "Workout updated");
                    println!("Updated workout {id}: {}", metric_summary(workout));
                }
                Err(e) => return Err(reject_form(service, e)),
            }
        }
        cli::Commands::Delete { ids } => {
            for id in ids.into_iter().map(WorkoutId::from) {
                if service.app.delete(&id) {
                    info!(%id, "Workout deleted");
                    println!("Deleted workout {id}.");
                } else {
                    println!("Workout '{id}' not found.");
                }
            }
        }
        cli::Commands::DeleteAll { yes } => {
            let count = service.app.workouts().len();
            if yes || confirm(&format!("Delete all {count} workout(s)?"))? {
                info!(count, "Deleting all workouts");
                service.app.delete_all();
                println!("Deleted {count} workout(s).");
            } else {
                println!("Cancelled.");
            }
        }
        cli::Commands::Reset { yes } => {
            if yes || confirm("Remove all workouts and the saved list?")? {
                info!("Resetting saved workouts");
                service.app.reset();
                println!("Saved workouts reset.");
            } else {
                println!("Cancelled.");
            }
        }
        cli::Commands::List => {
            // Collection order is oldest first; list views read newest first
            let workouts: Vec<&Workout> = service.app.workouts().rev().collect();
            if workouts.is_empty() {
                println!("No workouts logged yet. Add one with `mapty add`.");
            } else if export_csv {
                print_workout_csv(&workouts)?;
            } else {
                print_workout_table(&workouts, &service.config.theme);
            }
        }
        cli::Commands::Show { id } => {
            let id = WorkoutId::from(id);
            let list = service.app.list();
            let index = list
                .position(&id)
                .with_context(|| format!("Workout '{id}' not found"))?;
            if let Some(entry) = list.get(index) {
                println!("{}", entry.to_markup());
            }
        }
        cli::Commands::Locate { id } => {
            let id = WorkoutId::from(id);
            if !service.app.activate_entry(&id) {
                bail!("Workout '{id}' not found");
            }
            match service.app.map().and_then(|m| m.view()) {
                Some(view) => println!(
                    "Map centered on {} at zoom {}.",
                    view.center, view.zoom
                ),
                None => println!("No map is loaded; set a location with `mapty set-location`."),
            }
        }
        cli::Commands::SetLocation { lat, lng } => {
            service
                .set_home_location(Some(Coords::new(lat, lng)))
                .context("Failed to set location")?;
            info!(lat, lng, "Home location updated");
            println!("Location set to {}.", Coords::new(lat, lng));
            println!("Config file updated: {:?}", service.get_config_path());
        }
        cli::Commands::ClearLocation => {
            service
                .set_home_location(None)
                .context("Failed to clear location")?;
            println!("Location cleared. The map will not load until a location is set.");
        }
        cli::Commands::DbPath => {
            println!("Database file is located at: {:?}", service.db_path);
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
    }
    Ok(())
}

/// Closes the form after a rejected submit. The notice raised for it is
/// dropped since the returned error carries the same message.
fn reject_form(service: &mut AppService, error: ValidationError) -> anyhow::Error {
    debug!(%error, "Discarding rejected form");
    service.app.cancel();
    let notices = service.app.notifier_mut();
    for notice in notices.drain() {
        if notice.level != NoticeLevel::Error {
            notices.notify(notice);
        }
    }
    anyhow::Error::new(error).context("Workout not saved")
}

/// Prints and clears pending notices: errors and warnings to stderr.
fn print_notices(service: &mut AppService) {
    for notice in service.app.notifier_mut().drain() {
        match notice.level {
            NoticeLevel::Info => println!("{notice}"),
            NoticeLevel::Warning => eprintln!("Warning: {notice}"),
            NoticeLevel::Error => eprintln!("Error: {notice}"),
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N]: ");
    stdout().flush()?;
    let mut answer = String::new();
    stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn metric_summary(workout: &Workout) -> String {
    match workout.workout_type() {
        WorkoutType::Running => format!("pace {} min/km", format_metric(workout.pace())),
        WorkoutType::Cycling => format!("speed {} km/h", format_metric(workout.speed())),
    }
}

fn type_specific_cell(workout: &Workout) -> String {
    match workout.workout_type() {
        WorkoutType::Running => format!("{} spm", workout.type_specific()),
        WorkoutType::Cycling => format!("{} m", workout.type_specific()),
    }
}

fn print_workout_table(workouts: &[&Workout], theme: &Theme) {
    let header_color = mapty_lib::parse_color(&theme.header_color)
        .map(Color::from)
        .unwrap_or(Color::Green);
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date (Local)").fg(header_color),
            Cell::new("Workout").fg(header_color),
            Cell::new("Distance (km)").fg(header_color),
            Cell::new("Duration (min)").fg(header_color),
            Cell::new("Pace / Speed").fg(header_color),
            Cell::new("Cadence / Elev").fg(header_color),
            Cell::new("Location").fg(header_color),
        ]);

    for workout in workouts {
        let type_color = Color::from(theme.color_for(workout.workout_type()));
        let unit = match workout.workout_type() {
            WorkoutType::Running => "min/km",
            WorkoutType::Cycling => "km/h",
        };
        table.add_row(vec![
            Cell::new(workout.id()),
            Cell::new(
                workout
                    .created_at()
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M"),
            ),
            Cell::new(format!(
                "{} {}",
                workout.workout_type().icon(),
                workout.description()
            ))
            .fg(type_color)
            .add_attribute(Attribute::Bold),
            Cell::new(workout.distance_km()),
            Cell::new(workout.duration_min()),
            Cell::new(format!("{} {unit}", format_metric(workout.derived_metric()))),
            Cell::new(type_specific_cell(workout)),
            Cell::new(workout.coords()),
        ]);
    }
    println!("{table}");
}

fn print_workout_csv(workouts: &[&Workout]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record([
        "ID",
        "Timestamp_Local",
        "Type",
        "Latitude",
        "Longitude",
        "Distance_km",
        "Duration_min",
        "Cadence_spm",
        "ElevationGain_m",
        "Pace_min_per_km",
        "Speed_km_per_h",
        "Description",
    ])?;

    let opt = |v: Option<f64>| v.map_or_else(String::new, |v| v.to_string());
    for workout in workouts {
        let coords = workout.coords();
        writer.write_record([
            workout.id().to_string(),
            workout.created_at().with_timezone(&Local).to_rfc3339(),
            workout.workout_type().to_string(),
            coords.lat.to_string(),
            coords.lng.to_string(),
            workout.distance_km().to_string(),
            workout.duration_min().to_string(),
            opt(workout.cadence()),
            opt(workout.elevation_gain()),
            opt(workout.pace()),
            opt(workout.speed()),
            workout.description().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
