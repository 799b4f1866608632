#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use waymark::app::{App, ReplCommand, SubmitOutcome};
use waymark::capture::ClickOutcome;
use waymark::cli::{Cli, Cmd, DEFAULT_MAP_CENTER, POSITION_ENV};
use waymark::database::{self, SqliteBlobStore};
use waymark::map::ConsoleMap;
use waymark::types::{GeoPoint, WorkoutType};
use waymark::utils;
use waymark::view::ConsoleListView;

#[macro_use]
extern crate waymark;

type SessionApp = App<ConsoleMap, SqliteBlobStore, ConsoleListView>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let blob = SqliteBlobStore::open(&cli.store)
        .with_context(|| format!("opening workout store: {}", cli.store.display()))?;

    match cli.cmd {
        None => {
            let Some(position) = resolve_position(cli.position) else {
                bail!("Could not get your position (pass --position LAT,LNG or set {POSITION_ENV})");
            };
            dlog!("mode=session store={} position={position}", cli.store.display());
            run_session(blob, position)
        }
        Some(Cmd::List) => {
            dlog!("mode=list store={}", cli.store.display());
            let mut app = one_shot_app(blob, cli.position);
            app.show_list();
            Ok(())
        }
        Some(Cmd::Delete { id }) => {
            let mut app = one_shot_app(blob, cli.position);
            if app.delete(&id)? {
                println!("Deleted workout {id}.");
            } else {
                println!("No workout with id {id}.");
            }
            Ok(())
        }
        Some(Cmd::Clear { yes }) => {
            let mut app = one_shot_app(blob, cli.position);
            if app.workouts().is_empty() {
                println!("No workouts recorded yet.");
                return Ok(());
            }
            if yes || confirm("Are you sure you want to clear all workouts?")? {
                app.clear()?;
                println!("All workouts cleared.");
            }
            Ok(())
        }
        Some(Cmd::Reset) => {
            let mut blob = blob;
            database::reset(&mut blob)?;
            println!("Stored workouts deleted. Start a new session to begin fresh.");
            Ok(())
        }
    }
}

fn run_session(blob: SqliteBlobStore, position: GeoPoint) -> Result<()> {
    let mut app = App::new(ConsoleMap::new(), blob, ConsoleListView, position);
    app.refresh();

    println!("Interactive session. Type `help` for commands, `quit` to leave.");

    loop {
        print!("> ");
        io::stdout().flush().context("flushing prompt")?;

        let mut line = String::new();
        if io::stdin()
            .read_line(&mut line)
            .context("reading command")?
            == 0
        {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match ReplCommand::parse(line) {
            Err(e) => println!("{e:#}"),
            Ok(ReplCommand::Quit) => break,
            Ok(cmd) => dispatch(&mut app, cmd)?,
        }
    }

    Ok(())
}

fn dispatch(app: &mut SessionApp, cmd: ReplCommand) -> Result<()> {
    match cmd {
        ReplCommand::Click(point) => match app.map_click(point) {
            Ok(ClickOutcome::StartSet) => {
                println!("Start point set. Click the end point next.");
            }
            Ok(ClickOutcome::Complete { distance_km, route }) => {
                let extra = match app.form().workout_type {
                    WorkoutType::Running => "cadence",
                    WorkoutType::Cycling => "elevation",
                };
                println!("Route complete: {route}");
                println!(
                    "Distance prefilled at {distance_km:.2} km. Enter `duration` and `{extra}`, then `submit`."
                );
            }
            Err(e) => println!("{e}"),
        },
        ReplCommand::Type(workout_type) => {
            app.set_workout_type(workout_type);
            match workout_type {
                WorkoutType::Running => println!("Type set to running; the form expects `cadence`."),
                WorkoutType::Cycling => println!("Type set to cycling; the form expects `elevation`."),
            }
        }
        ReplCommand::Distance(km) => app.set_distance(km),
        ReplCommand::Duration(minutes) => app.set_duration(minutes),
        ReplCommand::Cadence(steps_per_min) => app.set_cadence(steps_per_min),
        ReplCommand::Elevation(meters) => app.set_elevation_gain(meters),
        ReplCommand::Submit => match app.submit()? {
            SubmitOutcome::Added { id, description } => {
                println!("Recorded {description} (id {id}).");
            }
            SubmitOutcome::Rejected(e) => println!("{e}"),
        },
        ReplCommand::Discard => {
            app.discard();
            println!("Pending route discarded.");
        }
        ReplCommand::Select(id) => {
            if app.select(&id).is_none() {
                println!("No workout with id {id}.");
            }
        }
        ReplCommand::Delete(id) => {
            if !app.delete(&id)? {
                println!("No workout with id {id}.");
            }
        }
        ReplCommand::Clear => {
            if confirm("Are you sure you want to clear all workouts?")? {
                app.clear()?;
            }
        }
        ReplCommand::List => app.show_list(),
        ReplCommand::Help => print_help(),
        ReplCommand::Quit => {}
    }

    Ok(())
}

fn one_shot_app(blob: SqliteBlobStore, position: Option<GeoPoint>) -> SessionApp {
    let position = resolve_position(position).unwrap_or(DEFAULT_MAP_CENTER);
    App::new(ConsoleMap::new(), blob, ConsoleListView, position)
}

fn resolve_position(flag: Option<GeoPoint>) -> Option<GeoPoint> {
    if flag.is_some() {
        return flag;
    }

    let raw = std::env::var(POSITION_ENV).ok()?;
    match raw.parse() {
        Ok(position) => Some(position),
        Err(e) => {
            tracing::warn!(err = %e, var = POSITION_ENV, "ignoring unparseable position");
            None
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().context("flushing prompt")?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("reading confirmation")?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_help() {
    println!(
        "\
click LAT LNG          set the start point, then the end point
type running|cycling   switch the workout type
distance KM            override the prefilled distance
duration MIN           set the duration
cadence SPM            set the cadence (running)
elevation M            set the elevation gain (cycling)
submit                 save the workout
discard                abandon the pending route
select ID              pan the map to a workout
delete ID              delete a workout
clear                  delete every workout
list                   print the workout list
quit                   leave the session"
    );
}
