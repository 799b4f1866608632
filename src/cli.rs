use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::types::GeoPoint;

const DEFAULT_STORE_DB: &str = "waymark.db";

/// Environment variable consulted when `--position` is not given.
pub const POSITION_ENV: &str = "WAYMARK_POSITION";

/// Fallback map center for one-shot commands, where the console map stays
/// inert. The interactive session requires a real position.
pub const DEFAULT_MAP_CENTER: GeoPoint = GeoPoint::new(52.520_008, 13.404_954);

#[derive(Parser, Debug)]
#[command(
    name = "waymark",
    about = "Record running and cycling workouts by marking start and end points on a map"
)]
pub struct Cli {
    /// SQLite file the workout list is persisted in.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_STORE_DB, global = true)]
    pub store: PathBuf,

    /// Current position as LAT,LNG. Falls back to $WAYMARK_POSITION.
    #[arg(long, value_name = "LAT,LNG", global = true)]
    pub position: Option<GeoPoint>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Without a subcommand an interactive session starts.
    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print the recorded workouts.
    List,

    /// Delete one workout by id.
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Delete every workout.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Drop the persisted state entirely; the next session starts fresh.
    Reset,
}
