use crate::types::{Workout, WorkoutKind};

/// Receives the full workout sequence after every store mutation. Rendering
/// always starts from scratch; nothing is patched incrementally.
pub trait ListView {
    fn refresh(&mut self, workouts: &[Workout]);
}

/// Prints the rendered list to stdout.
#[derive(Debug, Default)]
pub struct ConsoleListView;

impl ListView for ConsoleListView {
    fn refresh(&mut self, workouts: &[Workout]) {
        if workouts.is_empty() {
            println!("No workouts recorded yet.");
            return;
        }

        println!("Workouts ({}):", workouts.len());
        for (i, w) in workouts.iter().enumerate() {
            println!("{}\t{}", i + 1, workout_line(w));
        }
    }
}

/// One rendered list entry.
#[must_use]
pub fn workout_line(w: &Workout) -> String {
    let metrics = match &w.kind {
        WorkoutKind::Running { cadence, pace } => {
            format!("{pace:.1} min/km\t{cadence} spm")
        }
        WorkoutKind::Cycling {
            elevation_gain,
            speed,
        } => format!("{speed:.1} km/h\t{elevation_gain} m"),
    };

    format!(
        "{}\t{:.2} km\t{} min\t{}\tid={}",
        w.description, w.distance, w.duration, metrics, w.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;
    use chrono::{TimeZone, Utc};

    #[test]
    fn running_entry_shows_pace_and_cadence() {
        let recorded_at = Utc.with_ymd_and_hms(2026, 4, 14, 7, 30, 0).unwrap();
        let w = Workout::running(recorded_at, GeoPoint::new(52.52, 13.405), 5.0, 25.0, 180.0);

        let line = workout_line(&w);
        assert!(line.contains("Running on April 14"));
        assert!(line.contains("5.00 km"));
        assert!(line.contains("25 min"));
        assert!(line.contains("5.0 min/km"));
        assert!(line.contains("180 spm"));
        assert!(line.contains(&format!("id={}", w.id)));
    }

    #[test]
    fn cycling_entry_shows_speed_and_elevation() {
        let recorded_at = Utc.with_ymd_and_hms(2026, 8, 2, 18, 0, 0).unwrap();
        let w = Workout::cycling(recorded_at, GeoPoint::new(48.137, 11.575), 20.0, 60.0, -50.0);

        let line = workout_line(&w);
        assert!(line.contains("Cycling on August 2"));
        assert!(line.contains("20.0 km/h"));
        assert!(line.contains("-50 m"));
    }
}
