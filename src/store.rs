use crate::dlog;
use crate::types::Workout;

/// Insertion-ordered list of recorded workouts, oldest first. The session
/// owns exactly one of these; persistence only snapshots it and replaces
/// it wholesale on load.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    #[must_use]
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn add(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    /// Removing an unknown id is a no-op, so deletion stays idempotent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.workouts.len();
        self.workouts.retain(|w| w.id != id);
        let removed = self.workouts.len() != before;
        if !removed {
            dlog!("remove_unknown_id id={id}");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Workout> {
        self.workouts.iter_mut().find(|w| w.id == id)
    }

    /// Replace the whole sequence from a loaded snapshot.
    pub fn replace_all(&mut self, workouts: Vec<Workout>) {
        self.workouts = workouts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;
    use chrono::Utc;

    fn workout(distance: f64) -> Workout {
        Workout::running(Utc::now(), GeoPoint::new(52.52, 13.405), distance, 25.0, 180.0)
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut store = WorkoutStore::default();
        store.add(workout(1.0));
        store.add(workout(2.0));
        store.add(workout(3.0));

        let distances: Vec<f64> = store.workouts().iter().map(|w| w.distance).collect();
        assert_eq!(distances, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = WorkoutStore::default();
        store.add(workout(1.0));
        let keep = workout(2.0);
        let keep_id = keep.id.clone();
        store.add(keep);
        let victim_id = store.workouts()[0].id.clone();

        assert!(store.remove(&victim_id));
        assert_eq!(store.len(), 1);

        // Second removal of the same id leaves the store as-is.
        assert!(!store.remove(&victim_id));
        assert_eq!(store.len(), 1);
        assert_eq!(store.workouts()[0].id, keep_id);

        assert!(!store.remove("0000000000"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn find_by_id() {
        let mut store = WorkoutStore::default();
        store.add(workout(1.0));
        let id = store.workouts()[0].id.clone();

        assert!(store.find(&id).is_some());
        assert!(store.find("not-an-id").is_none());

        if let Some(w) = store.find_mut(&id) {
            w.click();
        }
        assert_eq!(store.find(&id).map(Workout::clicks), Some(1));
    }

    #[test]
    fn clear_empties_the_sequence() {
        let mut store = WorkoutStore::default();
        store.add(workout(1.0));
        store.add(workout(2.0));

        store.clear();
        assert!(store.is_empty());
    }
}
