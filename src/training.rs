//! Cursor over the sets of one training run

use crate::db::Exercise;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetTarget {
    pub set_index: u32,
    pub reps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunExercise {
    pub exercise_id: i64,
    /// Stored name
    pub name: String,
    pub sets: Vec<SetTarget>,
}

impl From<&Exercise> for RunExercise {
    fn from(exercise: &Exercise) -> Self {
        Self {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
            sets: exercise
                .sets
                .iter()
                .map(|s| SetTarget {
                    set_index: s.set_index,
                    reps: s.reps,
                })
                .collect(),
        }
    }
}

/// What happened after a set was recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    NextSet,
    ExerciseFinished { name: String },
    Finished,
}

#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub run_id: i64,
    pub user_id: i64,
    pub program_id: i64,
    exercises: Vec<RunExercise>,
    exercise_index: usize,
    set_index: usize,
}

impl TrainingRun {
    /// `None` if no exercise has a set to do
    pub fn new(
        run_id: i64,
        user_id: i64,
        program_id: i64,
        exercises: Vec<RunExercise>,
    ) -> Option<Self> {
        let exercises: Vec<_> = exercises.into_iter().filter(|e| !e.sets.is_empty()).collect();
        if exercises.is_empty() {
            return None;
        }
        Some(Self {
            run_id,
            user_id,
            program_id,
            exercises,
            exercise_index: 0,
            set_index: 0,
        })
    }

    /// Exercise and set to do next, `None` once finished
    pub fn current(&self) -> Option<(&RunExercise, &SetTarget)> {
        let exercise = self.exercises.get(self.exercise_index)?;
        let target = exercise.sets.get(self.set_index)?;
        Some((exercise, target))
    }

    /// 1-based number of the current exercise and the total
    pub fn position(&self) -> (usize, usize) {
        (self.exercise_index + 1, self.exercises.len())
    }

    pub fn advance(&mut self) -> Step {
        let Some(exercise) = self.exercises.get(self.exercise_index) else {
            return Step::Finished;
        };

        if self.set_index + 1 < exercise.sets.len() {
            self.set_index += 1;
            return Step::NextSet;
        }

        let name = exercise.name.clone();
        self.exercise_index += 1;
        self.set_index = 0;
        if self.exercise_index >= self.exercises.len() {
            Step::Finished
        } else {
            Step::ExerciseFinished { name }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: i64, name: &str, reps: &[u32]) -> RunExercise {
        RunExercise {
            exercise_id: id,
            name: name.to_string(),
            sets: reps
                .iter()
                .enumerate()
                .map(|(i, &reps)| SetTarget {
                    set_index: i as u32 + 1,
                    reps,
                })
                .collect(),
        }
    }

    #[test]
    fn test_walks_every_set() {
        let mut run = TrainingRun::new(
            1,
            1,
            1,
            vec![exercise(1, "Жим", &[10, 8]), exercise(2, "Тяга", &[12])],
        )
        .unwrap();

        let (ex, set) = run.current().unwrap();
        assert_eq!((ex.exercise_id, set.set_index, set.reps), (1, 1, 10));

        assert_eq!(run.advance(), Step::NextSet);
        assert_eq!(run.current().unwrap().1.reps, 8);

        assert_eq!(
            run.advance(),
            Step::ExerciseFinished {
                name: "Жим".to_string()
            }
        );
        assert_eq!(run.position(), (2, 2));
        assert_eq!(run.current().unwrap().0.name, "Тяга");

        assert_eq!(run.advance(), Step::Finished);
        assert!(run.current().is_none());
        assert_eq!(run.advance(), Step::Finished);
    }

    #[test]
    fn test_exercises_without_sets_are_skipped() {
        let run = TrainingRun::new(
            1,
            1,
            1,
            vec![exercise(1, "Пусто", &[]), exercise(2, "Тяга", &[12])],
        )
        .unwrap();
        assert_eq!(run.current().unwrap().0.exercise_id, 2);
        assert_eq!(run.position(), (1, 1));
    }

    #[test]
    fn test_empty_day_has_no_run() {
        assert!(TrainingRun::new(1, 1, 1, vec![exercise(1, "Пусто", &[])]).is_none());
        assert!(TrainingRun::new(1, 1, 1, vec![]).is_none());
    }
}
