//! Weight progression between training runs
//!
//! A freshly recorded set is compared with the last time the same user did
//! the same set of the same exercise. The lookup goes by exercise id first,
//! then by exercise name, so a program re-created from scratch still finds
//! its history.

use std::fmt;

use anyhow::Result;

use crate::db::PerformedSet;

/// Read side of the performed-set store
pub trait WeightHistory {
    /// Most recent set of `exercise_id` at `set_index` for the user,
    /// skipping the record `exclude_id`
    fn last_performed_by_exercise(
        &self,
        user_id: i64,
        exercise_id: i64,
        set_index: u32,
        exclude_id: Option<i64>,
    ) -> Result<Option<PerformedSet>>;

    /// Same as [`last_performed_by_exercise`](Self::last_performed_by_exercise)
    /// but matched on the stored exercise name
    fn last_performed_by_name(
        &self,
        user_id: i64,
        exercise_name: &str,
        set_index: u32,
        exclude_id: Option<i64>,
    ) -> Result<Option<PerformedSet>>;
}

/// Which set to look up
#[derive(Debug, Clone, Copy)]
pub struct SetQuery<'a> {
    pub user_id: i64,
    pub exercise_id: i64,
    pub exercise_name: &'a str,
    pub set_index: u32,
    /// Record to skip, normally the one just inserted
    pub exclude_id: Option<i64>,
}

impl<'a> SetQuery<'a> {
    /// Query for the set that came before `record`
    pub fn before(user_id: i64, record: &'a PerformedSet) -> Self {
        Self {
            user_id,
            exercise_id: record.exercise_id,
            exercise_name: &record.exercise_name,
            set_index: record.set_index,
            exclude_id: Some(record.id),
        }
    }
}

/// Difference to the previous weight, rounded to 0.1 kg
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightDelta {
    New,
    Unchanged,
    Up(f64),
    Down(f64),
}

impl WeightDelta {
    pub fn between(current: f64, previous: Option<f64>) -> Self {
        let Some(previous) = previous else {
            return WeightDelta::New;
        };
        let diff = ((current - previous) * 10.0).round() / 10.0;
        if diff > 0.0 {
            WeightDelta::Up(diff)
        } else if diff < 0.0 {
            WeightDelta::Down(diff)
        } else {
            WeightDelta::Unchanged
        }
    }
}

impl fmt::Display for WeightDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightDelta::New => write!(f, "новая запись"),
            WeightDelta::Unchanged => write!(f, "без изменений"),
            WeightDelta::Up(d) => write!(f, "+{:.1} кг", d),
            WeightDelta::Down(d) => write!(f, "{:.1} кг", d),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub current: f64,
    pub previous: Option<PerformedSet>,
    pub delta: WeightDelta,
}

/// Comparison for one set of a finished run
#[derive(Debug, Clone)]
pub struct SetComparison {
    pub exercise_name: String,
    pub set_index: u32,
    pub comparison: Comparison,
}

/// Previous record for the query, by id and then by name
pub fn previous_set<H: WeightHistory + ?Sized>(
    history: &H,
    query: &SetQuery<'_>,
) -> Result<Option<PerformedSet>> {
    if let Some(found) = history.last_performed_by_exercise(
        query.user_id,
        query.exercise_id,
        query.set_index,
        query.exclude_id,
    )? {
        return Ok(Some(found));
    }
    history.last_performed_by_name(
        query.user_id,
        query.exercise_name,
        query.set_index,
        query.exclude_id,
    )
}

pub fn compare<H: WeightHistory + ?Sized>(
    history: &H,
    query: &SetQuery<'_>,
    weight: f64,
) -> Result<Comparison> {
    let previous = previous_set(history, query)?;
    let delta = WeightDelta::between(weight, previous.as_ref().map(|p| p.weight));
    Ok(Comparison {
        current: weight,
        previous,
        delta,
    })
}

/// Compare every set of a run with what came before it
pub fn run_comparisons<H: WeightHistory + ?Sized>(
    history: &H,
    user_id: i64,
    sets: &[PerformedSet],
) -> Result<Vec<SetComparison>> {
    sets.iter()
        .map(|record| {
            let comparison = compare(history, &SetQuery::before(user_id, record), record.weight)?;
            Ok(SetComparison {
                exercise_name: record.exercise_name.clone(),
                set_index: record.set_index,
                comparison,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// (user_id, record), newest last
    struct MemoryHistory {
        records: Vec<(i64, PerformedSet)>,
    }

    impl MemoryHistory {
        fn last(
            &self,
            user_id: i64,
            set_index: u32,
            exclude_id: Option<i64>,
            matches: impl Fn(&PerformedSet) -> bool,
        ) -> Option<PerformedSet> {
            self.records
                .iter()
                .rev()
                .filter(|(user, r)| *user == user_id && r.set_index == set_index)
                .filter(|(_, r)| Some(r.id) != exclude_id)
                .map(|(_, r)| r)
                .find(|r| matches(r))
                .cloned()
        }
    }

    impl WeightHistory for MemoryHistory {
        fn last_performed_by_exercise(
            &self,
            user_id: i64,
            exercise_id: i64,
            set_index: u32,
            exclude_id: Option<i64>,
        ) -> Result<Option<PerformedSet>> {
            Ok(self.last(user_id, set_index, exclude_id, |r| r.exercise_id == exercise_id))
        }

        fn last_performed_by_name(
            &self,
            user_id: i64,
            exercise_name: &str,
            set_index: u32,
            exclude_id: Option<i64>,
        ) -> Result<Option<PerformedSet>> {
            Ok(self.last(user_id, set_index, exclude_id, |r| r.exercise_name == exercise_name))
        }
    }

    fn record(id: i64, exercise_id: i64, name: &str, set_index: u32, weight: f64) -> PerformedSet {
        PerformedSet {
            id,
            run_id: 1,
            exercise_id,
            exercise_name: name.to_string(),
            set_index,
            weight,
            performed_at: Utc.with_ymd_and_hms(2026, 10, 1, 18, 0, id as u32).unwrap(),
        }
    }

    fn query(exercise_id: i64, name: &str, set_index: u32) -> SetQuery<'_> {
        SetQuery {
            user_id: 1,
            exercise_id,
            exercise_name: name,
            set_index,
            exclude_id: None,
        }
    }

    #[test]
    fn test_weight_increase_is_reported() {
        let history = MemoryHistory {
            records: vec![(1, record(1, 7, "Жим лёжа", 2, 45.0))],
        };
        let cmp = compare(&history, &query(7, "Жим лёжа", 2), 50.0).unwrap();
        assert_eq!(cmp.previous.map(|p| p.weight), Some(45.0));
        assert_eq!(cmp.delta.to_string(), "+5.0 кг");
    }

    #[test]
    fn test_first_time_is_new() {
        let history = MemoryHistory { records: vec![] };
        let cmp = compare(&history, &query(7, "Жим лёжа", 1), 40.0).unwrap();
        assert!(cmp.previous.is_none());
        assert_eq!(cmp.delta.to_string(), "новая запись");
    }

    #[test]
    fn test_exclusion_by_identity_keeps_equal_weights() {
        let history = MemoryHistory {
            records: vec![
                (1, record(1, 7, "Жим", 1, 60.0)),
                (1, record(2, 7, "Жим", 1, 60.0)),
            ],
        };
        let just_inserted = &history.records[1].1;
        let cmp = compare(&history, &SetQuery::before(1, just_inserted), 60.0).unwrap();
        assert_eq!(cmp.previous.map(|p| p.id), Some(1));
        assert_eq!(cmp.delta.to_string(), "без изменений");
    }

    #[test]
    fn test_falls_back_to_name() {
        let history = MemoryHistory {
            records: vec![(1, record(1, 3, "Присед — 4 подхода", 1, 100.0))],
        };
        let cmp = compare(&history, &query(9, "Присед — 4 подхода", 1), 97.5).unwrap();
        assert_eq!(cmp.previous.map(|p| p.exercise_id), Some(3));
        assert_eq!(cmp.delta.to_string(), "-2.5 кг");
    }

    #[test]
    fn test_other_users_and_sets_are_ignored() {
        let history = MemoryHistory {
            records: vec![
                (2, record(1, 7, "Жим", 1, 80.0)),
                (1, record(2, 7, "Жим", 2, 70.0)),
            ],
        };
        let cmp = compare(&history, &query(7, "Жим", 1), 50.0).unwrap();
        assert!(cmp.previous.is_none());
    }

    #[test]
    fn test_delta_rounding() {
        assert_eq!(WeightDelta::between(50.04, Some(50.0)), WeightDelta::Unchanged);
        assert_eq!(WeightDelta::between(0.3, Some(0.1)).to_string(), "+0.2 кг");
        assert_eq!(WeightDelta::between(42.5, Some(45.0)), WeightDelta::Down(-2.5));
    }

    #[test]
    fn test_run_comparisons() {
        let history = MemoryHistory {
            records: vec![
                (1, record(1, 7, "Жим", 1, 40.0)),
                (1, record(2, 7, "Жим", 1, 42.5)),
                (1, record(3, 7, "Жим", 2, 40.0)),
            ],
        };
        let run: Vec<_> = history.records[1..].iter().map(|(_, r)| r.clone()).collect();
        let result = run_comparisons(&history, 1, &run).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].set_index, 1);
        assert_eq!(result[0].comparison.delta.to_string(), "+2.5 кг");
        assert_eq!(result[1].comparison.delta, WeightDelta::New);
    }
}
