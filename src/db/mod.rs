//! Database module - SQLite storage for programs and training history

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::parser::ProgramDraft;
use crate::progress::WeightHistory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A saved training program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub id: i64,
    pub program_id: i64,
    pub day_index: u32,
    pub name: String,
}

/// Exercise of a day with its set templates, set 1 first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub day_id: i64,
    pub name: String,
    pub position: u32,
    pub sets: Vec<SetTemplate>,
}

impl Exercise {
    pub fn reps(&self) -> Vec<u32> {
        self.sets.iter().map(|s| s.reps).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTemplate {
    pub id: i64,
    pub exercise_id: i64,
    pub set_index: u32,
    pub reps: u32,
    pub weight: Option<f64>,
}

/// One execution of a day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRun {
    pub id: i64,
    pub user_id: i64,
    pub program_id: i64,
    pub started_at: DateTime<Utc>,
}

/// Weight actually lifted for one set. `exercise_name` is the stored name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformedSet {
    pub id: i64,
    pub run_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub set_index: u32,
    pub weight: f64,
    pub performed_at: DateTime<Utc>,
}

const PERFORMED_SET_COLUMNS: &str = "ps.id, ps.run_id, ps.exercise_id, e.name, ps.set_index, ps.weight, ps.performed_at";

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        info!(path, "database opened");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                telegram_id INTEGER NOT NULL UNIQUE,
                username TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS programs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS workout_days (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                program_id INTEGER NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                day_index INTEGER NOT NULL,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                day_id INTEGER NOT NULL REFERENCES workout_days(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                position INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS set_templates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                set_index INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight REAL
            );

            CREATE TABLE IF NOT EXISTS session_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                program_id INTEGER NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                started_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS performed_sets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                set_index INTEGER NOT NULL,
                weight REAL NOT NULL,
                performed_at TEXT NOT NULL,
                run_id INTEGER NOT NULL REFERENCES session_runs(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_performed_sets_lookup
                ON performed_sets (exercise_id, set_index, run_id);",
        )?;
        Ok(())
    }

    // Users

    /// Find the user by Telegram id, creating it on first contact
    pub fn get_or_create_user(&self, telegram_id: i64, username: Option<&str>) -> Result<User> {
        self.conn.execute(
            "INSERT INTO users (telegram_id, username, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(telegram_id) DO UPDATE SET username = COALESCE(excluded.username, username)",
            params![telegram_id, username, timestamp(Utc::now())],
        )?;
        let user = self.conn.query_row(
            "SELECT id, telegram_id, username, created_at FROM users WHERE telegram_id = ?1",
            [telegram_id],
            user_from_row,
        )?;
        Ok(user)
    }

    pub fn find_user(&self, telegram_id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, telegram_id, username, created_at FROM users WHERE telegram_id = ?1",
                [telegram_id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, telegram_id, username, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    // Programs

    /// User's programs, oldest first
    pub fn list_programs(&self, user_id: i64) -> Result<Vec<Program>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, created_at FROM programs WHERE user_id = ?1 ORDER BY id",
        )?;
        let programs = stmt
            .query_map([user_id], program_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(programs)
    }

    pub fn get_program(&self, program_id: i64) -> Result<Option<Program>> {
        let program = self
            .conn
            .query_row(
                "SELECT id, user_id, name, created_at FROM programs WHERE id = ?1",
                [program_id],
                program_from_row,
            )
            .optional()?;
        Ok(program)
    }

    pub fn count_programs(&self, user_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM programs WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn create_program(&self, user_id: i64, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO programs (user_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, name, timestamp(Utc::now())],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Delete a program with its days, exercises and history.
    /// Returns false if the program does not belong to the user.
    pub fn delete_program(&self, program_id: i64, user_id: i64) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM programs WHERE id = ?1 AND user_id = ?2",
            params![program_id, user_id],
        )?;
        if deleted > 0 {
            info!(program_id, user_id, "program deleted");
        }
        Ok(deleted > 0)
    }

    // Days

    pub fn create_workout_day(&self, program_id: i64, day_index: u32, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO workout_days (program_id, day_index, name) VALUES (?1, ?2, ?3)",
            params![program_id, day_index, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_workout_days(&self, program_id: i64) -> Result<Vec<WorkoutDay>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, program_id, day_index, name FROM workout_days
             WHERE program_id = ?1 ORDER BY day_index, id",
        )?;
        let days = stmt
            .query_map([program_id], day_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(days)
    }

    pub fn get_workout_day(&self, day_id: i64) -> Result<Option<WorkoutDay>> {
        let day = self
            .conn
            .query_row(
                "SELECT id, program_id, day_index, name FROM workout_days WHERE id = ?1",
                [day_id],
                day_from_row,
            )
            .optional()?;
        Ok(day)
    }

    // Exercises

    pub fn create_exercise(&self, day_id: i64, name: &str, position: u32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO exercises (day_id, name, position) VALUES (?1, ?2, ?3)",
            params![day_id, name, position],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Day's exercises in order, each with its set templates
    pub fn get_exercises(&self, day_id: i64) -> Result<Vec<Exercise>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, day_id, name, position FROM exercises
             WHERE day_id = ?1 ORDER BY position, id",
        )?;
        let mut exercises = stmt
            .query_map([day_id], exercise_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for exercise in &mut exercises {
            exercise.sets = self.get_set_templates(exercise.id)?;
        }
        Ok(exercises)
    }

    pub fn get_exercise(&self, exercise_id: i64) -> Result<Option<Exercise>> {
        let exercise = self
            .conn
            .query_row(
                "SELECT id, day_id, name, position FROM exercises WHERE id = ?1",
                [exercise_id],
                exercise_from_row,
            )
            .optional()?;

        match exercise {
            Some(mut exercise) => {
                exercise.sets = self.get_set_templates(exercise.id)?;
                Ok(Some(exercise))
            }
            None => Ok(None),
        }
    }

    pub fn create_set_template(
        &self,
        exercise_id: i64,
        set_index: u32,
        reps: u32,
        weight: Option<f64>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO set_templates (exercise_id, set_index, reps, weight) VALUES (?1, ?2, ?3, ?4)",
            params![exercise_id, set_index, reps, weight],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_set_templates(&self, exercise_id: i64) -> Result<Vec<SetTemplate>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, exercise_id, set_index, reps, weight FROM set_templates
             WHERE exercise_id = ?1 ORDER BY set_index",
        )?;
        let sets = stmt
            .query_map([exercise_id], |row| {
                Ok(SetTemplate {
                    id: row.get(0)?,
                    exercise_id: row.get(1)?,
                    set_index: row.get(2)?,
                    reps: row.get(3)?,
                    weight: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sets)
    }

    /// Store a parsed program in one transaction. Only parsed exercises are
    /// written; names are stored in canonical form.
    pub fn save_program(&self, user_id: i64, draft: &ProgramDraft) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let now = timestamp(Utc::now());

        tx.execute(
            "INSERT INTO programs (user_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, draft.name(), now],
        )?;
        let program_id = tx.last_insert_rowid();

        for (day_index, day) in draft.days().iter().enumerate() {
            tx.execute(
                "INSERT INTO workout_days (program_id, day_index, name) VALUES (?1, ?2, ?3)",
                params![program_id, day_index as u32, day.name],
            )?;
            let day_id = tx.last_insert_rowid();

            for (position, exercise) in day.parsed().enumerate() {
                tx.execute(
                    "INSERT INTO exercises (day_id, name, position) VALUES (?1, ?2, ?3)",
                    params![day_id, exercise.canonical_name(), position as u32],
                )?;
                let exercise_id = tx.last_insert_rowid();

                for (idx, reps) in exercise.reps.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO set_templates (exercise_id, set_index, reps) VALUES (?1, ?2, ?3)",
                        params![exercise_id, idx as u32 + 1, reps],
                    )?;
                }
            }
        }

        tx.commit()?;
        info!(
            program_id,
            user_id,
            days = draft.days().len(),
            "program saved"
        );
        Ok(program_id)
    }

    // Training history

    pub fn create_session_run(&self, user_id: i64, program_id: i64) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO session_runs (user_id, program_id, started_at) VALUES (?1, ?2, ?3)",
            params![user_id, program_id, timestamp(Utc::now())],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_session_run(&self, run_id: i64) -> Result<Option<SessionRun>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, user_id, program_id, started_at FROM session_runs WHERE id = ?1",
                [run_id],
                |row| {
                    let started_at: String = row.get(3)?;
                    Ok(SessionRun {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        program_id: row.get(2)?,
                        started_at: parse_timestamp(&started_at),
                    })
                },
            )
            .optional()?;
        Ok(run)
    }

    /// Record a set performed now
    pub fn add_performed_set(
        &self,
        run_id: i64,
        exercise_id: i64,
        set_index: u32,
        weight: f64,
    ) -> Result<PerformedSet> {
        self.add_performed_set_at(run_id, exercise_id, set_index, weight, Utc::now())
    }

    pub fn add_performed_set_at(
        &self,
        run_id: i64,
        exercise_id: i64,
        set_index: u32,
        weight: f64,
        performed_at: DateTime<Utc>,
    ) -> Result<PerformedSet> {
        self.conn.execute(
            "INSERT INTO performed_sets (exercise_id, set_index, weight, performed_at, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![exercise_id, set_index, weight, timestamp(performed_at), run_id],
        )?;
        let id = self.conn.last_insert_rowid();
        let record = self.conn.query_row(
            &format!(
                "SELECT {PERFORMED_SET_COLUMNS} FROM performed_sets ps
                 JOIN exercises e ON e.id = ps.exercise_id
                 WHERE ps.id = ?1"
            ),
            [id],
            performed_set_from_row,
        )?;
        Ok(record)
    }

    /// Sets of one run in the order they were done
    pub fn get_performed_sets_by_run(&self, run_id: i64) -> Result<Vec<PerformedSet>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PERFORMED_SET_COLUMNS} FROM performed_sets ps
             JOIN exercises e ON e.id = ps.exercise_id
             WHERE ps.run_id = ?1
             ORDER BY ps.performed_at, ps.id"
        ))?;
        let sets = stmt
            .query_map([run_id], performed_set_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sets)
    }

    /// User's history of one exercise, keyed by set index, oldest first
    pub fn exercise_history(
        &self,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<BTreeMap<u32, Vec<PerformedSet>>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PERFORMED_SET_COLUMNS} FROM performed_sets ps
             JOIN exercises e ON e.id = ps.exercise_id
             JOIN session_runs r ON r.id = ps.run_id
             WHERE r.user_id = ?1 AND ps.exercise_id = ?2
             ORDER BY ps.set_index, ps.performed_at, ps.id"
        ))?;
        let rows = stmt.query_map([user_id, exercise_id], performed_set_from_row)?;

        let mut history: BTreeMap<u32, Vec<PerformedSet>> = BTreeMap::new();
        for row in rows {
            let set = row?;
            history.entry(set.set_index).or_default().push(set);
        }
        Ok(history)
    }

    fn last_performed_where(
        &self,
        filter: &str,
        user_id: i64,
        key: &dyn rusqlite::ToSql,
        set_index: u32,
        exclude_id: Option<i64>,
    ) -> Result<Option<PerformedSet>> {
        let sql = format!(
            "SELECT {PERFORMED_SET_COLUMNS} FROM performed_sets ps
             JOIN exercises e ON e.id = ps.exercise_id
             JOIN session_runs r ON r.id = ps.run_id
             WHERE r.user_id = ?1 AND {filter} = ?2 AND ps.set_index = ?3
               AND (?4 IS NULL OR ps.id != ?4)
             ORDER BY ps.performed_at DESC, ps.id DESC
             LIMIT 1"
        );
        let record = self
            .conn
            .query_row(
                &sql,
                params![user_id, key, set_index, exclude_id],
                performed_set_from_row,
            )
            .optional()?;
        Ok(record)
    }
}

impl WeightHistory for Database {
    fn last_performed_by_exercise(
        &self,
        user_id: i64,
        exercise_id: i64,
        set_index: u32,
        exclude_id: Option<i64>,
    ) -> Result<Option<PerformedSet>> {
        self.last_performed_where("ps.exercise_id", user_id, &exercise_id, set_index, exclude_id)
    }

    fn last_performed_by_name(
        &self,
        user_id: i64,
        exercise_name: &str,
        set_index: u32,
        exclude_id: Option<i64>,
    ) -> Result<Option<PerformedSet>> {
        self.last_performed_where("e.name", user_id, &exercise_name, set_index, exclude_id)
    }
}

/// Fixed-width RFC 3339 so that text order is time order
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let created_at: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        telegram_id: row.get(1)?,
        username: row.get(2)?,
        created_at: parse_timestamp(&created_at),
    })
}

fn program_from_row(row: &Row<'_>) -> rusqlite::Result<Program> {
    let created_at: String = row.get(3)?;
    Ok(Program {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        created_at: parse_timestamp(&created_at),
    })
}

fn day_from_row(row: &Row<'_>) -> rusqlite::Result<WorkoutDay> {
    Ok(WorkoutDay {
        id: row.get(0)?,
        program_id: row.get(1)?,
        day_index: row.get(2)?,
        name: row.get(3)?,
    })
}

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: row.get(0)?,
        day_id: row.get(1)?,
        name: row.get(2)?,
        position: row.get(3)?,
        sets: Vec::new(),
    })
}

fn performed_set_from_row(row: &Row<'_>) -> rusqlite::Result<PerformedSet> {
    let performed_at: String = row.get(6)?;
    Ok(PerformedSet {
        id: row.get(0)?,
        run_id: row.get(1)?,
        exercise_id: row.get(2)?,
        exercise_name: row.get(3)?,
        set_index: row.get(4)?,
        weight: row.get(5)?,
        performed_at: parse_timestamp(&performed_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::config::ParserConfig;
    use crate::parser::segment_program;
    use crate::progress::{SetQuery, compare};

    const PROGRAM: &str = "ПРОГРАММА: Сила\n\
                           ДЕНЬ 1: Спина\n\
                           Тяга штанги — 12-10-8\n\
                           Подтягивания — 4х8\n\
                           ДЕНЬ 2: Ноги\n\
                           Присед — 5х5";

    fn setup() -> (Database, User, i64) {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user(1001, Some("ivan")).unwrap();
        let config = ParserConfig::default();
        let draft = segment_program(PROGRAM, &config)
            .unwrap()
            .resolve(&config)
            .draft
            .unwrap();
        let program_id = db.save_program(user.id, &draft).unwrap();
        (db, user, program_id)
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 18, minute, 0).unwrap()
    }

    #[test]
    fn test_get_or_create_user_is_stable() {
        let db = Database::open_in_memory().unwrap();
        let first = db.get_or_create_user(42, None).unwrap();
        let again = db.get_or_create_user(42, Some("petr")).unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.username.as_deref(), Some("petr"));

        let kept = db.get_or_create_user(42, None).unwrap();
        assert_eq!(kept.username.as_deref(), Some("petr"));
        assert_eq!(db.list_users().unwrap().len(), 1);
        assert!(db.find_user(43).unwrap().is_none());
    }

    #[test]
    fn test_save_program_layout() {
        let (db, user, program_id) = setup();
        assert_eq!(db.count_programs(user.id).unwrap(), 1);
        assert_eq!(db.get_program(program_id).unwrap().unwrap().name, "Сила");

        let days = db.get_workout_days(program_id).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!((days[0].day_index, days[0].name.as_str()), (0, "Спина"));
        assert_eq!((days[1].day_index, days[1].name.as_str()), (1, "Ноги"));

        let exercises = db.get_exercises(days[0].id).unwrap();
        assert_eq!(exercises.len(), 2);
        assert_eq!(exercises[0].name, "Тяга штанги — 3 подхода");
        assert_eq!(exercises[0].position, 0);
        assert_eq!(exercises[0].reps(), vec![12, 10, 8]);
        assert_eq!(exercises[0].sets[0].set_index, 1);
        assert_eq!(exercises[1].reps(), vec![8, 8, 8, 8]);
    }

    #[test]
    fn test_manual_program_creation() {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user(7, None).unwrap();
        let program_id = db.create_program(user.id, "Ручная").unwrap();
        let day_id = db.create_workout_day(program_id, 0, "Руки").unwrap();
        let exercise_id = db.create_exercise(day_id, "Бицепс — 2 подхода", 0).unwrap();
        db.create_set_template(exercise_id, 2, 10, None).unwrap();
        db.create_set_template(exercise_id, 1, 12, Some(20.0)).unwrap();

        let exercise = db.get_exercise(exercise_id).unwrap().unwrap();
        assert_eq!(exercise.reps(), vec![12, 10]);
        assert_eq!(exercise.sets[0].weight, Some(20.0));
        assert_eq!(db.get_workout_day(day_id).unwrap().unwrap().program_id, program_id);
        assert!(db.get_exercise(exercise_id + 100).unwrap().is_none());
    }

    #[test]
    fn test_delete_program_cascades() {
        let (db, user, program_id) = setup();
        let day = &db.get_workout_days(program_id).unwrap()[0];
        let exercise = &db.get_exercises(day.id).unwrap()[0];
        let run_id = db.create_session_run(user.id, program_id).unwrap();
        db.add_performed_set(run_id, exercise.id, 1, 60.0).unwrap();

        let stranger = db.get_or_create_user(2002, None).unwrap();
        assert!(!db.delete_program(program_id, stranger.id).unwrap());

        assert!(db.delete_program(program_id, user.id).unwrap());
        assert_eq!(db.count_programs(user.id).unwrap(), 0);
        assert!(db.get_workout_day(day.id).unwrap().is_none());
        assert!(db.get_exercise(exercise.id).unwrap().is_none());
        assert!(db.get_session_run(run_id).unwrap().is_none());
        assert!(db.get_performed_sets_by_run(run_id).unwrap().is_empty());
    }

    #[test]
    fn test_progression_against_stored_history() {
        let (db, user, program_id) = setup();
        let day = &db.get_workout_days(program_id).unwrap()[0];
        let exercise = &db.get_exercises(day.id).unwrap()[0];

        let first_run = db.create_session_run(user.id, program_id).unwrap();
        db.add_performed_set_at(first_run, exercise.id, 2, 45.0, at(0)).unwrap();

        let second_run = db.create_session_run(user.id, program_id).unwrap();
        let record = db
            .add_performed_set_at(second_run, exercise.id, 2, 50.0, at(30))
            .unwrap();

        let cmp = compare(&db, &SetQuery::before(user.id, &record), record.weight).unwrap();
        assert_eq!(cmp.previous.as_ref().map(|p| p.weight), Some(45.0));
        assert_eq!(cmp.delta.to_string(), "+5.0 кг");
    }

    #[test]
    fn test_identical_weights_use_identity_exclusion() {
        let (db, user, program_id) = setup();
        let day = &db.get_workout_days(program_id).unwrap()[0];
        let exercise = &db.get_exercises(day.id).unwrap()[0];
        let run_id = db.create_session_run(user.id, program_id).unwrap();

        let same_time = at(5);
        let older = db.add_performed_set_at(run_id, exercise.id, 1, 60.0, same_time).unwrap();
        let newer = db.add_performed_set_at(run_id, exercise.id, 1, 60.0, same_time).unwrap();

        let previous = db
            .last_performed_by_exercise(user.id, exercise.id, 1, Some(newer.id))
            .unwrap()
            .unwrap();
        assert_eq!(previous.id, older.id);

        let latest = db
            .last_performed_by_exercise(user.id, exercise.id, 1, None)
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, newer.id);
    }

    #[test]
    fn test_name_lookup_spans_programs() {
        let (db, user, first_program) = setup();
        let day = &db.get_workout_days(first_program).unwrap()[1];
        let squat = &db.get_exercises(day.id).unwrap()[0];
        let run_id = db.create_session_run(user.id, first_program).unwrap();
        db.add_performed_set_at(run_id, squat.id, 1, 100.0, at(0)).unwrap();

        let found = db
            .last_performed_by_name(user.id, "Присед — 5 подходов", 1, None)
            .unwrap();
        assert!(found.is_none());

        let found = db
            .last_performed_by_name(user.id, &squat.name, 1, None)
            .unwrap()
            .unwrap();
        assert_eq!(found.weight, 100.0);

        let stranger = db.get_or_create_user(3003, None).unwrap();
        assert!(db
            .last_performed_by_name(stranger.id, &squat.name, 1, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_history_grouped_by_set() {
        let (db, user, program_id) = setup();
        let day = &db.get_workout_days(program_id).unwrap()[0];
        let exercise = &db.get_exercises(day.id).unwrap()[0];
        let run_id = db.create_session_run(user.id, program_id).unwrap();

        let start = at(0);
        db.add_performed_set_at(run_id, exercise.id, 1, 40.0, start).unwrap();
        db.add_performed_set_at(run_id, exercise.id, 2, 42.5, start + Duration::minutes(3)).unwrap();
        db.add_performed_set_at(run_id, exercise.id, 1, 45.0, start + Duration::days(3)).unwrap();

        let history = db.exercise_history(user.id, exercise.id).unwrap();
        assert_eq!(history.len(), 2);
        let weights: Vec<f64> = history[&1].iter().map(|s| s.weight).collect();
        assert_eq!(weights, vec![40.0, 45.0]);

        let run = db.get_performed_sets_by_run(run_id).unwrap();
        assert_eq!(run.len(), 3);
        assert_eq!(run[1].set_index, 2);
        assert_eq!(run[0].exercise_name, exercise.name);
        assert_eq!(db.get_session_run(run_id).unwrap().unwrap().user_id, user.id);
    }
}
