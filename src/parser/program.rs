//! Program segmenter
//!
//! Splits a whole message into days and exercise lines. The structured
//! format (`ПРОГРАММА:` + day headers) wins when present; otherwise a
//! free-form pass guesses days from headers and loose exercise lines.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::header::classify_day_header;
use super::line::{parse_exercise_line, strip_list_marker};
use super::reps::SETS_ANYWHERE;
use super::ParsedExercise;
use crate::config::ParserConfig;
use crate::error::LineError;

const STRUCTURED_TITLE: &str = "программа:";

/// Day name used when loose exercise lines are collected without headers
pub const LOOSE_DAY_NAME: &str = "Тренировка";

/// Messages shorter than this are never programs
const MIN_PROGRAM_TEXT_CHARS: usize = 20;

/// Shortest exercise line worth keeping
const MIN_EXERCISE_LINE_CHARS: usize = 4;

static FREE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:программа|название)\s*[:\-–—]\s*(.+)$").unwrap());

static HAS_DAYS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)день\s+[0-9]+|день\s+(?:ног|спины|груди|рук|плеч)|\b(?:понедельник|вторник|среда|четверг|пятница|суббота|воскресенье|пн|вт|ср|чт|пт|сб|вс)\b",
    )
    .unwrap()
});

static HAS_DASHED_SETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[—–-]\s*[0-9]+\s*(?:[xх×*\-–—]|подход)").unwrap());

/// One exercise of a day: the line as typed, or already parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DraftExercise {
    Raw(String),
    Parsed(ParsedExercise),
}

impl DraftExercise {
    /// Text shown in previews
    pub fn display(&self) -> String {
        match self {
            DraftExercise::Raw(line) => line.clone(),
            DraftExercise::Parsed(exercise) => exercise.raw_line(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayDraft {
    pub name: String,
    pub exercises: Vec<DraftExercise>,
}

impl DayDraft {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exercises: Vec::new(),
        }
    }

    /// Exercises that went through the line parser
    pub fn parsed(&self) -> impl Iterator<Item = &ParsedExercise> {
        self.exercises.iter().filter_map(|e| match e {
            DraftExercise::Parsed(p) => Some(p),
            DraftExercise::Raw(_) => None,
        })
    }
}

/// A program that has not been saved yet. Built only through
/// [`ProgramBuilder`], always has at least one day with an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramDraft {
    name: String,
    days: Vec<DayDraft>,
}

/// Outcome of parsing every raw line of a draft
#[derive(Debug, Clone)]
pub struct ResolvedProgram {
    /// `None` when no line survived
    pub draft: Option<ProgramDraft>,
    pub errors: Vec<LineError>,
}

impl ProgramDraft {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn days(&self) -> &[DayDraft] {
        &self.days
    }

    pub fn exercise_count(&self) -> usize {
        self.days.iter().map(|d| d.exercises.len()).sum()
    }

    /// Run every raw line through the line parser. Lines that fail are
    /// reported and dropped, days left empty disappear.
    pub fn resolve(self, config: &ParserConfig) -> ResolvedProgram {
        let mut builder = ProgramBuilder::new();
        builder.set_name(self.name);
        let mut errors = Vec::new();

        for day in self.days {
            builder.add_day(day.name);
            for exercise in day.exercises {
                let parsed = match exercise {
                    DraftExercise::Parsed(p) => Ok(p),
                    DraftExercise::Raw(line) => parse_exercise_line(&line, config).validate(&line),
                };
                match parsed {
                    Ok(p) => {
                        builder.add_exercise(DraftExercise::Parsed(p));
                    }
                    Err(e) => errors.push(e),
                }
            }
        }

        ResolvedProgram {
            draft: builder.finalize(&config.default_program_name),
            errors,
        }
    }
}

/// Accumulates days while text is being walked
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    name: Option<String>,
    days: Vec<DayDraft>,
    current: Option<DayDraft>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    /// Close the current day (kept only if it has exercises) and open a new one
    pub fn add_day(&mut self, name: impl Into<String>) {
        self.flush();
        self.current = Some(DayDraft::new(name));
    }

    /// Append to the open day. Returns false when no day is open.
    pub fn add_exercise(&mut self, exercise: DraftExercise) -> bool {
        match self.current.as_mut() {
            Some(day) => {
                day.exercises.push(exercise);
                true
            }
            None => false,
        }
    }

    pub fn current_day(&self) -> Option<&DayDraft> {
        self.current.as_ref()
    }

    /// Days already closed with at least one exercise
    pub fn completed_days(&self) -> usize {
        self.days.len()
    }

    fn flush(&mut self) {
        if let Some(day) = self.current.take() {
            if !day.exercises.is_empty() {
                self.days.push(day);
            }
        }
    }

    /// `None` when no day has an exercise
    pub fn finalize(mut self, default_name: &str) -> Option<ProgramDraft> {
        self.flush();
        if self.days.is_empty() {
            return None;
        }
        Some(ProgramDraft {
            name: self.name.unwrap_or_else(|| default_name.to_string()),
            days: self.days,
        })
    }
}

/// Split a message into a program, or `None` if it does not look like one
pub fn segment_program(text: &str, config: &ParserConfig) -> Option<ProgramDraft> {
    if let Some(draft) = segment_structured(text) {
        debug!(days = draft.days.len(), "structured program");
        return Some(draft);
    }
    if let Some(draft) = segment_free_form(text, config) {
        debug!(days = draft.days.len(), "free-form program");
        return Some(draft);
    }
    let draft = segment_loose(text, config);
    if draft.is_none() {
        debug!("not a program");
    }
    draft
}

/// `ПРОГРАММА: <name>` followed by day headers and exercise lines
fn segment_structured(text: &str) -> Option<ProgramDraft> {
    let mut builder = ProgramBuilder::new();

    for line in non_empty_lines(text) {
        if let Some(name) = structured_title(line) {
            builder.set_name(name);
            continue;
        }
        if let Some(day) = classify_day_header(line) {
            builder.add_day(day);
            continue;
        }
        if builder.current_day().is_some() {
            if let Some(exercise) = exercise_candidate(line) {
                builder.add_exercise(DraftExercise::Raw(exercise));
            }
        }
    }

    if !builder.has_name() {
        return None;
    }
    builder.finalize("")
}

fn segment_free_form(text: &str, config: &ParserConfig) -> Option<ProgramDraft> {
    let mut builder = ProgramBuilder::new();
    if let Some(name) = free_title(text) {
        builder.set_name(name);
    }

    for line in non_empty_lines(text) {
        if FREE_TITLE.is_match(line) {
            continue;
        }
        if let Some(day) = classify_day_header(line) {
            builder.add_day(day);
            continue;
        }
        let Some(exercise) = exercise_candidate(line) else {
            continue;
        };
        if builder.current_day().is_none() {
            let ordinal = builder.completed_days() + 1;
            builder.add_day(format!("День {}", ordinal));
        }
        builder.add_exercise(DraftExercise::Raw(exercise));
    }

    builder.finalize(&config.default_program_name)
}

/// Everything exercise-shaped as one day, if there is enough of it
fn segment_loose(text: &str, config: &ParserConfig) -> Option<ProgramDraft> {
    let exercises: Vec<String> = non_empty_lines(text).filter_map(exercise_candidate).collect();
    if exercises.len() < config.min_loose_exercises {
        return None;
    }

    let mut builder = ProgramBuilder::new();
    if let Some(name) = free_title(text) {
        builder.set_name(name);
    }
    builder.add_day(LOOSE_DAY_NAME);
    for exercise in exercises {
        builder.add_exercise(DraftExercise::Raw(exercise));
    }
    builder.finalize(&config.default_program_name)
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn structured_title(line: &str) -> Option<String> {
    let lower = line.to_lowercase();
    if !lower.starts_with(STRUCTURED_TITLE) {
        return None;
    }
    let (_, name) = line.split_once(':')?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn free_title(text: &str) -> Option<String> {
    FREE_TITLE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Separator or times sign that marks an exercise line. The Cyrillic "х"
/// also covers every "подход" line.
const SHAPE_MARKERS: [char; 7] = ['—', '–', '-', 'x', 'х', '×', '*'];

/// The line without its list marker, if it looks like an exercise with sets
pub fn exercise_candidate(line: &str) -> Option<String> {
    if !line.to_lowercase().contains(SHAPE_MARKERS) {
        return None;
    }

    let stripped = strip_list_marker(line).trim();
    if !SETS_ANYWHERE.is_match(stripped) || stripped.chars().count() < MIN_EXERCISE_LINE_CHARS {
        return None;
    }
    Some(stripped.to_string())
}

/// Cheap check that a chat message is worth running through the segmenter
pub fn is_program_text(text: &str, config: &ParserConfig) -> bool {
    let text = text.trim();
    if text.chars().count() < MIN_PROGRAM_TEXT_CHARS {
        return false;
    }

    let has_days = HAS_DAYS.is_match(text);
    if has_days {
        return HAS_DASHED_SETS.is_match(text);
    }

    non_empty_lines(text).filter_map(exercise_candidate).count() >= config.min_loose_exercises
}
