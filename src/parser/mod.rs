//! Free-text program parser
//!
//! Best-effort heuristics for workout text as people actually type it:
//! - `reps` - rep pattern matcher ("20-16-14-12", "4х10", "3 подхода по 10")
//! - `line` - exercise line parser (name + sets)
//! - `header` - day header classifier ("День 1", "Пн", "Ноги")
//! - `program` - multi-day program segmenter
//! - `format` - canonical names and raw-form reconstruction
//! - `batch` - many exercise lines at once, with per-line errors

pub mod batch;
pub mod format;
pub mod header;
pub mod line;
pub mod program;
pub mod reps;

pub use batch::{ExerciseBatch, parse_exercise_lines};
pub use header::classify_day_header;
pub use line::parse_exercise_line;
pub use program::{
    DayDraft, DraftExercise, ProgramBuilder, ProgramDraft, is_program_text, segment_program,
};
pub use reps::{RepGrammar, parse_sets};

use serde::{Deserialize, Serialize};

use crate::error::LineError;

/// An exercise name with one rep count per set, set 1 first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedExercise {
    pub name: String,
    pub reps: Vec<u32>,
}

impl ParsedExercise {
    pub fn set_count(&self) -> usize {
        self.reps.len()
    }

    /// Name as stored: `"Жим лёжа — 4 подхода"`
    pub fn canonical_name(&self) -> String {
        format::canonical_name(&self.name, self.reps.len())
    }

    /// Name as typed: `"Жим лёжа — 10-10-10-10"`
    pub fn raw_line(&self) -> String {
        format::raw_line(&self.name, &self.reps)
    }

    /// Turn an incomplete parse into the error the user sees for `line`
    pub fn validate(self, line: &str) -> Result<Self, LineError> {
        if self.name.is_empty() {
            return Err(LineError::UnrecognizedName {
                line: line.to_string(),
            });
        }
        if self.reps.is_empty() {
            return Err(LineError::UnrecognizedSets {
                line: line.to_string(),
            });
        }
        Ok(self)
    }
}
