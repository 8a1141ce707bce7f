//! Several exercise lines at once, as sent while filling in a day

use tracing::debug;

use super::ParsedExercise;
use super::line::parse_exercise_line;
use crate::config::ParserConfig;
use crate::error::LineError;

/// Errors shown back to the user per message
pub const MAX_REPORTED_ERRORS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct ExerciseBatch {
    pub parsed: Vec<ParsedExercise>,
    pub errors: Vec<LineError>,
}

impl ExerciseBatch {
    pub fn added(&self) -> usize {
        self.parsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty() && self.errors.is_empty()
    }

    /// First few errors, plus how many were left out
    pub fn error_sample(&self) -> (&[LineError], usize) {
        error_sample(&self.errors)
    }
}

/// The first `MAX_REPORTED_ERRORS` errors and how many were left out
pub fn error_sample(errors: &[LineError]) -> (&[LineError], usize) {
    let shown = errors.len().min(MAX_REPORTED_ERRORS);
    (&errors[..shown], errors.len() - shown)
}

/// Parse every non-blank line independently. A bad line never stops the rest.
pub fn parse_exercise_lines(text: &str, config: &ParserConfig) -> ExerciseBatch {
    let mut batch = ExerciseBatch::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_exercise_line(line, config).validate(line) {
            Ok(exercise) => batch.parsed.push(exercise),
            Err(e) => batch.errors.push(e),
        }
    }

    debug!(
        added = batch.parsed.len(),
        failed = batch.errors.len(),
        "parsed exercise batch"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ExerciseBatch {
        parse_exercise_lines(text, &ParserConfig::default())
    }

    #[test]
    fn test_mixed_batch() {
        let batch = parse("Жим лёжа — 4х10\n\nПланка\n— 3x12\nТяга — 12-10-8");
        assert_eq!(batch.added(), 2);
        assert_eq!(batch.parsed[1].name, "Тяга");
        assert_eq!(batch.errors.len(), 2);
        assert!(matches!(batch.errors[0], LineError::UnrecognizedSets { .. }));
        assert!(matches!(batch.errors[1], LineError::UnrecognizedName { .. }));
    }

    #[test]
    fn test_error_sample_is_capped() {
        let batch = parse("а\nб\nв\nг\nд");
        assert_eq!(batch.added(), 0);
        let (shown, hidden) = batch.error_sample();
        assert_eq!(shown.len(), 3);
        assert_eq!(hidden, 2);
        assert_eq!(shown[0].line(), "а");
    }

    #[test]
    fn test_blank_text() {
        assert!(parse(" \n\n ").is_empty());
    }
}
