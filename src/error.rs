//! Per-line parse failures
//!
//! These are reported back to the user and never abort a batch.

/// Characters of the offending line quoted in a message
const QUOTE_CHARS: usize = 30;

/// Why a single exercise line was skipped
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("❌ Не удалось распознать: {}...", quote(.line))]
    UnrecognizedName { line: String },

    #[error(
        "❌ Не удалось распознать подходы в: {}...\n   Используйте формат: Название — 20-16-14-12",
        quote(.line)
    )]
    UnrecognizedSets { line: String },
}

impl LineError {
    pub fn line(&self) -> &str {
        match self {
            LineError::UnrecognizedName { line } | LineError::UnrecognizedSets { line } => line,
        }
    }
}

fn quote(line: &str) -> String {
    line.chars().take(QUOTE_CHARS).collect()
}
