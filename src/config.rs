//! Tunables for the parser and the bot

/// Reps assumed for "3 подхода" when no rep count follows
pub const DEFAULT_REPS: u32 = 10;

/// Numbers at or above this are weights, not reps (fallback extraction only)
pub const WEIGHT_THRESHOLD: u32 = 50;

/// Largest set count accepted from "C x R" / "C подхода"
pub const MAX_SETS: u32 = 30;

/// Exercise-shaped lines needed to build a program without day headers
pub const MIN_LOOSE_EXERCISES: usize = 3;

/// Programs a single user may keep at once
pub const MAX_PROGRAMS_PER_USER: usize = 2;

pub const DEFAULT_PROGRAM_NAME: &str = "Программа от пользователя";

/// Knobs for the free-text parser
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    pub default_reps: u32,
    pub weight_threshold: u32,
    pub max_sets: u32,
    pub min_loose_exercises: usize,
    pub default_program_name: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_reps: DEFAULT_REPS,
            weight_threshold: WEIGHT_THRESHOLD,
            max_sets: MAX_SETS,
            min_loose_exercises: MIN_LOOSE_EXERCISES,
            default_program_name: DEFAULT_PROGRAM_NAME.to_string(),
        }
    }
}

/// Bot-level settings, shared with handlers through the dispatcher
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub max_programs_per_user: usize,
    pub parser: ParserConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_programs_per_user: MAX_PROGRAMS_PER_USER,
            parser: ParserConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_defaults_use_named_constants() {
        let config = ParserConfig::default();
        assert_eq!(config.default_reps, 10);
        assert_eq!(config.weight_threshold, 50);
        assert_eq!(config.min_loose_exercises, 3);
    }

    #[test]
    fn test_bot_default_limit() {
        assert_eq!(BotConfig::default().max_programs_per_user, 2);
    }
}
