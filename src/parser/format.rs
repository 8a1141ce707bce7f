//! Canonical exercise names and the raw-form round trip
//!
//! Stored names look like `"Жим лёжа — 4 подхода"`; for display the raw form
//! `"Жим лёжа — 10-10-8-8"` is rebuilt from the stored set templates.

use once_cell::sync::Lazy;
use regex::Regex;

use super::line::parse_exercise_line;
use super::reps::{SETS_ANYWHERE, is_explicit_sets};
use crate::config::ParserConfig;

static CANONICAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*—\s*[0-9]+\s+подход\w*\s*$").unwrap());

/// `"<name> — <count> подхода"`
pub fn canonical_name(name: &str, set_count: usize) -> String {
    format!("{} — {} подхода", name, set_count)
}

/// `"<name> — 20-16-14-12"`
pub fn raw_line(name: &str, reps: &[u32]) -> String {
    let joined = reps
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("-");
    format!("{} — {}", name, joined)
}

pub fn is_canonical(name: &str) -> bool {
    CANONICAL_SUFFIX.is_match(name)
}

/// Name without a trailing `— N подхода`
pub fn strip_canonical_suffix(name: &str) -> &str {
    match CANONICAL_SUFFIX.find(name) {
        Some(m) => name[..m.start()].trim(),
        None => name.trim(),
    }
}

/// True when a dash in the line is directly followed by a rep list or
/// `C x R`, i.e. the line already shows its sets
pub fn is_raw_form(line: &str, config: &ParserConfig) -> bool {
    line.char_indices()
        .filter(|(_, c)| matches!(c, '—' | '–' | '-'))
        .any(|(idx, dash)| {
            let tail = line[idx + dash.len_utf8()..].trim_start();
            SETS_ANYWHERE
                .find(tail)
                .filter(|m| m.start() == 0)
                .is_some_and(|m| is_explicit_sets(m.as_str(), config))
        })
}

/// How a stored exercise is shown in a day listing
pub fn display_line(stored_name: &str, reps: &[u32], config: &ParserConfig) -> String {
    if is_raw_form(stored_name, config) || reps.is_empty() {
        return stored_name.to_string();
    }
    raw_line(strip_canonical_suffix(stored_name), reps)
}

/// Bare exercise name, whichever form is stored
pub fn base_exercise_name(stored_name: &str, config: &ParserConfig) -> String {
    if is_canonical(stored_name) {
        return strip_canonical_suffix(stored_name).to_string();
    }
    if is_raw_form(stored_name, config) {
        let parsed = parse_exercise_line(stored_name, config);
        if !parsed.name.is_empty() {
            return parsed.name;
        }
    }
    stored_name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sets;

    fn config() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("Жим лёжа", 4), "Жим лёжа — 4 подхода");
        assert!(is_canonical("Жим лёжа — 4 подхода"));
        assert!(!is_canonical("Жим лёжа — 4х10"));
    }

    #[test]
    fn test_round_trip_from_raw_line() {
        let line = "Хаммер верхний — 16-10-12";
        let parsed = parse_exercise_line(line, &config());
        assert_eq!(raw_line(&parsed.name, &parsed.reps), line);
    }

    #[test]
    fn test_round_trip_normalizes_whitespace() {
        let line = "Хаммер   верхний —16-10-12";
        let parsed = parse_exercise_line(line, &config());
        assert_eq!(raw_line(&parsed.name, &parsed.reps), "Хаммер верхний — 16-10-12");
    }

    #[test]
    fn test_canonical_reconstruction_is_idempotent() {
        let reps = vec![12, 10, 8];
        let stored = canonical_name("Тяга рейдера", reps.len());
        let shown = display_line(&stored, &reps, &config());
        assert_eq!(shown, "Тяга рейдера — 12-10-8");

        let reparsed = parse_exercise_line(&shown, &config());
        assert_eq!(reparsed.reps, reps);
        assert_eq!(reparsed.name, "Тяга рейдера");
    }

    #[test]
    fn test_raw_form_detection() {
        let config = config();
        assert!(is_raw_form("Гакк-присед — 20-16-14-12", &config));
        assert!(is_raw_form("Жим лёжа - 4х10", &config));
        assert!(is_raw_form("Жим — 3*10-12 (медленно)", &config));
        assert!(!is_raw_form("Жим лёжа — 4 подхода", &config));
        assert!(!is_raw_form("Гакк-присед", &config));
    }

    #[test]
    fn test_display_keeps_raw_names() {
        let config = config();
        let stored = "Гакк-присед — 20-16-14-12";
        assert_eq!(display_line(stored, &[20, 16, 14, 12], &config), stored);
        assert_eq!(display_line("Планка", &[], &config), "Планка");
    }

    #[test]
    fn test_base_name_from_either_form() {
        let config = config();
        assert_eq!(base_exercise_name("Хаммер верхний — 3 подхода", &config), "Хаммер верхний");
        assert_eq!(base_exercise_name("Хаммер верхний — 16-10-12", &config), "Хаммер верхний");
        assert_eq!(base_exercise_name("Планка", &config), "Планка");
    }

    #[test]
    fn test_detection_agrees_with_matcher() {
        let config = config();
        for sets in ["20-16-14-12", "4x10", "4×8–10"] {
            let line = format!("Упражнение — {}", sets);
            assert!(is_raw_form(&line, &config), "line: {}", line);
            assert!(!parse_sets(sets, &config).is_empty());
        }
    }
}
