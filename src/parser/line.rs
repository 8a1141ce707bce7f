//! Exercise line parser
//!
//! Splits one line into an exercise name and a sets part, then hands the
//! sets part to the rep pattern matcher.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::ParsedExercise;
use super::reps::{SETS_ANYWHERE, parse_sets};
use crate::config::ParserConfig;

/// "/ тяга в тренажере" at the end of a line
static ALT_NAME_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*/\s*\p{L}[^/]*$").unwrap());

/// "25 кг /", "40kg -", "100 lbs"
static WEIGHT_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[0-9]+(?:[.,][0-9]+)?\s*(?:кг|kg|lbs|lb)\b\.?\s*[/\-–]?").unwrap()
});

/// "1. ", "2) ", "• ", "- ", "* "
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[0-9]+[.)]|[•*\-–—])\s*").unwrap());

/// A hyphen (not inside a number run) directly followed by a sets part
static HYPHEN_SETS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[^0-9])([-–])\s*(?:[0-9]+\s*[xх×*]\s*[0-9]+|[0-9]+(?:\s*[-–—]\s*[0-9]+)+|[0-9]+\s*подход)",
    )
    .unwrap()
});

/// Parse one line. Never fails: an empty name or empty reps is the caller's
/// signal that the line was not understood.
pub fn parse_exercise_line(line: &str, config: &ParserConfig) -> ParsedExercise {
    let cleaned = strip_annotations(strip_list_marker(line.trim()));
    let (name, sets) = split_sets(&cleaned);

    let reps = sets.map(|s| parse_sets(s, config)).unwrap_or_default();
    let name = normalize_name(name);
    debug!(line, name = %name, ?reps, "parsed exercise line");

    ParsedExercise { name, reps }
}

/// Drop a leading list marker such as "1. " or "• "
pub fn strip_list_marker(line: &str) -> &str {
    match LIST_MARKER.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Remove the alternate-name suffix and any equipment weight
fn strip_annotations(line: &str) -> String {
    let without_alt = ALT_NAME_SUFFIX.replace(line, "");
    WEIGHT_ANNOTATION.replace_all(&without_alt, " ").into_owned()
}

/// Find where the name ends and the sets part begins
fn split_sets(line: &str) -> (&str, Option<&str>) {
    if let Some((name, sets)) = line.split_once('—') {
        return (name, Some(sets));
    }

    let is_hyphen = |c: char| c == '-' || c == '–';

    if line.contains(is_hyphen) {
        if let Some(dash) = HYPHEN_SETS.captures(line).and_then(|caps| caps.get(1)) {
            return (&line[..dash.start()], Some(&line[dash.end()..]));
        }
        // "Гакк-присед 20-16-14": the hyphens belong to the name and the list
        if let Some(found) = SETS_ANYWHERE.find(line) {
            return (&line[..found.start()], Some(&line[found.start()..]));
        }
        if let Some(idx) = line.rfind(is_hyphen) {
            let dash_len = line[idx..].chars().next().map_or(1, char::len_utf8);
            let rest = &line[idx + dash_len..];
            if rest.chars().any(|c| c.is_ascii_digit()) {
                return (&line[..idx], Some(rest));
            }
        }
        return (line, None);
    }

    match SETS_ANYWHERE.find(line) {
        Some(found) => (&line[..found.start()], Some(&line[found.start()..])),
        None => (line, None),
    }
}

fn normalize_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| {
            c.is_whitespace() || c.is_ascii_digit() || matches!(c, '-' | '–' | '—' | ':' | ',' | ';')
        })
        .to_string()
}
