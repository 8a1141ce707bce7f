//! Day header classifier

use once_cell::sync::Lazy;
use regex::Regex;

use super::reps::SETS_ANYWHERE;

/// Full names first so that "среда" never falls through to "ср"
const WEEKDAYS: &[(&str, &str)] = &[
    ("понедельник", "Понедельник"),
    ("вторник", "Вторник"),
    ("среда", "Среда"),
    ("четверг", "Четверг"),
    ("пятница", "Пятница"),
    ("суббота", "Суббота"),
    ("воскресенье", "Воскресенье"),
    ("пн", "Понедельник"),
    ("вт", "Вторник"),
    ("ср", "Среда"),
    ("чт", "Четверг"),
    ("пт", "Пятница"),
    ("сб", "Суббота"),
    ("вс", "Воскресенье"),
];

/// Nominative muscle groups that may stand alone as a header
const MUSCLE_GROUPS: &[&str] = &[
    "ноги", "спина", "грудь", "руки", "плечи", "бицепс", "трицепс", "пресс", "кардио",
];

/// Bare muscle headers are short
const MAX_BARE_HEADER_CHARS: usize = 50;

static DAY_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^день\s*([0-9]+)\s*[:.)/\-–—]?\s*(.*)$").unwrap());

/// Genitive stem, so "День ноги" still reads as "День ног"
static DAY_MUSCLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^день\s+(ног|спины|груди|рук|плеч|бицепса|трицепса|пресса|кардио)")
        .unwrap()
});

static DASH_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[—–-]\s*[0-9]").unwrap());

/// Display name of the day if `line` is a day header
pub fn classify_day_header(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let lower = line.to_lowercase();

    if let Some(canonical) = weekday(&lower) {
        return Some(with_trailing_title(canonical, line));
    }

    if let Some(caps) = DAY_NUMBER.captures(line) {
        let title = caps[2].trim();
        return Some(if title.is_empty() {
            format!("День {}", &caps[1])
        } else {
            title.to_string()
        });
    }

    if let Some(caps) = DAY_MUSCLE.captures(line) {
        return Some(with_trailing_title(&format!("День {}", &caps[1]), line));
    }

    let is_bare_muscle = MUSCLE_GROUPS.iter().any(|m| starts_with_word(&lower, m))
        && line.chars().count() < MAX_BARE_HEADER_CHARS
        && !DASH_DIGIT.is_match(line)
        && !SETS_ANYWHERE.is_match(line);
    if is_bare_muscle {
        let title = line.split_once(':').map(|(_, rest)| rest.trim());
        return Some(match title {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => line.to_string(),
        });
    }

    None
}

fn weekday(lower: &str) -> Option<&'static str> {
    WEEKDAYS
        .iter()
        .find(|(key, _)| starts_with_word(lower, key))
        .map(|(_, canonical)| *canonical)
}

/// `word` at the start, not followed by another letter
fn starts_with_word(lower: &str, word: &str) -> bool {
    lower
        .strip_prefix(word)
        .is_some_and(|rest| !rest.starts_with(char::is_alphabetic))
}

/// "Понедельник: Грудь" / "Пятница/ноги" keep their title after the prefix
fn with_trailing_title(prefix: &str, line: &str) -> String {
    let title = line
        .split_once(':')
        .or_else(|| line.split_once('/'))
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty());

    match title {
        Some(title) => format!("{}: {}", prefix, title),
        None => prefix.to_string(),
    }
}
