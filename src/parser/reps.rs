//! Rep pattern matcher
//!
//! Turns a "sets part" such as `20-16-14-12`, `4х10`, `3*10-12` or
//! `3 подхода по 12 раз` into one rep count per set. Grammars are tried in
//! declaration order; the first one that yields a non-empty list wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParserConfig;

/// Optional trailing "раз" / "повторений" / "reps"
const REPS_SUFFIX: &str = r"(?:\s*(?:раз[а]?|повтор\w*|reps?)\.?)?";

static DASH_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^[0-9]+(?:\s*[-–—]\s*[0-9]+)*{REPS_SUFFIX}$")).unwrap()
});

static COUNT_TIMES_REPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^([0-9]+)\s*[xх×*]\s*([0-9]+){REPS_SUFFIX}$")).unwrap()
});

static COUNT_TIMES_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^([0-9]+)\s*[xх×*]\s*([0-9]+)\s*[-–—]\s*([0-9]+){REPS_SUFFIX}$"
    ))
    .unwrap()
});

/// Trailing words such as "(медленно)" are allowed, further numbers are not
static APPROACHES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^([0-9]+)\s*подход\w*(?:\s*(?:по\s*)?([0-9]+)(?:\s*[-–—]\s*([0-9]+))?)?[^0-9]*$",
    )
    .unwrap()
});

static SEGMENT_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;/]").unwrap());

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// A sets-shaped substring anywhere in a line: `4x10`, `3*10-12`,
/// `20-16-14`, `3 подхода`
pub(crate) static SETS_ANYWHERE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[0-9]+\s*[xх×*]\s*[0-9]+(?:\s*[-–—]\s*[0-9]+)?|[0-9]+(?:\s*[-–—]\s*[0-9]+)+|[0-9]+\s*подход",
    )
    .unwrap()
});

/// One sub-grammar of the sets part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepGrammar {
    /// `20-16-14-12`, reps verbatim
    DashList,
    /// `4x10`, `4х10`, `4×10`, `4*10`
    CountTimesReps,
    /// `4x8-10`, always the lower bound
    CountTimesRange,
    /// `3 подхода по 10 раз`, `3 подхода по 10-12`, `3 подхода`
    Approaches,
    /// `4x10, 3x8`, `12; 10; 8`, `4x10 / 3x8`
    Mixed,
    /// Every integer below the weight threshold
    Fallback,
}

/// Dispatch order for a whole sets part
pub const GRAMMARS: &[RepGrammar] = &[
    RepGrammar::DashList,
    RepGrammar::CountTimesReps,
    RepGrammar::CountTimesRange,
    RepGrammar::Approaches,
    RepGrammar::Mixed,
    RepGrammar::Fallback,
];

/// Grammars allowed inside one comma-separated segment
const SEGMENT_GRAMMARS: &[RepGrammar] = &[
    RepGrammar::DashList,
    RepGrammar::CountTimesReps,
    RepGrammar::CountTimesRange,
    RepGrammar::Approaches,
];

/// Grammars that make a line look like it already carries its sets
const EXPLICIT_GRAMMARS: &[RepGrammar] = &[
    RepGrammar::DashList,
    RepGrammar::CountTimesReps,
    RepGrammar::CountTimesRange,
];

impl RepGrammar {
    /// Try this grammar on a trimmed fragment
    pub fn extract(self, fragment: &str, config: &ParserConfig) -> Option<Vec<u32>> {
        match self {
            RepGrammar::DashList => {
                if !DASH_LIST.is_match(fragment) {
                    return None;
                }
                let numbers = INTEGER.find_iter(fragment);
                numbers.map(|m| positive(m.as_str())).collect()
            }
            RepGrammar::CountTimesReps => {
                let caps = COUNT_TIMES_REPS.captures(fragment)?;
                let count = set_count(&caps[1], config)?;
                let reps = positive(&caps[2])?;
                Some(vec![reps; count])
            }
            RepGrammar::CountTimesRange => {
                let caps = COUNT_TIMES_RANGE.captures(fragment)?;
                let count = set_count(&caps[1], config)?;
                let low = positive(&caps[2])?;
                let high = positive(&caps[3])?;
                Some(vec![low.min(high); count])
            }
            RepGrammar::Approaches => {
                let caps = APPROACHES.captures(fragment)?;
                let count = set_count(&caps[1], config)?;
                let reps = match (caps.get(2), caps.get(3)) {
                    (Some(low), Some(high)) => {
                        positive(low.as_str())?.min(positive(high.as_str())?)
                    }
                    (Some(m), None) => positive(m.as_str())?,
                    _ => config.default_reps,
                };
                Some(vec![reps; count])
            }
            RepGrammar::Mixed => {
                if !SEGMENT_SPLIT.is_match(fragment) {
                    return None;
                }
                let mut reps = Vec::new();
                for segment in SEGMENT_SPLIT.split(fragment) {
                    let segment = segment.trim();
                    if segment.is_empty() {
                        continue;
                    }
                    let part = SEGMENT_GRAMMARS
                        .iter()
                        .find_map(|g| g.extract(segment, config))?;
                    reps.extend(part);
                }
                Some(reps)
            }
            RepGrammar::Fallback => Some(
                INTEGER
                    .find_iter(fragment)
                    .filter_map(|m| positive(m.as_str()))
                    .filter(|n| *n < config.weight_threshold)
                    .collect(),
            ),
        }
    }
}

fn positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

fn set_count(digits: &str, config: &ParserConfig) -> Option<usize> {
    positive(digits)
        .filter(|n| *n <= config.max_sets)
        .map(|n| n as usize)
}

/// Which grammar recognised the fragment, and what it produced
pub fn match_sets(fragment: &str, config: &ParserConfig) -> Option<(RepGrammar, Vec<u32>)> {
    let fragment = fragment.trim();
    GRAMMARS.iter().find_map(|grammar| {
        grammar
            .extract(fragment, config)
            .filter(|reps| !reps.is_empty())
            .map(|reps| (*grammar, reps))
    })
}

/// Reps per set, in order. Empty means the fragment was not understood.
pub fn parse_sets(fragment: &str, config: &ParserConfig) -> Vec<u32> {
    match_sets(fragment, config)
        .map(|(_, reps)| reps)
        .unwrap_or_default()
}

/// True when the fragment is a rep list or `C x R` (with or without a range)
pub fn is_explicit_sets(fragment: &str, config: &ParserConfig) -> bool {
    let fragment = fragment.trim();
    EXPLICIT_GRAMMARS
        .iter()
        .any(|g| g.extract(fragment, config).is_some_and(|r| !r.is_empty()))
}
