//! Recognition of numbers hidden in free-form answers.
//!
//! Survey answers often carry numbers as text: `"42"`, an age bracket such as
//! `"41-50"`, or a quantity with a unit such as `"120000 students"`. This
//! module decides which scalar answers are numeric and extracts their value.

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::AnswerValue;

static RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s*-\s*(\d+)$").unwrap());
static LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)").unwrap());
static ANY_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());

type Strategy = fn(&str) -> Option<f64>;

/// The conversions, by order of precedence.
const STRATEGIES: [(&str, Strategy); 4] = [
    ("exact", exact_number),
    ("range", range_midpoint),
    ("leading", leading_digits),
    ("embedded", embedded_digits),
];

/// Returns true if the answer should be treated as a number.
///
/// Only scalars qualify: numbers, and strings that either parse as a float,
/// look like a range (`"10-20"`) or start with digits (`"5 years"`).
pub fn is_numeric_classifiable(value: &AnswerValue) -> bool {
    match value {
        AnswerValue::Number(x) => x.is_finite(),
        AnswerValue::Text(s) => {
            parses_as_float(s) || RANGE.is_match(s) || LEADING_DIGITS.is_match(s)
        }
        _ => false,
    }
}

/// Extracts a number from a string answer.
///
/// ```
/// use survey_analysis::convert_to_numeric;
///
/// assert_eq!(convert_to_numeric("42"), Some(42.0));
/// assert_eq!(convert_to_numeric("10-20"), Some(15.0));
/// assert_eq!(convert_to_numeric("120000 students"), Some(120000.0));
/// assert_eq!(convert_to_numeric("More than 15"), Some(15.0));
/// assert_eq!(convert_to_numeric("none"), None);
/// ```
pub fn convert_to_numeric(s: &str) -> Option<f64> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let res = strategy(s).filter(|x| x.is_finite());
        if let Some(x) = res {
            trace!("convert_to_numeric: {:?} -> {} ({})", s, x, name);
        }
        res
    })
}

/// The numeric value of a scalar answer, if it has one.
pub(crate) fn numeric_value(value: &AnswerValue) -> Option<f64> {
    if !is_numeric_classifiable(value) {
        return None;
    }
    match value {
        AnswerValue::Number(x) => Some(*x),
        AnswerValue::Text(s) => convert_to_numeric(s),
        _ => None,
    }
}

fn parses_as_float(s: &str) -> bool {
    matches!(s.trim().parse::<f64>(), Ok(x) if x.is_finite())
}

// The string must be the canonical rendering of the number: "42" is accepted,
// "042" or "1e3" are left to the other strategies.
fn exact_number(s: &str) -> Option<f64> {
    let x = s.parse::<f64>().ok()?;
    if x.to_string() == s {
        Some(x)
    } else {
        None
    }
}

fn range_midpoint(s: &str) -> Option<f64> {
    let caps = RANGE.captures(s)?;
    let low = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let high = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some((low + high) / 2.0)
}

fn leading_digits(s: &str) -> Option<f64> {
    first_capture(&LEADING_DIGITS, s)
}

fn embedded_digits(s: &str) -> Option<f64> {
    first_capture(&ANY_DIGITS, s)
}

fn first_capture(re: &Regex, s: &str) -> Option<f64> {
    re.captures(s)?.get(1)?.as_str().parse::<f64>().ok()
}
