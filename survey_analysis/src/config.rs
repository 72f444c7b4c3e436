// ********* Input data structures ***********

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::Snafu;

/// One submitted survey, as stored by the backend.
///
/// `answers` is either a JSON object mapping question keys to values, or a
/// string holding the JSON encoding of such an object.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResponse {
    #[serde(default)]
    pub id: JSValue,
    #[serde(default)]
    pub answers: Option<JSValue>,
}

impl SurveyResponse {
    pub fn new(id: impl Into<JSValue>, answers: JSValue) -> SurveyResponse {
        SurveyResponse {
            id: id.into(),
            answers: Some(answers),
        }
    }

    /// The identifier in textual form: strings are returned as-is, any other
    /// JSON value is rendered with its JSON encoding.
    pub fn id_string(&self) -> String {
        match &self.id {
            JSValue::String(s) => s.clone(),
            x => x.to_string(),
        }
    }
}

/// A decoded answer value.
///
/// Raw JSON is converted once into this form, and the classification then
/// dispatches on the variant.
#[derive(PartialEq, Debug, Clone)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Object(JSMap<String, JSValue>),
    Array(Vec<JSValue>),
    Null,
}

impl From<&JSValue> for AnswerValue {
    fn from(js: &JSValue) -> AnswerValue {
        match js {
            JSValue::Null => AnswerValue::Null,
            JSValue::Bool(b) => AnswerValue::Bool(*b),
            // Numbers that do not fit in a f64 are out of reach for any statistics.
            JSValue::Number(n) => n
                .as_f64()
                .map(AnswerValue::Number)
                .unwrap_or(AnswerValue::Null),
            JSValue::String(s) => AnswerValue::Text(s.clone()),
            JSValue::Array(l) => AnswerValue::Array(l.clone()),
            JSValue::Object(m) => AnswerValue::Object(m.clone()),
        }
    }
}

// ******** Output data structures *********

/// Counters describing one classification.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldCounts {
    #[serde(rename = "totalFields")]
    pub total_fields: usize,
    #[serde(rename = "numericCount")]
    pub numeric_count: usize,
    #[serde(rename = "textCount")]
    pub text_count: usize,
    #[serde(rename = "objectCount")]
    pub object_count: usize,
    #[serde(rename = "arrayCount")]
    pub array_count: usize,
}

/// The answers of one response, partitioned by kind.
///
/// `numeric` also holds the numeric children of objects, under the key
/// `{parent}_{child}`. These are not reflected in `metadata.numeric_count`.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifiedFields {
    pub numeric: BTreeMap<String, f64>,
    pub text: BTreeMap<String, String>,
    pub objects: BTreeMap<String, JSValue>,
    pub arrays: BTreeMap<String, JSValue>,
    pub metadata: FieldCounts,
}

/// Descriptive statistics for one numeric field.
///
/// All the optional values are `None` if and only if `count` is zero.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FieldStatistics {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub mode: Option<f64>,
    pub sum: f64,
}

/// Aggregated view of a group of responses.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupStatistics {
    #[serde(rename = "numericFields")]
    pub numeric_fields: BTreeMap<String, Vec<f64>>,
    #[serde(rename = "textFields")]
    pub text_fields: BTreeMap<String, Vec<String>>,
    #[serde(rename = "commonFields")]
    pub common_fields: Vec<String>,
    pub statistics: BTreeMap<String, FieldStatistics>,
    #[serde(rename = "totalResponses")]
    pub total_responses: usize,
}

/// How one field of the target compares to the group.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FieldComparison {
    #[serde(rename = "targetValue")]
    pub target_value: f64,
    #[serde(rename = "groupMean")]
    pub group_mean: f64,
    #[serde(rename = "groupMedian")]
    pub group_median: Option<f64>,
    pub difference: f64,
    /// `None` when the group mean is zero.
    #[serde(rename = "percentDifference")]
    pub percent_difference: Option<f64>,
    #[serde(rename = "isAboveAverage")]
    pub is_above_average: bool,
    #[serde(rename = "isBelowAverage")]
    pub is_below_average: bool,
    #[serde(rename = "isAverage")]
    pub is_average: bool,
}

/// An entry of the strengths or improvements rankings.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RankedField {
    pub field: String,
    pub label: String,
    #[serde(rename = "targetValue")]
    pub target_value: f64,
    #[serde(rename = "groupMean")]
    pub group_mean: f64,
    pub difference: f64,
    #[serde(rename = "percentDifference")]
    pub percent_difference: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub fields: BTreeMap<String, FieldComparison>,
    pub strengths: Vec<RankedField>,
    pub improvements: Vec<RankedField>,
}

/// Errors that prevent a response from being analyzed.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AnalysisError {
    #[snafu(display("Answers of response {id} are not valid JSON: {source}"))]
    MalformedAnswers {
        id: String,
        source: serde_json::Error,
    },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

// ********* Configuration **********

/// The thresholds used by the group statistics and the comparison.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalysisRules {
    /// A field is common when it appears in at least this share of the group.
    pub common_field_ratio: f64,
    /// Minimal absolute difference to the group mean for a strength or an improvement.
    pub notable_difference: f64,
    /// Below this absolute difference, the target counts as average.
    pub average_tolerance: f64,
}

impl AnalysisRules {
    pub const DEFAULT_RULES: AnalysisRules = AnalysisRules {
        common_field_ratio: 0.5,
        notable_difference: 0.5,
        average_tolerance: 0.1,
    };
}

impl Default for AnalysisRules {
    fn default() -> Self {
        AnalysisRules::DEFAULT_RULES
    }
}
