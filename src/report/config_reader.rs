use crate::report::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName", default)]
    pub survey_name: String,
    #[serde(rename = "surveyDate")]
    pub survey_date: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub survey: String,
    pub date: Option<String>,
    pub target: String,
    #[serde(rename = "groupSize")]
    pub group_size: usize,
    #[serde(rename = "skippedResponses")]
    pub skipped_responses: usize,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "idColumnIndex")]
    _id_column_index: Option<JSValue>,
    #[serde(rename = "firstAnswerColumnIndex")]
    _first_answer_column_index: Option<JSValue>,
}

impl ResponseSource {
    pub fn new(provider: String, file_path: String) -> ResponseSource {
        ResponseSource {
            provider,
            file_path,
            _id_column_index: None,
            _first_answer_column_index: None,
        }
    }

    /// The column of the response ids, starting at 0.
    pub fn id_column_index(&self) -> ReportResult<Option<usize>> {
        let x = read_js_int(&self._id_column_index)?;
        Ok(x.map(|i| i - 1))
    }

    /// The first column holding answers, starting at 0.
    pub fn first_answer_column_index(&self) -> ReportResult<usize> {
        let x = read_js_int(&self._first_answer_column_index)?;
        Ok(x.map(|i| i - 1).unwrap_or(0))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSettings {
    #[serde(rename = "responseId")]
    pub response_id: Option<String>,
    #[serde(rename = "includeInGroup")]
    pub include_in_group: Option<bool>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSettings {
    #[serde(rename = "commonFieldRatio")]
    pub common_field_ratio: Option<f64>,
    #[serde(rename = "notableDifference")]
    pub notable_difference: Option<f64>,
    #[serde(rename = "averageTolerance")]
    pub average_tolerance: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "responseSources", default)]
    pub response_sources: Vec<ResponseSource>,
    pub target: Option<TargetSettings>,
    pub rules: Option<RulesSettings>,
}

pub fn read_config(path: String) -> BReportResult<AnalysisConfig> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let config: AnalysisConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: String) -> BReportResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// Indices are 1-based, as in spreadsheets. They may be written as numbers or strings.
fn read_js_int(x: &Option<JSValue>) -> ReportResult<Option<usize>> {
    let res = match x {
        None | Some(JSValue::Null) => None,
        Some(JSValue::Number(n)) => n.as_u64().map(|i| i as usize),
        Some(JSValue::String(s)) => s.parse::<usize>().ok(),
        Some(_) => None,
    };
    match res {
        Some(i) if i >= 1 => Ok(Some(i)),
        None if matches!(x, None | Some(JSValue::Null)) => Ok(None),
        _ => InvalidColumnIndexSnafu {
            value: x.clone().unwrap_or(JSValue::Null).to_string(),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(js: JSValue) -> ResponseSource {
        serde_json::from_value(js).unwrap()
    }

    #[test]
    fn column_indices() {
        let s = source(json!({"provider": "csv", "filePath": "a.csv",
            "idColumnIndex": 1, "firstAnswerColumnIndex": "3"}));
        assert_eq!(s.id_column_index().unwrap(), Some(0));
        assert_eq!(s.first_answer_column_index().unwrap(), 2);
    }

    #[test]
    fn default_column_indices() {
        let s = ResponseSource::new("csv".to_string(), "a.csv".to_string());
        assert_eq!(s.id_column_index().unwrap(), None);
        assert_eq!(s.first_answer_column_index().unwrap(), 0);
    }

    #[test]
    fn invalid_column_indices() {
        let s = source(json!({"provider": "csv", "filePath": "a.csv", "idColumnIndex": 0}));
        assert!(s.id_column_index().is_err());
        let s2 = source(json!({"provider": "csv", "filePath": "a.csv",
            "firstAnswerColumnIndex": "first"}));
        assert!(s2.first_answer_column_index().is_err());
    }

    #[test]
    fn invalid_column_index_message() {
        let s = source(json!({"provider": "csv", "filePath": "a.csv", "idColumnIndex": 0}));
        let err = s.id_column_index().unwrap_err();
        assert_eq!(err.to_string(), "Column indices start at 1, got 0");
        let s2 = source(json!({"provider": "csv", "filePath": "a.csv",
            "firstAnswerColumnIndex": "first"}));
        let err2 = s2.first_answer_column_index().unwrap_err();
        assert_eq!(err2.to_string(), "Column indices start at 1, got \"first\"");
    }

    #[test]
    fn minimal_config() {
        let config: AnalysisConfig = serde_json::from_value(json!({
            "responseSources": [{"provider": "json", "filePath": "r.json"}]
        }))
        .unwrap();
        assert_eq!(config.output_settings, OutputSettings::default());
        assert_eq!(config.response_sources.len(), 1);
        assert!(config.target.is_none());
        assert!(config.rules.is_none());
    }
}
