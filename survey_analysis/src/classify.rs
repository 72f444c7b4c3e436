use log::debug;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::ResultExt;

use crate::config::*;
use crate::numeric::numeric_value;

/// Partitions the answers of a response into numeric, text, object and array fields.
///
/// A response without answers yields an empty classification. Answers stored
/// as a JSON string are decoded first; a string that is not valid JSON is
/// reported as [`AnalysisError::MalformedAnswers`].
///
/// ```
/// use serde_json::json;
/// use survey_analysis::{classify, SurveyResponse};
///
/// let response = SurveyResponse::new("r1", json!({"a": {"x": 5, "y": "hello"}, "b": "3-5"}));
/// let fields = classify(&response)?;
/// assert_eq!(fields.numeric.get("a_x"), Some(&5.0));
/// assert_eq!(fields.numeric.get("b"), Some(&4.0));
/// assert_eq!(fields.metadata.object_count, 1);
/// # Ok::<(), survey_analysis::AnalysisError>(())
/// ```
pub fn classify(response: &SurveyResponse) -> AnalysisResult<ClassifiedFields> {
    let mut res = ClassifiedFields::default();
    let answers = match decode_answers(response)? {
        Some(x) => x,
        None => return Ok(res),
    };

    for (key, raw) in answers.iter() {
        res.metadata.total_fields += 1;
        let value = AnswerValue::from(raw);
        match value {
            AnswerValue::Null => {}
            AnswerValue::Text(ref s) if s.is_empty() => {}
            AnswerValue::Object(ref children) => {
                for (child_key, child) in children.iter() {
                    // Only the numeric children are kept, and they do not count as numeric fields.
                    if let Some(x) = numeric_value(&AnswerValue::from(child)) {
                        res.numeric.insert(format!("{}_{}", key, child_key), x);
                    }
                }
                res.objects.insert(key.clone(), raw.clone());
                res.metadata.object_count += 1;
            }
            AnswerValue::Array(_) => {
                res.arrays.insert(key.clone(), raw.clone());
                res.metadata.array_count += 1;
            }
            _ => {
                if let Some(x) = numeric_value(&value) {
                    res.numeric.insert(key.clone(), x);
                    res.metadata.numeric_count += 1;
                } else {
                    res.text.insert(key.clone(), text_of(&value));
                    res.metadata.text_count += 1;
                }
            }
        }
    }
    debug!(
        "classify: response {}: {:?}",
        response.id_string(),
        res.metadata
    );
    Ok(res)
}

// The answers as an ordered list of key/value pairs.
fn decode_answers(response: &SurveyResponse) -> AnalysisResult<Option<JSMap<String, JSValue>>> {
    let decoded: JSValue = match &response.answers {
        None | Some(JSValue::Null) => return Ok(None),
        Some(JSValue::String(s)) => {
            serde_json::from_str(s).context(MalformedAnswersSnafu {
                id: response.id_string(),
            })?
        }
        Some(x) => x.clone(),
    };
    let entries = match decoded {
        JSValue::Object(m) => m,
        // Lists are answered by position.
        JSValue::Array(l) => l
            .into_iter()
            .enumerate()
            .map(|(idx, v)| (idx.to_string(), v))
            .collect(),
        JSValue::Null => return Ok(None),
        x => {
            debug!(
                "classify: response {}: answers are a scalar, ignored: {:?}",
                response.id_string(),
                x
            );
            JSMap::new()
        }
    };
    Ok(Some(entries))
}

fn text_of(value: &AnswerValue) -> String {
    match value {
        AnswerValue::Text(s) => s.clone(),
        AnswerValue::Bool(b) => b.to_string(),
        AnswerValue::Number(x) => x.to_string(),
        _ => String::new(),
    }
}
