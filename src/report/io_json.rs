// Responses exported as a JSON list.

use crate::report::*;

pub fn read_json_responses(path: String) -> BReportResult<Vec<SurveyResponse>> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let responses: Vec<SurveyResponse> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    for r in responses.iter() {
        debug!("read_json_responses: {:?}", r);
    }
    Ok(responses)
}
