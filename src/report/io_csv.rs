// Responses exported as a table: question keys in the first row, one response per row.

use std::fs::File;

use serde_json::Map as JSMap;

use crate::report::{config_reader::ResponseSource, io_common::make_default_id, *};

pub fn read_csv_responses(
    path: String,
    source: &ResponseSource,
) -> BReportResult<Vec<SurveyResponse>> {
    let default_id = make_default_id(&path);

    let id_idx_o = source.id_column_index()?;
    let answers_start_col = source.first_answer_column_index()?;

    let (mut rdr, header) = get_reader(&path)?;
    debug!("read_csv_responses: header: {:?}", header);

    let mut res: Vec<SurveyResponse> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {})?;
        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .to_string()
        } else {
            default_id(lineno)
        };

        let mut answers: JSMap<String, JSValue> = JSMap::new();
        for (col, key) in header.iter().enumerate().skip(answers_start_col) {
            if Some(col) == id_idx_o {
                continue;
            }
            let cell = line.get(col).context(CsvLineTooShortSnafu { lineno })?;
            answers.insert(key.to_string(), JSValue::String(cell.to_string()));
        }
        debug!(
            "read_csv_responses: lineno: {:?} id: {:?} answers: {:?}",
            lineno, id, answers
        );

        res.push(SurveyResponse::new(id, JSValue::Object(answers)));
    }
    Ok(res)
}

fn get_reader(path: &String) -> ReportResult<(csv::Reader<File>, csv::StringRecord)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path: path.clone() })?;
    let header = rdr.headers().context(CsvLineParseSnafu {})?.clone();
    Ok((rdr, header))
}
