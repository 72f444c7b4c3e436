use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_analysis::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;

mod config_reader;
mod io_common;
mod io_csv;
mod io_json;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file {path}: {source}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line: {source}"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("CSV line {lineno} has fewer columns than expected"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Column indices start at 1, got {value}"))]
    InvalidColumnIndex { value: String },
    #[snafu(display("Provider not implemented: {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("No response source: use --input or add responseSources to the configuration"))]
    MissingSources {},
    #[snafu(display("No target response: use --target or add target.responseId to the configuration"))]
    MissingTarget {},
    #[snafu(display("Response {id} not found in the inputs"))]
    UnknownTarget { id: String },
    #[snafu(display("Target response cannot be analyzed: {source}"))]
    InvalidTarget { source: AnalysisError },
    #[snafu(display("Error writing summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type ReportResult<T> = Result<T, ReportError>;
type BReportResult<T> = Result<T, Box<ReportError>>;

fn read_responses(
    root_path: Option<&Path>,
    source: &ResponseSource,
) -> BReportResult<Vec<SurveyResponse>> {
    let p: PathBuf = match root_path {
        Some(root) => root.join(&source.file_path),
        None => PathBuf::from(&source.file_path),
    };
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read response file {:?}", p2);
    let responses = match source.provider.as_str() {
        "json" => io_json::read_json_responses(p2),
        "csv" => io_csv::read_csv_responses(p2, source),
        x => {
            return Err(Box::new(ReportError::UnknownProvider {
                provider: x.to_string(),
            }))
        }
    }?;
    info!("Read {} responses", responses.len());
    Ok(responses)
}

fn validate_rules(rules: &Option<RulesSettings>) -> ReportResult<AnalysisRules> {
    let defaults = AnalysisRules::DEFAULT_RULES;
    let settings = match rules {
        Some(x) => x,
        None => return Ok(defaults),
    };
    let res = AnalysisRules {
        common_field_ratio: match settings.common_field_ratio {
            None => defaults.common_field_ratio,
            Some(x) if x > 0.0 && x <= 1.0 => x,
            Some(x) => whatever!("commonFieldRatio must be in (0, 1], got {}", x),
        },
        notable_difference: match settings.notable_difference {
            None => defaults.notable_difference,
            Some(x) if x.is_finite() && x >= 0.0 => x,
            Some(x) => whatever!("notableDifference must be a positive number, got {}", x),
        },
        average_tolerance: match settings.average_tolerance {
            None => defaults.average_tolerance,
            Some(x) if x.is_finite() && x >= 0.0 => x,
            Some(x) => whatever!("averageTolerance must be a positive number, got {}", x),
        },
    };
    Ok(res)
}

fn build_summary_js(
    settings: &OutputSettings,
    target_id: &str,
    target: &ClassifiedFields,
    group: &GroupStatistics,
    comparison: &ComparisonResult,
    skipped: usize,
) -> JSValue {
    let c = OutputConfig {
        survey: settings.survey_name.clone(),
        date: settings.survey_date.clone(),
        target: target_id.to_string(),
        group_size: group.total_responses,
        skipped_responses: skipped,
    };
    json!({
        "config": c,
        "target": {
            "metadata": target.metadata,
            "numeric": target.numeric,
        },
        "group": {
            "commonFields": group.common_fields,
            "statistics": group.statistics,
            "totalResponses": group.total_responses,
        },
        "comparison": comparison,
    })
}

fn write_summary(pretty_js: &str, out: Option<PathBuf>) -> BReportResult<()> {
    match out {
        Some(p) => {
            let path = p.display().to_string();
            info!("Writing summary to {}", path);
            fs::write(&p, pretty_js).context(WritingOutputSnafu { path })?;
        }
        None => println!("{}", pretty_js),
    }
    Ok(())
}

fn check_reference(pretty_js_stats: &str, reference_path: String) -> BReportResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return Err(Box::new(ReportError::ReferenceMismatch {}));
    }
    info!("Summary matches the reference");
    Ok(())
}

/// Runs one analysis, as described by the command line arguments.
pub fn run_analysis(args: &Args) -> BReportResult<()> {
    let (mut config, mut root_p): (AnalysisConfig, Option<PathBuf>) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path.clone())?;
            let root = Path::new(config_path.as_str())
                .parent()
                .map(|p| p.to_path_buf());
            (config, root)
        }
        None => (AnalysisConfig::default(), None),
    };
    debug!("config: {:?}", config);

    // Responses given on the command line are relative to the working directory.
    if let Some(input) = &args.input {
        config.response_sources = vec![ResponseSource::new(
            args.input_type.clone().unwrap_or_else(|| "json".to_string()),
            input.clone(),
        )];
        root_p = None;
    }

    let rules = validate_rules(&config.rules)?;
    info!("rules: {:?}", rules);

    if config.response_sources.is_empty() {
        return Err(Box::new(ReportError::MissingSources {}));
    }

    let mut responses: Vec<SurveyResponse> = Vec::new();
    for source in config.response_sources.iter() {
        let mut file_responses = read_responses(root_p.as_deref(), source)?;
        responses.append(&mut file_responses);
    }

    let target_settings = config.target.clone().unwrap_or_default();
    let target_id: String = args
        .target
        .clone()
        .or(target_settings.response_id)
        .context(MissingTargetSnafu {})?;
    let include_target = args.include_target || target_settings.include_in_group.unwrap_or(false);

    let target = responses
        .iter()
        .find(|r| r.id_string() == target_id)
        .context(UnknownTargetSnafu {
            id: target_id.clone(),
        })?;
    let target_fields = classify(target).context(InvalidTargetSnafu {})?;

    let mut aggregator = Aggregator::new(&rules);
    let mut skipped: usize = 0;
    for r in responses.iter() {
        let id = r.id_string();
        if !include_target && id == target_id {
            continue;
        }
        if let Err(e) = aggregator.add_response(r) {
            warn!("Skipping response {}: {}", id, e);
            skipped += 1;
        }
    }
    let group = aggregator.finish();
    let comparison = compare_classified(&target_fields, &group, &rules);
    for s in comparison.strengths.iter() {
        info!("Strength: {} ({:+})", s.label, s.difference);
    }
    for s in comparison.improvements.iter() {
        info!("Improvement: {} ({:+})", s.label, s.difference);
    }

    let result_js = build_summary_js(
        &config.output_settings,
        &target_id,
        &target_fields,
        &group,
        &comparison,
        skipped,
    );
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out: Option<PathBuf> = match &args.out {
        Some(s) if s != "stdout" => Some(PathBuf::from(s)),
        _ => None,
    };
    write_summary(&pretty_js_stats, out)?;

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        check_reference(&pretty_js_stats, reference_path.clone())?;
    }

    Ok(())
}
