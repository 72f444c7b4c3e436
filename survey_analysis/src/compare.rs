use log::{debug, info};

use crate::classify::classify;
use crate::config::*;
use crate::labels::label_for;
use crate::stats::{aggregate_with_rules, round_decimals};

/// Compares a response against a group of responses, with the default rules.
///
/// ```
/// use serde_json::json;
/// use survey_analysis::{compare, SurveyResponse};
///
/// let target = SurveyResponse::new("t", json!({"q1": 8}));
/// let group: Vec<SurveyResponse> = [4, 6, 8]
///     .iter()
///     .map(|x| SurveyResponse::new(*x, json!({ "q1": x })))
///     .collect();
/// let res = compare(&target, &group)?;
/// assert_eq!(res.fields["q1"].group_mean, 6.0);
/// assert_eq!(res.fields["q1"].difference, 2.0);
/// assert_eq!(res.strengths[0].field, "q1");
/// # Ok::<(), survey_analysis::AnalysisError>(())
/// ```
pub fn compare(
    target: &SurveyResponse,
    group: &[SurveyResponse],
) -> AnalysisResult<ComparisonResult> {
    compare_with_rules(target, group, &AnalysisRules::DEFAULT_RULES)
}

pub fn compare_with_rules(
    target: &SurveyResponse,
    group: &[SurveyResponse],
    rules: &AnalysisRules,
) -> AnalysisResult<ComparisonResult> {
    let target_fields = classify(target)?;
    let group_stats = aggregate_with_rules(group, rules)?;
    Ok(compare_classified(&target_fields, &group_stats, rules))
}

/// Compares a response against statistics that have already been aggregated.
pub fn compare_with_statistics(
    target: &SurveyResponse,
    group: &GroupStatistics,
    rules: &AnalysisRules,
) -> AnalysisResult<ComparisonResult> {
    let target_fields = classify(target)?;
    Ok(compare_classified(&target_fields, group, rules))
}

/// Joins the numeric fields of the target with the statistics of the group.
///
/// Fields that the group never answered are left out.
pub fn compare_classified(
    target: &ClassifiedFields,
    group: &GroupStatistics,
    rules: &AnalysisRules,
) -> ComparisonResult {
    let mut res = ComparisonResult::default();

    for (key, target_value) in target.numeric.iter() {
        let stats = match group.statistics.get(key) {
            Some(x) => x,
            None => {
                debug!("compare: field {} is not in the group, skipping", key);
                continue;
            }
        };
        let group_mean = match stats.mean {
            Some(x) => x,
            None => continue,
        };
        let cmp = compare_field(*target_value, group_mean, stats.median, rules);
        debug!("compare: field {}: {:?}", key, cmp);

        let notable = cmp.difference.abs() > rules.notable_difference;
        if notable && (cmp.is_above_average || cmp.is_below_average) {
            let entry = RankedField {
                field: key.clone(),
                label: label_for(key),
                target_value: cmp.target_value,
                group_mean: cmp.group_mean,
                difference: cmp.difference,
                percent_difference: cmp.percent_difference,
            };
            if cmp.is_above_average {
                res.strengths.push(entry);
            } else {
                res.improvements.push(entry);
            }
        }
        res.fields.insert(key.clone(), cmp);
    }

    res.strengths.sort_by(|a, b| b.difference.total_cmp(&a.difference));
    res.improvements
        .sort_by(|a, b| b.difference.abs().total_cmp(&a.difference.abs()));

    info!(
        "Compared {} fields: {} strengths, {} improvements",
        res.fields.len(),
        res.strengths.len(),
        res.improvements.len()
    );
    res
}

// The three flags are computed independently of each other.
fn compare_field(
    target_value: f64,
    group_mean: f64,
    group_median: Option<f64>,
    rules: &AnalysisRules,
) -> FieldComparison {
    let difference = target_value - group_mean;
    let percent_difference = if group_mean == 0.0 {
        None
    } else {
        Some(round_decimals((difference / group_mean) * 100.0, 1)).filter(|x| x.is_finite())
    };
    FieldComparison {
        target_value,
        group_mean,
        group_median,
        difference,
        percent_difference,
        is_above_average: target_value > group_mean,
        is_below_average: target_value < group_mean,
        is_average: difference.abs() < rules.average_tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group_of(values: &[serde_json::Value]) -> Vec<SurveyResponse> {
        values
            .iter()
            .enumerate()
            .map(|(idx, a)| SurveyResponse::new(idx as u64, a.clone()))
            .collect()
    }

    #[test]
    fn target_above_group() {
        let target = SurveyResponse::new("t", json!({"q1": 8}));
        let group = group_of(&[json!({"q1": 4}), json!({"q1": 6}), json!({"q1": 8})]);
        let res = compare(&target, &group).unwrap();
        let q1 = &res.fields["q1"];
        assert_eq!(q1.group_mean, 6.0);
        assert_eq!(q1.group_median, Some(6.0));
        assert_eq!(q1.difference, 2.0);
        assert_eq!(q1.percent_difference, Some(33.3));
        assert!(q1.is_above_average);
        assert!(!q1.is_below_average);
        assert!(!q1.is_average);
        assert_eq!(res.strengths.len(), 1);
        assert_eq!(res.strengths[0].field, "q1");
        assert_eq!(res.strengths[0].label, "Q1");
        assert!(res.improvements.is_empty());
    }

    #[test]
    fn small_differences_are_not_ranked() {
        let target = SurveyResponse::new("t", json!({"a": 5.4, "b": 5.05}));
        let group = group_of(&[json!({"a": 5, "b": 5})]);
        let res = compare(&target, &group).unwrap();
        assert!(res.strengths.is_empty());
        assert!(res.fields["a"].is_above_average);
        assert!(!res.fields["a"].is_average);
        // Above the mean and average at the same time.
        assert!(res.fields["b"].is_above_average);
        assert!(res.fields["b"].is_average);
    }

    #[test]
    fn rankings_are_sorted() {
        let target = SurveyResponse::new("t", json!({"a": 10, "b": 20, "c": 1, "d": 0, "e": 5}));
        let group = group_of(&[json!({"a": 5, "b": 5, "c": 5, "d": 9, "e": 5})]);
        let res = compare(&target, &group).unwrap();
        let strengths: Vec<&str> = res.strengths.iter().map(|r| r.field.as_str()).collect();
        let improvements: Vec<&str> = res.improvements.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(strengths, vec!["b", "a"]);
        assert_eq!(improvements, vec!["d", "c"]);
        assert!(res.fields["e"].is_average);
        assert_eq!(res.improvements[0].difference, -9.0);
        assert_eq!(res.improvements[0].percent_difference, Some(-100.0));
    }

    #[test]
    fn fields_missing_from_group_are_skipped() {
        let target = SurveyResponse::new("t", json!({"q1": 3, "extra": 7}));
        let group = group_of(&[json!({"q1": 3})]);
        let res = compare(&target, &group).unwrap();
        assert!(res.fields.contains_key("q1"));
        assert!(!res.fields.contains_key("extra"));
    }

    #[test]
    fn zero_mean_has_no_percent_difference() {
        let target = SurveyResponse::new("t", json!({"q1": 2}));
        let group = group_of(&[json!({"q1": 0}), json!({"q1": "0"})]);
        let res = compare(&target, &group).unwrap();
        let q1 = &res.fields["q1"];
        assert_eq!(q1.group_mean, 0.0);
        assert_eq!(q1.difference, 2.0);
        assert_eq!(q1.percent_difference, None);
        assert_eq!(res.strengths[0].percent_difference, None);
    }

    #[test]
    fn nested_fields_are_compared() {
        let target = SurveyResponse::new("t", json!({"school": {"size": "400 students"}}));
        let group = group_of(&[json!({"school": {"size": 200}})]);
        let res = compare(&target, &group).unwrap();
        assert_eq!(res.fields["school_size"].difference, 200.0);
        assert_eq!(res.strengths[0].label, "School Size");
    }

    #[test]
    fn malformed_target_fails() {
        let target = SurveyResponse::new("t", json!("{"));
        assert!(compare(&target, &group_of(&[json!({"q1": 1})])).is_err());
    }

    #[test]
    fn precomputed_statistics() {
        let target = SurveyResponse::new("t", json!({"q1": 1}));
        let group = group_of(&[json!({"q1": 4}), json!({"q1": 6})]);
        let stats = aggregate_with_rules(&group, &AnalysisRules::DEFAULT_RULES).unwrap();
        let res =
            compare_with_statistics(&target, &stats, &AnalysisRules::DEFAULT_RULES).unwrap();
        assert_eq!(res, compare(&target, &group).unwrap());
        assert_eq!(res.improvements[0].field, "q1");
        assert_eq!(res.improvements[0].percent_difference, Some(-80.0));
    }
}
