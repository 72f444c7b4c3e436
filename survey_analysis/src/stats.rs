use log::{debug, info};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::classify::classify;
use crate::config::*;

/// Rounds to the given number of decimal places, halves away from zero.
pub(crate) fn round_decimals(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

impl FieldStatistics {
    pub const EMPTY: FieldStatistics = FieldStatistics {
        count: 0,
        min: None,
        max: None,
        mean: None,
        median: None,
        mode: None,
        sum: 0.0,
    };

    /// Computes the statistics of a list of values.
    ///
    /// The mean and the median are rounded to 2 decimals. The mode is the
    /// most frequent value; on ties, the value that first reached the
    /// highest frequency while scanning the values in order wins.
    ///
    /// ```
    /// use survey_analysis::FieldStatistics;
    ///
    /// let stats = FieldStatistics::compute(&[4.0, 1.0, 3.0, 2.0]);
    /// assert_eq!(stats.median, Some(2.5));
    /// assert_eq!(stats.min, Some(1.0));
    /// assert_eq!(stats.mode, Some(4.0));
    /// ```
    pub fn compute(values: &[f64]) -> FieldStatistics {
        if values.is_empty() {
            return FieldStatistics::EMPTY;
        }
        let count = values.len();
        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        FieldStatistics {
            count,
            min: sorted.first().cloned(),
            max: sorted.last().cloned(),
            mean: Some(round_decimals(mean, 2)),
            median: Some(round_decimals(median, 2)),
            mode: mode(values),
            sum,
        }
    }
}

fn mode(values: &[f64]) -> Option<f64> {
    // Keyed by bit pattern; 0.0 and -0.0 are the same answer.
    let mut frequencies: HashMap<u64, usize> = HashMap::new();
    let mut best: Option<(f64, usize)> = None;
    for &x in values {
        let key = if x == 0.0 { 0f64.to_bits() } else { x.to_bits() };
        let freq = frequencies.entry(key).or_insert(0);
        *freq += 1;
        match best {
            Some((_, max_freq)) if *freq <= max_freq => {}
            _ => best = Some((x, *freq)),
        }
    }
    best.map(|(x, _)| x)
}

/// Accumulates responses into group statistics.
///
/// Each response is classified as it is added. Two aggregators built over
/// disjoint sets of responses can be merged, which gives the same result as
/// adding all the responses to a single aggregator.
///
/// ```
/// use serde_json::json;
/// use survey_analysis::{Aggregator, AnalysisRules, SurveyResponse};
///
/// let mut agg = Aggregator::new(&AnalysisRules::DEFAULT_RULES);
/// agg.add_response(&SurveyResponse::new("a", json!({"q1": 4})))?;
/// agg.add_response(&SurveyResponse::new("b", json!({"q1": "6"})))?;
/// let group = agg.finish();
/// assert_eq!(group.statistics["q1"].mean, Some(5.0));
/// assert_eq!(group.common_fields, vec!["q1".to_string()]);
/// # Ok::<(), survey_analysis::AnalysisError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Aggregator {
    rules: AnalysisRules,
    numeric_fields: BTreeMap<String, Vec<f64>>,
    text_fields: BTreeMap<String, Vec<String>>,
    frequencies: HashMap<String, usize>,
    total_responses: usize,
}

impl Aggregator {
    pub fn new(rules: &AnalysisRules) -> Aggregator {
        Aggregator {
            rules: *rules,
            numeric_fields: BTreeMap::new(),
            text_fields: BTreeMap::new(),
            frequencies: HashMap::new(),
            total_responses: 0,
        }
    }

    /// Classifies and adds a response.
    ///
    /// On error, the aggregator is left unchanged.
    pub fn add_response(&mut self, response: &SurveyResponse) -> AnalysisResult<()> {
        let fields = classify(response)?;
        self.add_classified(&fields);
        Ok(())
    }

    /// Adds a response that has already been classified.
    pub fn add_classified(&mut self, fields: &ClassifiedFields) {
        self.total_responses += 1;
        let mut seen: HashSet<&String> = HashSet::new();
        for (key, x) in fields.numeric.iter() {
            self.numeric_fields.entry(key.clone()).or_default().push(*x);
            seen.insert(key);
        }
        for (key, s) in fields.text.iter() {
            self.text_fields.entry(key.clone()).or_default().push(s.clone());
            seen.insert(key);
        }
        for key in seen {
            *self.frequencies.entry(key.clone()).or_insert(0) += 1;
        }
    }

    /// Appends the content of another aggregator, as if its responses had been
    /// added after the responses of this one.
    pub fn merge(&mut self, other: Aggregator) {
        for (key, mut values) in other.numeric_fields {
            self.numeric_fields.entry(key).or_default().append(&mut values);
        }
        for (key, mut values) in other.text_fields {
            self.text_fields.entry(key).or_default().append(&mut values);
        }
        for (key, freq) in other.frequencies {
            *self.frequencies.entry(key).or_insert(0) += freq;
        }
        self.total_responses += other.total_responses;
    }

    pub fn total_responses(&self) -> usize {
        self.total_responses
    }

    pub fn finish(self) -> GroupStatistics {
        let threshold = self.rules.common_field_ratio * self.total_responses as f64;
        let mut common_fields: Vec<String> = self
            .frequencies
            .iter()
            .filter(|(_, freq)| **freq as f64 >= threshold)
            .map(|(key, _)| key.clone())
            .collect();
        common_fields.sort();

        let statistics: BTreeMap<String, FieldStatistics> = self
            .numeric_fields
            .iter()
            .map(|(key, values)| (key.clone(), FieldStatistics::compute(values)))
            .collect();
        for (key, stats) in statistics.iter() {
            debug!("aggregate: field {}: {:?}", key, stats);
        }
        info!(
            "Aggregated {} responses: {} numeric fields, {} text fields, {} common fields",
            self.total_responses,
            self.numeric_fields.len(),
            self.text_fields.len(),
            common_fields.len()
        );

        GroupStatistics {
            numeric_fields: self.numeric_fields,
            text_fields: self.text_fields,
            common_fields,
            statistics,
            total_responses: self.total_responses,
        }
    }
}

/// Computes the statistics of a group of responses with the default rules.
///
/// Fails on the first response with malformed answers. Use an [`Aggregator`]
/// to skip such responses instead.
pub fn aggregate(responses: &[SurveyResponse]) -> AnalysisResult<GroupStatistics> {
    aggregate_with_rules(responses, &AnalysisRules::DEFAULT_RULES)
}

pub fn aggregate_with_rules(
    responses: &[SurveyResponse],
    rules: &AnalysisRules,
) -> AnalysisResult<GroupStatistics> {
    let mut agg = Aggregator::new(rules);
    for r in responses {
        agg.add_response(r)?;
    }
    Ok(agg.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn responses(answers: &[serde_json::Value]) -> Vec<SurveyResponse> {
        let _ = env_logger::builder().is_test(true).try_init();
        answers
            .iter()
            .enumerate()
            .map(|(idx, a)| SurveyResponse::new(idx as u64, a.clone()))
            .collect()
    }

    #[test]
    fn empty_group() {
        let res = aggregate(&[]).unwrap();
        assert_eq!(res, GroupStatistics::default());
        assert_eq!(res.total_responses, 0);
        assert!(res.common_fields.is_empty());
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(
            FieldStatistics::compute(&[1.0, 2.0, 3.0, 4.0]).median,
            Some(2.5)
        );
        assert_eq!(FieldStatistics::compute(&[3.0, 1.0, 2.0]).median, Some(2.0));
    }

    #[test]
    fn mean_is_rounded() {
        let stats = FieldStatistics::compute(&[1.0, 1.0, 2.0]);
        assert_eq!(stats.mean, Some(1.33));
        assert_eq!(stats.sum, 4.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn mode_tie_break_is_first_to_reach_max() {
        // 2 reaches a frequency of 2 before 1 does.
        assert_eq!(FieldStatistics::compute(&[1.0, 2.0, 2.0, 1.0]).mode, Some(2.0));
        // All values are seen once: the first one wins.
        assert_eq!(FieldStatistics::compute(&[3.0, 1.0]).mode, Some(3.0));
        assert_eq!(FieldStatistics::compute(&[5.0, 1.0, 1.0]).mode, Some(1.0));
    }

    #[test]
    fn empty_statistics() {
        let stats = FieldStatistics::compute(&[]);
        assert_eq!(stats, FieldStatistics::EMPTY);
        assert_eq!(stats.sum, 0.0);
        assert!(stats.min.is_none() && stats.mean.is_none() && stats.mode.is_none());
    }

    #[test]
    fn common_field_threshold() {
        let group = responses(&[
            json!({"x": 1, "y": 1}),
            json!({"x": 2}),
            json!({"z": "a"}),
            json!({"w": "b"}),
        ]);
        let res = aggregate(&group).unwrap();
        assert_eq!(res.common_fields, vec!["x".to_string()]);
        assert_eq!(res.total_responses, 4);
        assert_eq!(res.numeric_fields["x"], vec![1.0, 2.0]);
        assert_eq!(res.text_fields["z"], vec!["a".to_string()]);
        assert!(!res.statistics.contains_key("z"));
    }

    #[test]
    fn text_fields_are_common_too() {
        let group = responses(&[json!({"c": "yes"}), json!({"c": "no", "q": 3})]);
        let res = aggregate(&group).unwrap();
        assert_eq!(res.common_fields, vec!["c".to_string(), "q".to_string()]);
    }

    #[test]
    fn statistics_per_field() {
        let group = responses(&[json!({"q1": 4}), json!({"q1": 6}), json!({"q1": "8"})]);
        let res = aggregate(&group).unwrap();
        let stats = &res.statistics["q1"];
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, Some(4.0));
        assert_eq!(stats.max, Some(8.0));
        assert_eq!(stats.mean, Some(6.0));
        assert_eq!(stats.median, Some(6.0));
        assert_eq!(stats.mode, Some(4.0));
        assert_eq!(stats.sum, 18.0);
    }

    #[test]
    fn malformed_member_fails_aggregate() {
        let mut group = responses(&[json!({"q1": 4})]);
        group.push(SurveyResponse::new("bad", json!("{oops")));
        assert!(aggregate(&group).is_err());
    }

    #[test]
    fn aggregator_skips_failed_response() {
        let mut agg = Aggregator::new(&AnalysisRules::DEFAULT_RULES);
        agg.add_response(&SurveyResponse::new("a", json!({"q1": 4})))
            .unwrap();
        assert!(agg
            .add_response(&SurveyResponse::new("bad", json!("{oops")))
            .is_err());
        assert_eq!(agg.total_responses(), 1);
        assert_eq!(agg.finish().common_fields, vec!["q1".to_string()]);
    }

    #[test]
    fn merge_matches_sequential() {
        let group = responses(&[
            json!({"q1": 4, "c": "a"}),
            json!({"q1": 6}),
            json!({"q2": "3-5", "c": "b"}),
            json!({"q1": 4}),
        ]);
        let (left, right) = group.split_at(2);
        let rules = AnalysisRules::DEFAULT_RULES;
        let mut agg_left = Aggregator::new(&rules);
        for r in left {
            agg_left.add_response(r).unwrap();
        }
        let mut agg_right = Aggregator::new(&rules);
        for r in right {
            agg_right.add_response(r).unwrap();
        }
        agg_left.merge(agg_right);
        assert_eq!(agg_left.finish(), aggregate(&group).unwrap());
    }

    #[test]
    fn custom_ratio() {
        let group = responses(&[json!({"x": 1}), json!({"y": 1}), json!({"y": 2})]);
        let rules = AnalysisRules {
            common_field_ratio: 0.25,
            ..AnalysisRules::DEFAULT_RULES
        };
        let res = aggregate_with_rules(&group, &rules).unwrap();
        assert_eq!(res.common_fields, vec!["x".to_string(), "y".to_string()]);
    }
}
