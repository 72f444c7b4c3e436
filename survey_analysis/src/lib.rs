/*!
Analysis of free-form survey responses.

Survey responses arrive as JSON maps from question keys to arbitrary values.
This crate sorts those answers into numeric, text, object and array fields
([`classify`]), aggregates many responses into per-field statistics
([`aggregate`], [`Aggregator`]), and compares one response against a group
of its peers ([`compare`]).

```
use serde_json::json;
use survey_analysis::*;

let target = SurveyResponse::new("t", json!({"experience": "5 years", "students": "41-50"}));
let group = vec![
    SurveyResponse::new("a", json!({"experience": "2 years", "students": "10-20"})),
    SurveyResponse::new("b", json!({"experience": 4, "students": "21-30"})),
];
let res = compare(&target, &group)?;
assert_eq!(res.strengths[0].field, "students");
assert_eq!(res.strengths[0].label, "Students");
# Ok::<(), AnalysisError>(())
```

All the functions are pure: they do not keep any state between calls and
can be called from several threads at once.

See the [manual] for the exact classification rules.
*/

mod classify;
mod compare;
mod config;
mod labels;
pub mod manual;
mod numeric;
mod stats;

pub use crate::classify::classify;
pub use crate::compare::{
    compare, compare_classified, compare_with_rules, compare_with_statistics,
};
pub use crate::config::*;
pub use crate::labels::label_for;
pub use crate::numeric::{convert_to_numeric, is_numeric_classifiable};
pub use crate::stats::{aggregate, aggregate_with_rules, Aggregator};
