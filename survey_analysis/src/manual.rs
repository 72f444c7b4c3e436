/*!

This is the long-form manual for `survey_analysis` and `surveycmp`.

## Classification

Each key of the answers of a response is counted in `totalFields`, then:
* `null` and empty strings are skipped.
* Objects are kept as-is in `objects`. Their direct children that are numeric
  are also added to `numeric`, under the key `{parent}_{child}`. They are not
  counted in `numericCount`, and non numeric children are dropped.
* Arrays are kept as-is in `arrays`.
* Numeric answers go to `numeric`, everything else to `text`.

When the answers are stored as a JSON string, that string is decoded first.
Invalid JSON at this level is an error: the response cannot be analyzed.
Nested values are never decoded from strings, so they never fail.

### Numeric answers

A scalar answer is numeric if it is a number, or a string that:
* parses as a number (`"42"`, `" 3.5 "`),
* is a range of integers (`"41-50"`, `"1 - 2"`),
* or starts with digits (`"120000 students"`, `"5 years"`).

The value of a numeric string is found with the first rule that applies:
1. the string is exactly the canonical form of a number: that number
   (`"42"` but not `"042"` or `"3.50"`),
2. a range: its midpoint (`"41-50"` is 45.5),
3. the leading digits (`"3.50"` is 3),
4. the first group of digits anywhere in the string.

`"More than 15"` is not numeric (it does not start with digits), although
[`convert_to_numeric`](crate::convert_to_numeric) returns 15 for it.

## Group statistics

For each numeric field: count, min, max, sum, mean and median (both rounded
to 2 decimals) and mode. The mode is the value that first reaches the highest
frequency when scanning the responses in order: `[1, 2, 2, 1]` has a mode of
2. A field with no values has `null` statistics and a sum of 0.

A field, numeric or text, is *common* when it appears in at least half of the
responses (`commonFieldRatio`).

## Comparison

For each numeric field of the target that the group also answered:
* `difference` is the target value minus the group mean,
* `percentDifference` is the difference relative to the mean, in percent,
  rounded to 1 decimal. It is `null` if the group mean is 0.
* `isAboveAverage`, `isBelowAverage` and `isAverage` (the difference is
  under `averageTolerance`, 0.1 by default) are independent flags: a value
  slightly above the mean is both above average and average.

Fields above the mean by more than `notableDifference` (0.5 by default) are
strengths, sorted by decreasing difference. Fields below the mean by more
than that are improvements, sorted by decreasing absolute difference.

## Input formats

The `surveycmp` program reads responses with the following providers:
* `json` a JSON list of `{"id": ..., "answers": ...}` objects. The answers
  may be an object or a string containing the JSON encoding of an object.
* `csv` a table with the question keys in the first row and one response per
  following row. All the answers are read as strings.

### `csv`

Options in the configuration:
* `idColumnIndex` (optional) the column of the response id, starting at 1.
  Without it, ids are made from the file name and the line number.
* `firstAnswerColumnIndex` (default 1) the first column holding answers.

## Configuration

```json
{
  "outputSettings": {"surveyName": "Teacher survey 2024"},
  "responseSources": [{"provider": "json", "filePath": "responses.json"}],
  "target": {"responseId": "r1", "includeInGroup": false},
  "rules": {"commonFieldRatio": 0.5, "notableDifference": 0.5, "averageTolerance": 0.1}
}
```

File paths are relative to the directory of the configuration file. All the
rules are optional.

By default the comparison group is made of all the responses except the
target. A response of the group that cannot be decoded is reported and
skipped; a target that cannot be decoded stops the analysis.

*/
