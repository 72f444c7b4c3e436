/// Turns a field key into a label for display.
///
/// Keys made only of digits are question numbers. Other keys are split on
/// underscores and each word is capitalized: the first letter is upper
/// case and the rest lower case, so acronyms are not kept (`GPA` becomes
/// `Gpa`).
///
/// ```
/// use survey_analysis::label_for;
///
/// assert_eq!(label_for("years_of_experience"), "Years Of Experience");
/// assert_eq!(label_for("12"), "Question 12");
/// ```
pub fn label_for(key: &str) -> String {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
        return format!("Question {}", key);
    }
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<String>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
