/// Split a "grade - section" input such as `"7 - Rizal"` into its parts.
/// Separators are `-`, `/` and `|`; further parts join the section with spaces.
/// Input without a separator is all grade.
pub fn parse_grade_section(value: &str) -> (String, String) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return (String::new(), String::new());
    }

    let parts: Vec<&str> = trimmed
        .split(['-', '/', '|'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [grade, section @ ..] if !section.is_empty() => (grade.to_string(), section.join(" ")),
        _ => (trimmed.to_string(), String::new()),
    }
}

/// Remove all whitespace, e.g. "March 2025" -> "March2025"
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Format a percentage with one decimal place
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate)
}
