use super::ValidationReport;

const REQUIRED_LABELS: [&str; 5] = [
    "**Feature:**",
    "**Summary:**",
    "**Problem:**",
    "**Solution:**",
    "**Scope:",
];
const SCOPE_LABEL: &str = "**Scope:";
const MIN_SCOPE_BULLETS: usize = 2;

/// Validate a feature description.
pub fn validate_description(text: &str) -> ValidationReport {
    let mut reasons = Vec::new();

    for label in REQUIRED_LABELS {
        if !text.contains(label) {
            reasons.push(format!("Missing '{}' label", label));
        }
    }

    if let Some(bullets) = scope_bullet_count(text) {
        if bullets < MIN_SCOPE_BULLETS {
            reasons.push(format!(
                "Scope must list at least {} '*' bullet points, found {}",
                MIN_SCOPE_BULLETS, bullets
            ));
        }
    }

    ValidationReport::from_reasons(reasons)
}

/// Bullets after the first Scope label, `None` when there is no label.
///
/// The label's closing `**` is skipped so the remainder of the label line
/// counts as a bullet only when it starts with its own `*`.
fn scope_bullet_count(text: &str) -> Option<usize> {
    let start = text.find(SCOPE_LABEL)? + SCOPE_LABEL.len();
    let after = &text[start..];
    let after = after.strip_prefix("**").unwrap_or(after);

    Some(after.lines().filter(|line| is_bullet(line)).count())
}

fn is_bullet(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('*') && !line.starts_with("**")
}
