use super::ValidationReport;

pub const GHERKIN_FENCE_OPEN: &str = "```gherkin";
pub const GHERKIN_FENCE_CLOSE: &str = "```";

/// Validate a fenced Gherkin test-case block.
pub fn validate_test_cases(text: &str) -> ValidationReport {
    let mut reasons = Vec::new();
    let trimmed = text.trim();

    if !is_fenced(trimmed) {
        reasons.push("Output must start with ```gherkin and end with ```".to_string());
    }

    for label in ["Feature:", "Scenario:", "Scenario Outline:"] {
        if !text.contains(label) {
            reasons.push(format!("Missing '{}'", label));
        }
    }

    if !(text.contains("Examples:") && text.contains('|')) {
        reasons.push("Scenario Outline needs an 'Examples:' table with '|' columns".to_string());
    }

    for step in ["Given", "When", "Then"] {
        if !has_step(text, step) {
            reasons.push(format!("Missing a '{}' step", step));
        }
    }

    ValidationReport::from_reasons(reasons)
}

/// Wrap model output in a `gherkin` fence unless it already is one.
///
/// Stray fence lines (a bare fence or one with another language tag) are
/// dropped before wrapping, so the result always starts with
/// [`GHERKIN_FENCE_OPEN`] and ends with [`GHERKIN_FENCE_CLOSE`].
pub fn normalize_test_cases(text: &str) -> String {
    let trimmed = text.trim();
    if is_fenced(trimmed) {
        return trimmed.to_string();
    }

    let body = if trimmed.contains(GHERKIN_FENCE_CLOSE) {
        trimmed
            .lines()
            .filter(|line| !line.trim_start().starts_with(GHERKIN_FENCE_CLOSE))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        trimmed.to_string()
    };

    format!("{}\n{}\n{}", GHERKIN_FENCE_OPEN, body.trim(), GHERKIN_FENCE_CLOSE)
}

fn is_fenced(trimmed: &str) -> bool {
    trimmed.starts_with(GHERKIN_FENCE_OPEN)
        && trimmed.len() >= GHERKIN_FENCE_OPEN.len() + GHERKIN_FENCE_CLOSE.len()
        && trimmed.ends_with(GHERKIN_FENCE_CLOSE)
}

fn has_step(text: &str, step: &str) -> bool {
    text.contains(&format!(" {}", step)) || text.contains(&format!("\n{}", step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VALID: &str = "```gherkin\n\
Feature: Dashboard logout\n\n\
  Scenario: Successful logout\n\
    Given I am signed in\n\
    When I click logout\n\
    Then I see the sign-in page\n\n\
  Scenario Outline: Logout from different pages\n\
    Given I am on the <page> page\n\
    When I click logout\n\
    Then I see <result>\n\n\
    Examples:\n\
      | page     | result       |\n\
      | settings | sign-in page |\n\
```";

    #[test]
    fn test_valid_block_passes() {
        assert!(validate_test_cases(VALID).ok);
        assert!(validate_test_cases(&format!("\n  {}\n\n", VALID)).ok);
    }

    #[test]
    fn test_unfenced_block_fails_fence_rule_only() {
        let body = VALID
            .trim_start_matches(GHERKIN_FENCE_OPEN)
            .trim_end_matches(GHERKIN_FENCE_CLOSE);
        let report = validate_test_cases(body);
        assert_eq!(report.reasons.len(), 1);
        assert!(report.reasons[0].contains("```gherkin"));
    }

    #[test]
    fn test_missing_outline_and_examples() {
        let text = "```gherkin\nFeature: X\n  Scenario: Y\n    Given a\n    When b\n    Then c\n```";
        let report = validate_test_cases(text);
        assert_eq!(
            report.reasons,
            vec![
                "Missing 'Scenario Outline:'".to_string(),
                "Scenario Outline needs an 'Examples:' table with '|' columns".to_string(),
            ]
        );
    }

    #[test]
    fn test_steps_need_space_or_newline_prefix() {
        assert!(has_step("x\nGiven a", "Given"));
        assert!(has_step("    When b", "When"));
        assert!(!has_step("Then", "Then"));
        assert!(!has_step("AndThen", "Then"));
    }

    #[test]
    fn test_normalize_wraps_bare_text() {
        let normalized = normalize_test_cases("Feature: X\n  Scenario: Y\n");
        assert_eq!(normalized, "```gherkin\nFeature: X\n  Scenario: Y\n```");
    }

    #[test]
    fn test_normalize_keeps_fenced_text() {
        assert_eq!(normalize_test_cases(VALID), VALID);
    }

    #[test]
    fn test_normalize_relabels_foreign_fence() {
        let normalized = normalize_test_cases("Here you go:\n```cucumber\nFeature: X\n```\n");
        assert_eq!(normalized, "```gherkin\nHere you go:\nFeature: X\n```");
    }

    #[test]
    fn test_lone_opener_is_not_fenced() {
        assert!(!is_fenced("```gherkin"));
        assert!(is_fenced("```gherkin```"));
    }

    proptest! {
        #[test]
        fn prop_normalized_text_is_fenced(text in "(?s).{0,300}") {
            let normalized = normalize_test_cases(&text);
            prop_assert!(normalized.starts_with(GHERKIN_FENCE_OPEN));
            prop_assert!(normalized.ends_with(GHERKIN_FENCE_CLOSE));
            prop_assert!(!validate_test_cases(&normalized)
                .reasons
                .iter()
                .any(|r| r.contains("must start with")));
        }

        #[test]
        fn prop_normalize_is_idempotent(text in "(?s).{0,300}") {
            let once = normalize_test_cases(&text);
            prop_assert_eq!(normalize_test_cases(&once), once.clone());
        }
    }
}
