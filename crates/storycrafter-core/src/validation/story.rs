use super::ValidationReport;

const STORY_LABEL: &str = "User Story:";
const STORY_PHRASES: [&str; 3] = ["as a", "i want to", "so that i can"];
const PLACEHOLDER_PHRASES: [&str; 2] = ["achieve my goal", "objective"];
const MIN_GIVEN_STEPS: usize = 3;

/// Validate a user story with its acceptance criteria.
pub fn validate_story(text: &str) -> ValidationReport {
    let mut reasons = Vec::new();
    let lower = text.to_lowercase();

    if !text.contains(STORY_LABEL) {
        reasons.push("Missing 'User Story:' label".to_string());
    }

    for phrase in STORY_PHRASES {
        if !lower.contains(phrase) {
            reasons.push(format!(
                "User story sentence must contain '{}' (As a ..., I want to ... so that I can ...)",
                phrase
            ));
        }
    }

    let given = text.matches("GIVEN ").count() + text.matches("Given ").count();
    if given < MIN_GIVEN_STEPS {
        reasons.push(format!(
            "Acceptance criteria need at least {} Given steps, found {}",
            MIN_GIVEN_STEPS, given
        ));
    }

    if !(text.contains("WHEN") || text.contains("When")) {
        reasons.push("Acceptance criteria are missing a When step".to_string());
    }

    if !(text.contains("THEN") || text.contains("Then")) {
        reasons.push("Acceptance criteria are missing a Then step".to_string());
    }

    if PLACEHOLDER_PHRASES.iter().any(|p| lower.contains(p)) {
        reasons.push(
            "Benefit still contains template placeholder wording ('achieve my goal' / 'objective'); state a concrete benefit"
                .to_string(),
        );
    }

    ValidationReport::from_reasons(reasons)
}
