//! End-to-end pipeline tests: assembler → orchestrator → invoker.

use std::sync::Arc;

use storycrafter_agent::mock::{ScriptedFactory, ScriptedInvoker};
use storycrafter_agent::{
    ArtifactAssembler, GenerationError, GenerationSettings, ModelSelection, ProviderCredentials,
    ProviderFactory, ProviderKind,
};
use storycrafter_core::{validation, ArtifactKind, GenerationMode, Requirement, TemplateRegistry};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DESCRIPTION: &str = "**Feature:** Dashboard logout\n\
**Summary:** Signed-in users can end their session from the dashboard.\n\
**Problem:** Users on shared devices cannot sign out quickly.\n\
**Solution:** A logout button in the dashboard header ends the session.\n\
**Scope:**\n\
* Logout button in the header\n\
* Redirect to the sign-in page";

const STORY: &str = "Title: Dashboard logout\n\n\
User Story:\n\
As a signed-in user, I want to log out from the dashboard so that I can keep my account safe on shared devices.\n\n\
Scenario: Successful logout\n\
Given I am signed in\n\
When I click the logout button\n\
Then I see the sign-in page\n\n\
Scenario: Expired session\n\
Given my session has already expired\n\
When I click the logout button\n\
Then I see the sign-in page without an error\n\n\
Scenario: Back navigation\n\
Given I have just logged out\n\
When I press the browser back button\n\
Then I stay on the sign-in page";

const TEST_CASES: &str = "```gherkin\n\
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

fn requirement() -> Requirement {
    Requirement::new("Add a logout button").unwrap()
}

/// One scripted invoker per kind, addressed through distinct model names.
fn per_kind_setup(
    description: ScriptedInvoker,
    story: ScriptedInvoker,
    test_cases: ScriptedInvoker,
) -> (ScriptedFactory, GenerationSettings, [Arc<ScriptedInvoker>; 3]) {
    let invokers = [Arc::new(description), Arc::new(story), Arc::new(test_cases)];
    let factory = ScriptedFactory::new()
        .with_invoker("description-model", invokers[0].clone())
        .with_invoker("story-model", invokers[1].clone())
        .with_invoker("test-cases-model", invokers[2].clone());

    let settings = GenerationSettings {
        description: ModelSelection::new("gemini", "description-model"),
        story: ModelSelection::new("openai", "story-model"),
        test_cases: ModelSelection::new("anthropic", "test-cases-model"),
        concurrent: false,
    };

    (factory, settings, invokers)
}

#[test]
fn test_sample_artifacts_are_valid() {
    assert!(validation::validate(ArtifactKind::Description, DESCRIPTION).ok);
    assert!(validation::validate(ArtifactKind::Story, STORY).ok);
    assert!(validation::validate(ArtifactKind::TestCases, TEST_CASES).ok);
}

#[tokio::test]
async fn test_story_mode_fills_only_the_story() {
    let (factory, settings, invokers) = per_kind_setup(
        ScriptedInvoker::new("d"),
        ScriptedInvoker::new("s").reply(STORY),
        ScriptedInvoker::new("t"),
    );

    let bundle = ArtifactAssembler::new(Arc::new(factory), settings)
        .assemble_mode(&requirement(), GenerationMode::Story, None)
        .await
        .unwrap();

    assert!(bundle.description.is_none());
    assert!(bundle.test_cases.is_none());
    let story = bundle.story.unwrap();
    assert!(story.contains("User Story:"));
    assert!(story.matches("Given ").count() >= 3);

    assert_eq!(invokers[0].calls(), 0);
    assert_eq!(invokers[1].calls(), 1);
    assert_eq!(invokers[2].calls(), 0);
}

#[tokio::test]
async fn test_missing_credential_raises_provider_unavailable() {
    let factory = ProviderFactory::new(ProviderCredentials::new());
    let err = ArtifactAssembler::new(Arc::new(factory), GenerationSettings::default())
        .assemble_mode(&requirement(), GenerationMode::All, None)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::ProviderUnavailable { provider } if provider == "gemini"));
}

#[tokio::test]
async fn test_description_without_scope_gets_exactly_one_repair() {
    let without_scope = "**Feature:** Logout\n**Summary:** s\n**Problem:** p\n**Solution:** s";
    let still_without_scope = "**Feature:** Logout\n**Summary:** better\n**Problem:** p\n**Solution:** s";

    let (factory, settings, invokers) = per_kind_setup(
        ScriptedInvoker::new("d").reply(without_scope).reply(still_without_scope),
        ScriptedInvoker::new("s"),
        ScriptedInvoker::new("t"),
    );

    let assembly = ArtifactAssembler::new(Arc::new(factory), settings)
        .assemble_detailed(&requirement(), &[ArtifactKind::Description], None)
        .await
        .unwrap();

    assert_eq!(invokers[0].calls(), 2);
    assert_eq!(assembly.bundle.description.as_deref(), Some(still_without_scope));

    let result = &assembly.results[0];
    assert!(!result.first_attempt_valid);
    assert!(result.repaired);

    let templates = TemplateRegistry::new();
    let repair_prompt = &invokers[0].prompts()[1];
    assert!(repair_prompt.starts_with(templates.guardrails()));
    assert!(repair_prompt.contains(templates.template(ArtifactKind::Description)));
    assert!(repair_prompt.contains("Your previous output failed these checks: Missing '**Scope:' label"));
    assert!(repair_prompt.ends_with("User Request: Add a logout button"));
}

#[tokio::test]
async fn test_all_mode_fills_every_kind() {
    let (factory, settings, invokers) = per_kind_setup(
        ScriptedInvoker::new("d").reply(DESCRIPTION),
        ScriptedInvoker::new("s").reply(STORY),
        ScriptedInvoker::new("t").reply(TEST_CASES),
    );

    let bundle = ArtifactAssembler::new(Arc::new(factory), settings)
        .assemble_mode(&requirement(), GenerationMode::All, None)
        .await
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&bundle.to_message_text().unwrap()).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 3);
    for key in ["description", "story", "test_cases"] {
        assert!(object[key].is_string(), "{} should be generated", key);
    }

    assert!(invokers.iter().all(|i| i.calls() == 1));
}

#[tokio::test]
async fn test_concurrent_assembly_keys_results_by_kind() {
    let (factory, settings, _invokers) = per_kind_setup(
        ScriptedInvoker::new("d").reply(DESCRIPTION),
        ScriptedInvoker::new("s").reply(STORY),
        ScriptedInvoker::new("t").reply(TEST_CASES),
    );

    let bundle = ArtifactAssembler::new(Arc::new(factory), settings.with_concurrent(true))
        .assemble_mode(&requirement(), GenerationMode::All, None)
        .await
        .unwrap();

    assert_eq!(bundle.description.as_deref(), Some(DESCRIPTION));
    assert_eq!(bundle.story.as_deref(), Some(STORY));
    assert_eq!(bundle.test_cases.as_deref(), Some(TEST_CASES));
}

#[tokio::test]
async fn test_unfenced_test_cases_are_wrapped_before_validation() {
    let unfenced = TEST_CASES
        .trim_start_matches("```gherkin")
        .trim_end_matches("```");

    let (factory, settings, invokers) = per_kind_setup(
        ScriptedInvoker::new("d"),
        ScriptedInvoker::new("s"),
        ScriptedInvoker::new("t").reply(unfenced),
    );

    let bundle = ArtifactAssembler::new(Arc::new(factory), settings)
        .assemble_mode(&requirement(), GenerationMode::TestCases, None)
        .await
        .unwrap();

    let text = bundle.test_cases.unwrap();
    assert!(text.starts_with("```gherkin"));
    assert!(text.ends_with("```"));
    assert_eq!(invokers[2].calls(), 1);
}

#[tokio::test]
async fn test_gemini_round_trip_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": STORY }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = ProviderCredentials::new()
        .with_api_key(ProviderKind::Gemini, "test-key")
        .with_base_url(ProviderKind::Gemini, server.uri());
    let assembler = ArtifactAssembler::new(
        Arc::new(ProviderFactory::new(credentials)),
        GenerationSettings::default(),
    );

    let bundle = assembler
        .assemble_mode(&requirement(), GenerationMode::Story, None)
        .await
        .unwrap();

    assert_eq!(bundle.story.as_deref(), Some(STORY));
}

#[tokio::test]
async fn test_empty_gemini_repair_keeps_first_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(body_string_contains("Your previous output failed these checks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "" }] } }]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "User Story: first draft" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = ProviderCredentials::new()
        .with_api_key(ProviderKind::Gemini, "test-key")
        .with_base_url(ProviderKind::Gemini, server.uri());
    let assembler = ArtifactAssembler::new(
        Arc::new(ProviderFactory::new(credentials)),
        GenerationSettings::default(),
    );

    let bundle = assembler
        .assemble_mode(&requirement(), GenerationMode::Story, None)
        .await
        .unwrap();

    assert_eq!(bundle.story.as_deref(), Some("User Story: first draft"));
    assert!(bundle.description.is_none());
}
