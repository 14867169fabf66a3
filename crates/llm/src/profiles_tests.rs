#![allow(clippy::unwrap_used, reason = "test code")]

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const GOOD_YAML: &str = "```yaml
personality:
  name: Barnaby Hinge
  traits:
    - meticulous
    - nostalgic
  mood: giddy
  interests:
    primary_topics:
      - antique door hinges
    key_figures:
      - Joseph Bramah
    specific_focus: the squeak of 1890s brass hinges
  quirks:
    - oils every door he passes
  speech_pattern: Speaks like a film noir detective
```";

fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

fn generator(server: &MockServer) -> ProfileGenerator {
    let client = LlmClient::new("k".to_owned(), &server.uri(), "m".to_owned()).unwrap();
    ProfileGenerator::new(Arc::new(client))
}

#[test]
fn test_seed_traits_sizes() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let seed = SeedTraits::sample(&mut rng);
        assert!((2..=3).contains(&seed.interests.len()));
        let patterns = seed.speech_pattern.split(" AND ").count();
        assert!((1..=2).contains(&patterns));
        for interest in &seed.interests {
            assert!(SEED_INTERESTS.contains(interest));
        }
    }
}

#[test]
fn test_parse_wrapped_and_bare_yaml() {
    let wrapped = parse_personality_yaml(GOOD_YAML).unwrap();
    assert_eq!(wrapped.name, "Barnaby Hinge");
    assert_eq!(wrapped.interests.unwrap().key_figures, vec!["Joseph Bramah"]);

    let bare = parse_personality_yaml("name: Quill\ntraits: [shy]\n").unwrap();
    assert_eq!(bare.name, "Quill");
    assert!(bare.mood.is_none());
}

#[test]
fn test_parse_rejects_garbage_and_blank_names() {
    assert!(matches!(parse_personality_yaml("- just\n- a list"), Err(LlmError::YamlParse { .. })));
    assert!(matches!(parse_personality_yaml("name: '  '"), Err(LlmError::InvalidOutput(_))));
}

#[test]
fn test_evaluation_parse() {
    let eval = Evaluation::parse("YES, it needs work.\nGive them a rival.\nAdd a catchphrase.");
    assert!(eval.needs_improvement);
    assert_eq!(eval.suggestions, "Give them a rival.\nAdd a catchphrase.");

    let eval = Evaluation::parse("no");
    assert!(!eval.needs_improvement);
    assert!(eval.suggestions.is_empty());
}

#[test]
fn test_prompt_mentions_focus_and_suggestions() {
    let seed = SeedTraits { interests: vec!["fungi networks"], speech_pattern: "Always speaks in third person".to_owned() };
    let first = generation_prompt(&seed, Some("venture capital"), 0, "");
    assert!(first.contains("- fungi networks"));
    assert!(first.contains("interest in venture capital"));
    assert!(!first.contains("Previous attempt"));

    let second = generation_prompt(&seed, None, 1, "be weirder");
    assert!(second.contains("Suggestions for improvement:\nbe weirder"));
}

#[tokio::test]
async fn test_generate_accepts_first_satisfactory_persona() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("creative personality generator"))
        .respond_with(reply(GOOD_YAML))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("evaluation expert"))
        .respond_with(reply("NO\nAlready unique."))
        .expect(1)
        .mount(&server)
        .await;

    let personality = generator(&server).generate(Some("hardware")).await.unwrap();
    assert_eq!(personality.name, "Barnaby Hinge");
}

#[tokio::test]
async fn test_generate_stops_after_max_iterations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("creative personality generator"))
        .respond_with(reply(GOOD_YAML))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("evaluation expert"))
        .respond_with(reply("YES\nMore hinges."))
        .expect(3)
        .mount(&server)
        .await;

    let personality = generator(&server).generate(None).await.unwrap();
    assert_eq!(personality.name, "Barnaby Hinge");
}

#[tokio::test]
async fn test_generate_retries_malformed_output_then_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(reply("I cannot produce YAML today."))
        .expect(2)
        .mount(&server)
        .await;

    let result = generator(&server).with_limits(3, 2).generate(None).await;
    assert!(matches!(result, Err(LlmError::RetriesExhausted(_))));
}
