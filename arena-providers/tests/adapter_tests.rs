use std::sync::Arc;
use std::time::Duration;

use arena_core::{
    ArenaConfig, Credentials, FrameworkId, FrameworkProfile, MockSettings, ModelId, PricingTable,
    ProviderAdapter, RecordSource, ResultRecord, SimulatorSettings,
};
use arena_providers::{AdapterRegistry, FrameworkAdapter, MockPath, SimulatorClient};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREDENTIAL: &str = "sk-test-0123456789abcdefghij";
const TASK: &str = "Summarize AI agents";

fn settings(base_url: &str) -> SimulatorSettings {
    SimulatorSettings {
        base_url: base_url.to_string(),
        timeout_secs: 1,
        max_retries: 2,
        retry_backoff_ms: 0,
        ..SimulatorSettings::default()
    }
}

fn adapter(framework: &str, credential: Option<&str>, base_url: &str) -> FrameworkAdapter {
    let profile = FrameworkProfile::find_builtin(&FrameworkId::new(framework)).unwrap();
    let client = SimulatorClient::new(settings(base_url)).unwrap();
    FrameworkAdapter::new(
        profile,
        credential,
        Arc::new(client),
        Arc::new(PricingTable::default()),
        MockPath::new(Duration::ZERO),
    )
}

fn assert_mock_shape(record: &ResultRecord) {
    assert_eq!(record.source, RecordSource::Mock);
    assert_eq!(record.tokens, 250);
    assert_eq!(record.cost, Decimal::new(25, 4));
    assert_eq!((record.quality, record.coverage, record.safety), (95, 98, 100));
    assert!((3..=4).contains(&record.steps.len()));
    assert!(record.error.is_none());
}

fn completion_body(content: serde_json::Value, total_tokens: u64) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content.to_string() } }],
        "usage": { "total_tokens": total_tokens }
    })
}

#[tokio::test]
async fn test_missing_credential_uses_mock_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = adapter("langgraph", None, &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-41")).await;

    assert_mock_shape(&record);
    assert!(record.steps.iter().all(|s| s.starts_with("LangGraph")));
}

#[tokio::test]
async fn test_placeholder_credential_uses_mock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = adapter("autogen", Some("your-api-key-here-please"), &server.uri());
    assert!(!adapter.is_live());

    let record = adapter.execute(TASK, &ModelId::new("gpt-4o")).await;
    assert_mock_shape(&record);
}

#[tokio::test]
async fn test_live_success_prices_target_model() {
    let server = MockServer::start().await;
    let content = json!({
        "output": "Agents plan, act and reflect.",
        "steps": ["parse task", "plan graph", "run nodes", "merge state", "answer"],
        "logs": "node=plan ok",
        "quality": 88.4,
        "coverage": 91,
        "safety": 99
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {CREDENTIAL}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content, 1_234)))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter("langgraph", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-41")).await;

    assert_eq!(record.source, RecordSource::Live);
    assert_eq!(record.tokens, 1_234);
    // 1.234 * 0.0100
    assert_eq!(record.cost, Decimal::new(12_340, 6));
    assert_eq!(record.steps.len(), 5);
    assert_eq!((record.quality, record.coverage, record.safety), (88, 91, 99));
    assert!(record.output.starts_with("Agents plan, act and reflect."));
    assert!(record.output.contains("node=plan ok"));
    assert!(record.error.is_none());
}

#[tokio::test]
async fn test_live_success_ignores_gateway_billed_cost() {
    let server = MockServer::start().await;
    let content = json!({
        "output": "done",
        "steps": ["a", "b", "c", "d"]
    });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": content.to_string() } }],
            "usage": { "total_tokens": 1_000, "cost": 0.5 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter("langgraph", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-41")).await;

    assert_eq!(record.source, RecordSource::Live);
    assert_eq!(record.tokens, 1_000);
    // 1.000 * 0.0100, not the simulator's bill
    assert_eq!(record.cost, Decimal::new(10_000, 6));
}

#[tokio::test]
async fn test_live_success_with_unknown_model_costs_nothing() {
    let server = MockServer::start().await;
    let content = json!({
        "output": "done",
        "steps": ["a", "b", "c", "d"]
    });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content, 900)))
        .mount(&server)
        .await;

    let adapter = adapter("crewai", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("mystery-model")).await;

    assert_eq!(record.source, RecordSource::Live);
    assert_eq!(record.cost, Decimal::ZERO);
    assert_eq!((record.quality, record.coverage, record.safety), (85, 90, 95));
}

#[tokio::test]
async fn test_unauthorized_falls_back_to_mock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "code": "invalid_api_key" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter("langgraph", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-41")).await;

    assert_mock_shape(&record);
}

#[tokio::test]
async fn test_rate_limit_and_quota_fall_back_to_mock() {
    for (status, body) in [
        (429, json!({ "error": { "message": "slow down" } })),
        (429, json!({ "error": { "code": "insufficient_quota" } })),
        (402, json!({ "error": { "message": "payment required" } })),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter("llamaindex", Some(CREDENTIAL), &server.uri());
        let record = adapter.execute(TASK, &ModelId::new("gpt-4o")).await;
        assert_mock_shape(&record);
    }
}

#[tokio::test]
async fn test_malformed_payload_falls_back_to_mock() {
    let server = MockServer::start().await;
    let content = json!({ "output": "x", "steps": "not a list" });
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content, 10)))
        .mount(&server)
        .await;

    let adapter = adapter("autogen", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-4o")).await;

    assert_mock_shape(&record);
}

#[tokio::test]
async fn test_missing_usage_falls_back_to_mock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "{}" } }]
        })))
        .mount(&server)
        .await;

    let adapter = adapter("autogen", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-4o")).await;

    assert_mock_shape(&record);
}

#[tokio::test]
async fn test_timeout_falls_back_to_mock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let adapter = adapter("crewai", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-4o")).await;

    assert_mock_shape(&record);
}

#[tokio::test]
async fn test_network_failure_falls_back_to_mock() {
    // Reserve a port, then release it so connections are refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let adapter = adapter("llamaindex", Some(CREDENTIAL), &base_url);
    let record = adapter.execute(TASK, &ModelId::new("gpt-41")).await;

    assert_mock_shape(&record);
}

#[tokio::test]
async fn test_missing_api_key_request_error_falls_back_to_mock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "type": "invalid_request_error",
                "message": "You didn't provide an API key."
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter("autogen", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-4o")).await;

    assert_mock_shape(&record);
}

#[tokio::test]
async fn test_overflowing_usage_falls_back_to_mock() {
    let server = MockServer::start().await;
    let content = json!({ "output": "done", "steps": ["a", "b", "c", "d"] });
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": content.to_string() } }],
            "usage": { "prompt_tokens": u64::MAX, "completion_tokens": 1 }
        })))
        .mount(&server)
        .await;

    let adapter = adapter("crewai", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-41")).await;

    assert_mock_shape(&record);
}

#[tokio::test]
async fn test_unclassified_server_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "model exploded" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter("langgraph", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-41")).await;

    assert!(record.is_error());
    assert_eq!(record.source, RecordSource::Unavailable);
    assert_eq!(record.tokens, 0);
    assert_eq!(record.cost, Decimal::ZERO);
    assert!(record.steps.is_empty());
    assert_eq!((record.quality, record.coverage, record.safety), (0, 0, 0));

    let message = record.error.unwrap();
    assert!(message.contains("LangGraph unavailable"));
    assert!(message.contains("model exploded"));
    assert!(!message.contains(CREDENTIAL));
}

#[tokio::test]
async fn test_gateway_errors_are_retried_then_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(3)
        .mount(&server)
        .await;

    let adapter = adapter("autogen", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-4o")).await;

    assert!(record.is_error());
    assert!(record.error.unwrap().contains("3 attempts"));
}

#[tokio::test]
async fn test_gateway_error_recovers_on_retry() {
    let server = MockServer::start().await;
    let content = json!({ "output": "ok", "steps": ["a", "b", "c", "d"] });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content, 2_000)))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter("autogen", Some(CREDENTIAL), &server.uri());
    let record = adapter.execute(TASK, &ModelId::new("gpt-41-mini")).await;

    assert_eq!(record.source, RecordSource::Live);
    // 2.0 * 0.0020
    assert_eq!(record.cost, Decimal::new(4, 3));
}

#[tokio::test]
async fn test_registry_from_config() {
    let config = ArenaConfig {
        credentials: Credentials::new().with("LangGraph", CREDENTIAL),
        mock: MockSettings { latency_ms: 0 },
        ..ArenaConfig::default()
    };

    let registry = AdapterRegistry::from_config(&config).unwrap();

    assert_eq!(registry.len(), 4);
    assert_eq!(
        registry.frameworks(),
        vec![
            FrameworkId::new("autogen"),
            FrameworkId::new("crewai"),
            FrameworkId::new("langgraph"),
            FrameworkId::new("llamaindex"),
        ]
    );
    assert!(registry.get(&FrameworkId::new("LANGGRAPH")).is_some());
    assert!(registry.get(&FrameworkId::new("haystack")).is_none());

    let record = registry
        .get(&FrameworkId::new("crewai"))
        .unwrap()
        .execute(TASK, &ModelId::new("gpt-41"))
        .await;
    assert_mock_shape(&record);
}

#[test]
fn test_registry_rejects_invalid_config() {
    let mut config = ArenaConfig::default();
    config.simulator.base_url = "not a url".to_string();

    assert!(AdapterRegistry::from_config(&config).is_err());
}
