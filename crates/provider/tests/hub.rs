//! Hosted summarizer and captioner tests against a mock inference endpoint.

use hfgate_provider::{HubCaptioner, HubClient, HubSummarizer, ModelsConfig, build_registry};
use inference::{
    Caption, CaptionRequest, Image, ImageSource, InferenceError, Orchestrator, Role, Summarize,
    SummaryParams,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn config(server: &MockServer) -> ModelsConfig {
    let mut config = ModelsConfig::default();
    config.hub.inference_url = format!("{}/models", server.uri());
    config.hub.hub_url = server.uri();
    config.summarizer.model = "org/summarizer".into();
    config.captioner.models = vec!["org/primary".into(), "org/fallback".into()];
    config
}

fn hub(server: &MockServer, api_key: &str) -> HubClient {
    let mut config = config(server);
    config.hub.api_key = api_key.to_owned();
    HubClient::new(reqwest::Client::new(), &config.hub).unwrap()
}

async fn available(server: &MockServer, model: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/models/{model}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": model})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn summarizer_sends_derived_params_without_sampling() {
    let server = MockServer::start().await;
    available(&server, "org/summarizer").await;
    Mock::given(method("POST"))
        .and(path("/models/org/summarizer"))
        .and(header("authorization", "Bearer hf-test"))
        .and(body_json(json!({
            "inputs": "hello world",
            "parameters": {"max_length": 20, "min_length": 10, "do_sample": false}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"summary_text": "hello"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let summarizer = HubSummarizer::connect(hub(&server, "hf-test"), "org/summarizer".into())
        .await
        .unwrap();
    let params = SummaryParams::for_text("hello world");
    let summaries = summarizer.summarize("hello world", &params).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].summary_text, "hello");
}

#[tokio::test]
async fn hosted_error_message_is_surfaced() {
    let server = MockServer::start().await;
    available(&server, "org/summarizer").await;
    Mock::given(method("POST"))
        .and(path("/models/org/summarizer"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({"error": "Model org/summarizer is currently loading"})),
        )
        .mount(&server)
        .await;

    let summarizer = HubSummarizer::connect(hub(&server, ""), "org/summarizer".into())
        .await
        .unwrap();
    let err = summarizer
        .summarize("text", &SummaryParams::derive(1))
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("503"), "{message}");
    assert!(message.contains("currently loading"), "{message}");
}

#[tokio::test]
async fn unavailable_model_fails_to_connect() {
    let server = MockServer::start().await;
    let err = HubCaptioner::connect(hub(&server, ""), "org/missing".into())
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("org/missing"), "{err}");
}

#[tokio::test]
async fn probe_can_be_disabled() {
    let server = MockServer::start().await;
    let mut config = config(&server);
    config.hub.probe = false;
    let hub = HubClient::new(reqwest::Client::new(), &config.hub).unwrap();
    assert!(HubCaptioner::connect(hub, "org/anything".into()).await.is_ok());
}

#[tokio::test]
async fn captioner_posts_image_bytes_with_their_type() {
    let server = MockServer::start().await;
    available(&server, "org/primary").await;
    Mock::given(method("POST"))
        .and(path("/models/org/primary"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": "a tiny square"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let captioner = HubCaptioner::connect(hub(&server, ""), "org/primary".into())
        .await
        .unwrap();
    let image = Image::decode(inference::testing::PNG_1X1.into()).unwrap();
    let outputs = captioner.caption(&image).await.unwrap();
    assert_eq!(outputs[0].text(), Some("a tiny square"));
}

#[tokio::test]
async fn captioner_accepts_a_bare_object() {
    let server = MockServer::start().await;
    available(&server, "org/primary").await;
    Mock::given(method("POST"))
        .and(path("/models/org/primary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"caption": "a square"})))
        .mount(&server)
        .await;

    let captioner = HubCaptioner::connect(hub(&server, ""), "org/primary".into())
        .await
        .unwrap();
    let image = Image::decode(inference::testing::PNG_1X1.into()).unwrap();
    let outputs = captioner.caption(&image).await.unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].text(), Some("a square"));
}

#[tokio::test]
async fn registry_falls_back_to_the_second_captioner() {
    let server = MockServer::start().await;
    available(&server, "org/summarizer").await;
    available(&server, "org/fallback").await;
    Mock::given(method("POST"))
        .and(path("/models/org/fallback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": "from the fallback"}
        ])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/org/primary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let registry = build_registry(&config(&server)).await.unwrap();
    assert_eq!(registry.captioner().model(), "org/fallback");
    assert_eq!(registry.info(Role::Captioner).candidate, 1);

    let orchestrator = Orchestrator::new(registry);
    for _ in 0..2 {
        let outcome = orchestrator
            .caption(CaptionRequest {
                source: ImageSource::Bytes(inference::testing::PNG_1X1.into()),
            })
            .await
            .unwrap();
        assert_eq!(outcome.caption, "from the fallback");
    }
}

#[tokio::test]
async fn stalled_probe_moves_on_to_the_next_captioner() {
    let server = MockServer::start().await;
    available(&server, "org/summarizer").await;
    available(&server, "org/fallback").await;
    Mock::given(method("GET"))
        .and(path("/api/models/org/primary"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(30)))
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.hub.probe_timeout_secs = 1;
    let registry = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        build_registry(&config),
    )
    .await
    .expect("startup must not hang on a stalled probe")
    .unwrap();
    assert_eq!(registry.captioner().model(), "org/fallback");
}

#[tokio::test]
async fn registry_fails_when_no_captioner_is_available() {
    let server = MockServer::start().await;
    available(&server, "org/summarizer").await;

    let err = build_registry(&config(&server)).await.err().unwrap();
    match err.downcast_ref::<InferenceError>() {
        Some(InferenceError::InitializationFatal { role, detail }) => {
            assert_eq!(*role, Role::Captioner);
            assert!(detail.contains("org/primary"), "{detail}");
            assert!(detail.contains("org/fallback"), "{detail}");
        }
        _ => panic!("unexpected error: {err:#}"),
    }
}

#[tokio::test]
async fn registry_fails_when_the_summarizer_is_unavailable() {
    let server = MockServer::start().await;
    available(&server, "org/primary").await;

    let err = build_registry(&config(&server)).await.err().unwrap();
    match err.downcast_ref::<InferenceError>() {
        Some(InferenceError::InitializationFatal { role, .. }) => {
            assert_eq!(*role, Role::Summarizer)
        }
        _ => panic!("unexpected error: {err:#}"),
    }
}
