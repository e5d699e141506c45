//! Orchestrator tests against in-memory providers.

use hfgate_inference::{
    CaptionOutput, CaptionRequest, ErrorKind, ImageSource, InferenceError, Operation,
    Orchestrator, RawPayload, Registry, Slot, SpeechRequest, SummarizeRequest, normalize,
    testing::{
        FakeCaptioner, FakeFetcher, FakeSpeech, FakeSummarizer, Fakes, MP3_FRAME_HEADER, PNG_1X1,
    },
};
use std::time::Duration;

const IMAGE_URL: &str = "http://images.test/cat.png";

fn orchestrator(
    summarizer: FakeSummarizer,
    captioner: FakeCaptioner,
    speech: FakeSpeech,
    fetcher: FakeFetcher,
) -> Orchestrator<Fakes> {
    Orchestrator::new(Registry::new(
        Slot::new(summarizer, "bart"),
        Slot::new(captioner, "vit-gpt2"),
        speech,
        fetcher,
    ))
}

fn defaults() -> Orchestrator<Fakes> {
    orchestrator(
        FakeSummarizer::new("bart"),
        FakeCaptioner::new("vit-gpt2"),
        FakeSpeech::default(),
        FakeFetcher::new(),
    )
}

// --- summarize ---

#[tokio::test]
async fn summary_carries_derived_params() {
    let orch = defaults();
    let request = SummarizeRequest::new("hello world").unwrap();
    let outcome = orch.summarize(&request).await.unwrap();
    assert_eq!(outcome.summary, "hello world");
    assert_eq!(outcome.meta.input_words, 2);
    assert_eq!(outcome.meta.max_length, 20);
    assert_eq!(outcome.meta.min_length, 10);
}

#[tokio::test]
async fn summaries_are_deterministic() {
    let orch = defaults();
    let text = vec!["lorem"; 120].join(" ");
    let request = SummarizeRequest::new(text).unwrap();
    let first = orch.summarize(&request).await.unwrap();
    let second = orch.summarize(&request).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_text_never_reaches_the_provider() {
    let summarizer = FakeSummarizer::new("bart");
    let calls = summarizer.calls();
    let _orch = orchestrator(
        summarizer,
        FakeCaptioner::new("vit-gpt2"),
        FakeSpeech::default(),
        FakeFetcher::new(),
    );

    let err = normalize::summarize_request(&RawPayload::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingInput);
    assert!(SummarizeRequest::new("").is_err());
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn provider_failure_is_operation_failed() {
    let orch = orchestrator(
        FakeSummarizer::new("bart").failing("model is overloaded"),
        FakeCaptioner::new("vit-gpt2"),
        FakeSpeech::default(),
        FakeFetcher::new(),
    );
    let request = SummarizeRequest::new("some text").unwrap();
    match orch.summarize(&request).await.unwrap_err() {
        InferenceError::OperationFailed { operation, detail } => {
            assert_eq!(operation, Operation::Summarization);
            assert_eq!(detail, "model is overloaded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn bounded_role_serializes_calls() {
    let summarizer = FakeSummarizer::new("bart").delayed(Duration::from_millis(20));
    let gauge = summarizer.gauge();
    let orch = Orchestrator::<Fakes>::new(Registry::new(
        Slot::new(summarizer, "bart").with_concurrency(Some(1)),
        Slot::new(FakeCaptioner::new("vit-gpt2"), "vit-gpt2"),
        FakeSpeech::default(),
        FakeFetcher::new(),
    ));

    let request = SummarizeRequest::new("one two three").unwrap();
    let (a, b, c) = tokio::join!(
        orch.summarize(&request),
        orch.summarize(&request),
        orch.summarize(&request)
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(gauge.peak(), 1);
}

#[tokio::test]
async fn unbounded_role_runs_calls_concurrently() {
    let summarizer = FakeSummarizer::new("bart").delayed(Duration::from_millis(20));
    let gauge = summarizer.gauge();
    let orch = orchestrator(
        summarizer,
        FakeCaptioner::new("vit-gpt2"),
        FakeSpeech::default(),
        FakeFetcher::new(),
    );

    let request = SummarizeRequest::new("one two three").unwrap();
    let _ = tokio::join!(orch.summarize(&request), orch.summarize(&request));
    assert_eq!(gauge.peak(), 2);
}

// --- caption ---

#[tokio::test]
async fn uploaded_image_is_captioned() {
    let orch = defaults();
    let request = CaptionRequest {
        source: ImageSource::Bytes(PNG_1X1.into()),
    };
    let outcome = orch.caption(request).await.unwrap();
    assert_eq!(outcome.caption, "a caption from vit-gpt2");
}

#[tokio::test]
async fn remote_image_is_fetched_then_captioned() {
    let fetcher = FakeFetcher::new().serving(IMAGE_URL, PNG_1X1);
    let fetches = fetcher.calls();
    let orch = orchestrator(
        FakeSummarizer::new("bart"),
        FakeCaptioner::new("vit-gpt2"),
        FakeSpeech::default(),
        fetcher,
    );
    let request = CaptionRequest {
        source: ImageSource::Url(IMAGE_URL.into()),
    };
    assert_eq!(
        orch.caption(request).await.unwrap().caption,
        "a caption from vit-gpt2"
    );
    assert_eq!(fetches.count(), 1);
}

#[tokio::test]
async fn upload_with_url_never_fetches() {
    let fetcher = FakeFetcher::new().serving(IMAGE_URL, PNG_1X1);
    let fetches = fetcher.calls();
    let orch = orchestrator(
        FakeSummarizer::new("bart"),
        FakeCaptioner::new("vit-gpt2"),
        FakeSpeech::default(),
        fetcher,
    );
    let payload = RawPayload::default()
        .with_file("image", PNG_1X1)
        .with_field("url", IMAGE_URL);
    let request = normalize::caption_request(&payload).unwrap();
    orch.caption(request).await.unwrap();
    assert_eq!(fetches.count(), 0);
}

#[tokio::test]
async fn fetch_timeout_is_operation_failed() {
    let captioner = FakeCaptioner::new("vit-gpt2");
    let captions = captioner.calls();
    let orch = orchestrator(
        FakeSummarizer::new("bart"),
        captioner,
        FakeSpeech::default(),
        FakeFetcher::new().timing_out(IMAGE_URL),
    );
    let err = orch
        .caption(CaptionRequest {
            source: ImageSource::Url(IMAGE_URL.into()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFailed);
    assert!(err.to_string().contains("timed out"), "{err}");
    assert_eq!(captions.count(), 0);
}

#[tokio::test]
async fn oversized_remote_image_is_operation_failed() {
    let captioner = FakeCaptioner::new("vit-gpt2");
    let captions = captioner.calls();
    let orch = orchestrator(
        FakeSummarizer::new("bart"),
        captioner,
        FakeSpeech::default(),
        FakeFetcher::new().oversized(IMAGE_URL),
    );
    let err = orch
        .caption(CaptionRequest {
            source: ImageSource::Url(IMAGE_URL.into()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFailed);
    assert!(err.to_string().contains("byte limit"), "{err}");
    assert_eq!(captions.count(), 0);
}

#[tokio::test]
async fn unreachable_url_is_operation_failed() {
    let err = defaults()
        .caption(CaptionRequest {
            source: ImageSource::Url("http://images.test/missing.png".into()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFailed);
    assert_eq!(err.body().error, "Captioning failed");
}

#[tokio::test]
async fn non_image_bytes_are_rejected_before_the_provider() {
    let captioner = FakeCaptioner::new("vit-gpt2");
    let captions = captioner.calls();
    let orch = orchestrator(
        FakeSummarizer::new("bart"),
        captioner,
        FakeSpeech::default(),
        FakeFetcher::new(),
    );
    let err = orch
        .caption(CaptionRequest {
            source: ImageSource::Bytes("definitely not an image".into()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFailed);
    assert_eq!(captions.count(), 0);
}

#[tokio::test]
async fn caption_field_falls_back() {
    let captioner = FakeCaptioner::new("blip").with_outputs(vec![CaptionOutput {
        generated_text: None,
        caption: Some("a dog on a beach".into()),
    }]);
    let orch = orchestrator(
        FakeSummarizer::new("bart"),
        captioner,
        FakeSpeech::default(),
        FakeFetcher::new(),
    );
    let outcome = orch
        .caption(CaptionRequest {
            source: ImageSource::Bytes(PNG_1X1.into()),
        })
        .await
        .unwrap();
    assert_eq!(outcome.caption, "a dog on a beach");
}

#[tokio::test]
async fn unrecognized_output_is_an_empty_caption() {
    let orch = orchestrator(
        FakeSummarizer::new("bart"),
        FakeCaptioner::new("blip").with_outputs(Vec::new()),
        FakeSpeech::default(),
        FakeFetcher::new(),
    );
    let outcome = orch
        .caption(CaptionRequest {
            source: ImageSource::Bytes(PNG_1X1.into()),
        })
        .await
        .unwrap();
    assert_eq!(outcome.caption, "");
}

#[tokio::test]
async fn caption_from_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixel.png");
    std::fs::write(&path, PNG_1X1).unwrap();

    let outcome = defaults().caption_path(&path).await.unwrap();
    assert_eq!(outcome.caption, "a caption from vit-gpt2");
}

#[tokio::test]
async fn missing_local_file_is_operation_failed() {
    let dir = tempfile::tempdir().unwrap();
    let err = defaults()
        .caption_path(dir.path().join("nope.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFailed);
    assert!(err.to_string().contains("nope.png"), "{err}");
}

// --- speak ---

#[tokio::test]
async fn speech_returns_mp3() {
    let speech = FakeSpeech::default();
    let orch = orchestrator(
        FakeSummarizer::new("bart"),
        FakeCaptioner::new("vit-gpt2"),
        speech.clone(),
        FakeFetcher::new(),
    );
    let audio = orch
        .speak(&SpeechRequest::new("hello").unwrap())
        .await
        .unwrap();
    assert_eq!(audio[..4], MP3_FRAME_HEADER);
    assert_eq!(infer::get(&audio).map(|k| k.mime_type()), Some("audio/mpeg"));
    assert_eq!(speech.calls.count(), 1);
}

#[tokio::test]
async fn speech_failure_is_operation_failed() {
    let speech = FakeSpeech {
        failure: Some("voice service down".into()),
        ..FakeSpeech::default()
    };
    let orch = orchestrator(
        FakeSummarizer::new("bart"),
        FakeCaptioner::new("vit-gpt2"),
        speech,
        FakeFetcher::new(),
    );
    let err = orch
        .speak(&SpeechRequest::new("hello").unwrap())
        .await
        .unwrap_err();
    let body = err.body();
    assert_eq!(body.error, "Text-to-speech failed");
    assert_eq!(body.details.as_deref(), Some("voice service down"));
}
