use cad_sdk::{
    cad_sdk_test::{MockAssistant, MockExecutor, MockIllustrator, MockResult},
    AssistantRequest, AssistantResponse, AssistantService, ExecutionRequest, ExecutionResponse,
    ExecutionService, IllustrationRequest, IllustrationResponse, IllustrationService,
    ServiceError, TokenUsage, ViewType,
};

#[tokio::test]
async fn mock_assistant_tracks_requests_and_returns_results() {
    let assistant = MockAssistant::new();

    let response1 = AssistantResponse {
        content: "first".to_string(),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 2,
        },
    };

    assistant
        .enqueue(response1.clone())
        .enqueue(MockResult::error(ServiceError::Remote(
            "mock",
            "overloaded".to_string(),
        )))
        .enqueue_text("third");

    let request1 = AssistantRequest::new("one", "system");
    let res1 = assistant
        .complete(request1.clone())
        .await
        .expect("first call should succeed");
    assert_eq!(res1, response1);

    let err = assistant
        .complete(AssistantRequest::new("two", "system"))
        .await
        .expect_err("second call should fail");
    assert!(matches!(err, ServiceError::Remote("mock", ref msg) if msg == "overloaded"));

    let res3 = assistant
        .complete(AssistantRequest::new("three", "system"))
        .await
        .expect("third call should succeed");
    assert_eq!(res3.content, "third");

    let tracked = assistant.tracked_requests();
    assert_eq!(tracked.len(), 3);
    assert_eq!(tracked[0], request1);

    assistant.reset();
    assert!(assistant.tracked_requests().is_empty());
}

#[tokio::test]
async fn mock_assistant_errors_when_queue_is_empty() {
    let assistant = MockAssistant::new();
    assistant.enqueue_text("unused");
    assistant.restore();

    let err = assistant
        .complete(AssistantRequest::new("hi", "system"))
        .await
        .expect_err("no results enqueued");
    assert!(matches!(err, ServiceError::Invariant("mock", _)));
    assert_eq!(assistant.tracked_requests().len(), 1);
}

#[tokio::test]
async fn mock_executor_returns_enqueued_responses() {
    let executor = MockExecutor::new();
    executor.enqueue_failure("SyntaxError").enqueue(ExecutionResponse {
        success: true,
        drawing: Some("0\nEOF\n".to_string()),
        ..ExecutionResponse::default()
    });

    let first = executor
        .execute(ExecutionRequest::new("bad"))
        .await
        .expect("response");
    assert_eq!(first.error.as_deref(), Some("SyntaxError"));
    assert!(!first.success);

    let second = executor
        .execute(ExecutionRequest::new("good"))
        .await
        .expect("response");
    assert!(second.success);

    let codes: Vec<_> = executor
        .tracked_requests()
        .into_iter()
        .map(|request| request.code)
        .collect();
    assert_eq!(codes, vec!["bad".to_string(), "good".to_string()]);
}

#[tokio::test]
async fn mock_illustrator_prefers_results_keyed_by_view() {
    let illustrator = MockIllustrator::new();
    illustrator
        .enqueue(IllustrationResponse {
            success: true,
            image: Some("c2hhcmVk".to_string()),
            error: None,
        })
        .enqueue_for(
            ViewType::Top,
            MockResult::error(ServiceError::Remote("mock", "quota".to_string())),
        );

    let top = illustrator
        .illustrate(IllustrationRequest::new("top", ViewType::Top))
        .await;
    assert!(top.is_err());

    let front = illustrator
        .illustrate(IllustrationRequest::new("front", ViewType::Front))
        .await
        .expect("shared result");
    assert_eq!(front.image.as_deref(), Some("c2hhcmVk"));

    assert_eq!(illustrator.tracked_requests().len(), 2);
}
