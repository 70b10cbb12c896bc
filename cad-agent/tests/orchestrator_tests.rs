use cad_agent::{
    Orchestrator, PipelineError, PipelineEvent, SessionParams, Stage, StageStatus, SubmitOutcome,
    DXF_CONTENT_TYPE,
};
use cad_sdk::{
    cad_sdk_test::{MockAssistant, MockExecutor, MockIllustrator, MockResult},
    ConversationTurn, EntityStats, ExecutionResponse, IllustrationResponse, Role, ServiceError,
    ViewType,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    time::timeout,
};

const PREAMBLE: &str = "import ezdxf\ndoc = ezdxf.new()\nmsp = doc.modelspace()";
const DRAWING: &str = "0\nSECTION\n2\nENTITIES\n0\nCIRCLE\n8\n0\n10\n0\n20\n0\n40\n5\n0\nENDSEC\n0\nEOF\n";

struct Harness {
    assistant: Arc<MockAssistant>,
    auxiliary: Arc<MockAssistant>,
    executor: Arc<MockExecutor>,
    events: UnboundedReceiver<PipelineEvent>,
    orchestrator: Orchestrator,
}

fn harness() -> Harness {
    let assistant = Arc::new(MockAssistant::new());
    let auxiliary = Arc::new(MockAssistant::new());
    let executor = Arc::new(MockExecutor::new());
    let (sender, events) = mpsc::unbounded_channel();

    let session = SessionParams::new()
        .preamble(PREAMBLE)
        .build(assistant.clone(), executor.clone());
    let orchestrator =
        Orchestrator::new(session, Arc::new(sender)).with_auxiliary_assistant(auxiliary.clone());

    Harness {
        assistant,
        auxiliary,
        executor,
        events,
        orchestrator,
    }
}

fn drawing_response() -> ExecutionResponse {
    ExecutionResponse {
        success: true,
        drawing: Some(DRAWING.to_string()),
        stats: Some(EntityStats {
            entity_count: 1,
            layer_count: 1,
            bounds: None,
        }),
        ..ExecutionResponse::default()
    }
}

fn drain(events: &mut UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

fn stages(events: &[PipelineEvent]) -> Vec<Stage> {
    events
        .iter()
        .filter_map(|event| match event {
            PipelineEvent::Stage(status) => Some(status.stage),
            _ => None,
        })
        .collect()
}

const SUMMARY_REPLY: &str = "```json\n{\"title\":\"Plate\",\"description\":\"A plate\",\"dimensions\":[],\"rationale\":\"Simple.\"}\n```";

#[tokio::test]
async fn submit_runs_analysis_authoring_and_execution() {
    let mut harness = harness();
    harness
        .assistant
        .enqueue_text("A 10 mm disc on layer 0.")
        .enqueue_text("```python\nmsp.add_circle((0, 0), 5)\n```");
    harness.auxiliary.enqueue_text(SUMMARY_REPLY);
    harness.executor.enqueue(drawing_response());

    let outcome = harness
        .orchestrator
        .submit("Design a disc")
        .await
        .expect("drawing");

    let drawing = match outcome {
        SubmitOutcome::Drawing(drawing) => drawing,
        other => panic!("expected a drawing, got {other:?}"),
    };
    assert_eq!(drawing.drawing, DRAWING);
    assert_eq!(drawing.attempts, 1);

    assert_eq!(
        harness.orchestrator.stage(),
        StageStatus {
            stage: Stage::Success,
            message: "DXF generated successfully!".to_string(),
        }
    );
    assert_eq!(
        stages(&drain(&mut harness.events)),
        vec![
            Stage::Analyzing,
            Stage::Generating,
            Stage::Executing,
            Stage::Success
        ]
    );
    assert_eq!(
        harness.orchestrator.execution_log().await,
        vec![
            "Attempt 1/3: Executing code...".to_string(),
            "Success: Generated 1 entities in 1 layers".to_string(),
        ]
    );
    assert_eq!(
        harness.orchestrator.code().await,
        format!("{PREAMBLE}\nmsp.add_circle((0, 0), 5)\n")
    );

    harness.orchestrator.wait_for_auxiliary().await;
    let summary = harness
        .orchestrator
        .design_summary()
        .expect("design summary");
    assert_eq!(summary.title, "Plate");
    assert!(drain(&mut harness.events)
        .iter()
        .any(|event| matches!(event, PipelineEvent::DesignSummary(_))));
}

#[tokio::test]
async fn clarification_stops_before_authoring() {
    let mut harness = harness();
    harness
        .assistant
        .enqueue_text("Could you clarify the expected load on the bracket?");

    let outcome = harness
        .orchestrator
        .submit("Design a bracket")
        .await
        .expect("clarification");

    assert_eq!(
        outcome,
        SubmitOutcome::NeedsClarification {
            analysis: "Could you clarify the expected load on the bracket?".to_string(),
        }
    );
    assert_eq!(harness.assistant.tracked_requests().len(), 1);
    assert!(harness.executor.tracked_requests().is_empty());
    harness.orchestrator.wait_for_auxiliary().await;
    assert!(harness.auxiliary.tracked_requests().is_empty());

    assert_eq!(
        harness.orchestrator.stage(),
        StageStatus {
            stage: Stage::Idle,
            message: "Waiting for more information...".to_string(),
        }
    );
    assert_eq!(
        stages(&drain(&mut harness.events)),
        vec![Stage::Analyzing, Stage::Idle]
    );
    assert_eq!(harness.orchestrator.conversation().await.len(), 2);
    assert_eq!(
        harness.orchestrator.transcript().await,
        vec![
            ConversationTurn::user("Design a bracket"),
            ConversationTurn::assistant("Could you clarify the expected load on the bracket?"),
        ]
    );
}

#[tokio::test]
async fn blank_submission_is_rejected() {
    let harness = harness();

    let err = harness
        .orchestrator
        .submit("  \n")
        .await
        .expect_err("validation");

    assert!(matches!(err, PipelineError::Validation(_)));
    assert!(harness.assistant.tracked_requests().is_empty());
}

#[tokio::test]
async fn service_error_is_surfaced_and_recorded() {
    let harness = harness();
    harness
        .assistant
        .enqueue(MockResult::error(ServiceError::Remote(
            "proxy",
            "Claude API error: 529".to_string(),
        )));

    let err = harness
        .orchestrator
        .submit("Design a shaft")
        .await
        .expect_err("service error");

    assert_eq!(err.to_string(), "proxy error: Claude API error: 529");
    assert_eq!(
        harness.orchestrator.stage(),
        StageStatus {
            stage: Stage::Error,
            message: "proxy error: Claude API error: 529".to_string(),
        }
    );
    assert_eq!(
        harness.orchestrator.last_error().await.as_deref(),
        Some("proxy error: Claude API error: 529")
    );
    assert!(harness.orchestrator.conversation().await.is_empty());
    assert_eq!(
        harness.orchestrator.transcript().await,
        vec![
            ConversationTurn::user("Design a shaft"),
            ConversationTurn::assistant("Error: proxy error: Claude API error: 529"),
        ]
    );
}

#[tokio::test]
async fn failed_runs_keep_assistant_history_alternating() {
    let harness = harness();
    harness
        .assistant
        .enqueue(MockResult::error(ServiceError::Remote(
            "proxy",
            "boom".to_string(),
        )))
        .enqueue_text("A 40 mm flange.")
        .enqueue(MockResult::error(ServiceError::Remote(
            "proxy",
            "overloaded".to_string(),
        )))
        .enqueue_text("A 40 mm flange with four holes.");
    harness.auxiliary.enqueue_text(SUMMARY_REPLY);

    harness
        .orchestrator
        .submit("first")
        .await
        .expect_err("analysis fails");
    harness
        .orchestrator
        .submit("second")
        .await
        .expect_err("authoring fails");
    harness.orchestrator.wait_for_auxiliary().await;

    let requests = harness.assistant.tracked_requests();
    assert!(requests[1].conversation_history.is_empty());
    assert_eq!(
        harness.orchestrator.conversation().await,
        vec![
            ConversationTurn::user("second"),
            ConversationTurn::assistant("A 40 mm flange."),
        ]
    );

    harness
        .orchestrator
        .submit("third")
        .await
        .expect_err("authoring queue is empty");
    let roles: Vec<Role> = harness.assistant.tracked_requests()[3]
        .conversation_history
        .iter()
        .map(|turn| turn.role)
        .collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);

    assert_eq!(
        harness.orchestrator.transcript().await[..5],
        [
            ConversationTurn::user("first"),
            ConversationTurn::assistant("Error: proxy error: boom"),
            ConversationTurn::user("second"),
            ConversationTurn::assistant("A 40 mm flange."),
            ConversationTurn::assistant("Error: proxy error: overloaded"),
        ]
    );
    harness.orchestrator.wait_for_auxiliary().await;
}

#[tokio::test]
async fn exhausted_retries_surface_last_error() {
    let harness = harness();
    harness
        .assistant
        .enqueue_text("A plate.")
        .enqueue_text("```python\none()\n```")
        .enqueue_text("```python\ntwo()\n```")
        .enqueue_text("```python\nthree()\n```");
    harness.auxiliary.enqueue_text(SUMMARY_REPLY);
    harness
        .executor
        .enqueue_failure("first")
        .enqueue_failure("second")
        .enqueue_failure("last");

    let err = harness
        .orchestrator
        .submit("Design a plate")
        .await
        .expect_err("exhausted");

    assert_eq!(err.to_string(), "last");
    assert_eq!(harness.executor.tracked_requests().len(), 3);
    // analysis, authoring and two repairs
    assert_eq!(harness.assistant.tracked_requests().len(), 4);
    assert_eq!(harness.orchestrator.stage().stage, Stage::Error);
    assert_eq!(
        harness.orchestrator.last_error().await.as_deref(),
        Some("last")
    );
    assert_eq!(
        harness.orchestrator.code().await,
        format!("{PREAMBLE}\nthree()\n")
    );
    harness.orchestrator.wait_for_auxiliary().await;
}

#[tokio::test]
async fn regenerate_runs_hand_edited_code() {
    let harness = harness();

    let edited = format!("{PREAMBLE}\nmsp.add_circle((0, 0), 5)");
    harness
        .orchestrator
        .set_code(edited.clone())
        .expect("not busy");
    harness.executor.enqueue(drawing_response());

    let drawing = harness.orchestrator.regenerate().await.expect("drawing");

    assert_eq!(drawing.stats.entity_count, 1);
    assert_eq!(harness.executor.tracked_requests()[0].code, edited);
    assert!(harness.assistant.tracked_requests().is_empty());
    assert_eq!(
        harness.orchestrator.execution_log().await,
        vec![
            "Attempt 1/3: Executing code...".to_string(),
            "Success: Generated 1 entities in 1 layers".to_string(),
        ]
    );
}

#[tokio::test]
async fn regenerate_before_submit_runs_preamble() {
    let harness = harness();
    assert_eq!(harness.orchestrator.code().await, format!("{PREAMBLE}\n"));
    harness.executor.enqueue(drawing_response());

    let drawing = harness.orchestrator.regenerate().await.expect("drawing");

    assert_eq!(drawing.attempts, 1);
    let executed = harness.executor.tracked_requests();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].code, format!("{PREAMBLE}\n"));
    assert_eq!(harness.orchestrator.stage().stage, Stage::Success);
}

#[tokio::test]
async fn finished_auxiliary_tasks_are_reaped() {
    let harness = harness();
    for _ in 0..2 {
        harness
            .assistant
            .enqueue_text("A 10 mm disc.")
            .enqueue_text("```python\ndraw()\n```");
        harness.auxiliary.enqueue_text(SUMMARY_REPLY);
        harness.executor.enqueue(drawing_response());
    }

    harness.orchestrator.submit("Design a disc").await.expect("drawing");
    timeout(Duration::from_secs(5), async {
        while harness.orchestrator.design_summary().is_none() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("design summary delivered");
    tokio::task::yield_now().await;

    harness.orchestrator.submit("Design a disc").await.expect("drawing");
    assert_eq!(harness.orchestrator.pending_auxiliary().await, 1);

    harness.orchestrator.wait_for_auxiliary().await;
    assert_eq!(harness.orchestrator.pending_auxiliary().await, 0);
}

#[tokio::test]
async fn download_offers_current_drawing() {
    let harness = harness();
    assert!(harness.orchestrator.download().await.is_none());

    harness
        .orchestrator
        .set_code(format!("{PREAMBLE}\ndraw()"))
        .expect("not busy");
    harness.executor.enqueue(drawing_response());
    harness.orchestrator.regenerate().await.expect("drawing");

    let download = harness.orchestrator.download().await.expect("download");
    assert_eq!(download.content_type, DXF_CONTENT_TYPE);
    assert_eq!(download.content, DRAWING);
    let millis = download
        .filename
        .strip_prefix("engineering-cad-")
        .and_then(|rest| rest.strip_suffix(".dxf"))
        .expect("timestamped filename");
    assert!(millis.parse::<i64>().expect("millis") > 0);
}

#[tokio::test]
async fn partial_illustration_failures_keep_delivered_views() {
    let assistant = Arc::new(MockAssistant::new());
    let auxiliary = Arc::new(MockAssistant::new());
    let executor = Arc::new(MockExecutor::new());
    let illustrator = Arc::new(MockIllustrator::new());
    let (sender, mut events) = mpsc::unbounded_channel();

    let orchestrator = Orchestrator::new(
        SessionParams::new()
            .preamble(PREAMBLE)
            .build(assistant.clone(), executor.clone()),
        Arc::new(sender),
    )
    .with_auxiliary_assistant(auxiliary.clone())
    .with_design_summary(false)
    .with_illustrator(illustrator.clone());

    assistant
        .enqueue_text("A bracket.")
        .enqueue_text("```python\ndraw()\n```");
    executor.enqueue(drawing_response());
    auxiliary.enqueue_text(
        "```json\n[\"iso\", \"sketch\", \"front\", \"top\", \"render\"]\n```",
    );
    let image = IllustrationResponse {
        success: true,
        image: Some("aGVsbG8=".to_string()),
        error: None,
    };
    illustrator
        .enqueue(image.clone())
        .enqueue(image.clone())
        .enqueue(image)
        .enqueue_for(
            ViewType::Front,
            MockResult::error(ServiceError::Remote("proxy", "quota".to_string())),
        )
        .enqueue_for(
            ViewType::Top,
            IllustrationResponse {
                success: false,
                image: None,
                error: Some("No image generated".to_string()),
            },
        );

    orchestrator.submit("Design a bracket").await.expect("drawing");
    orchestrator.wait_for_auxiliary().await;

    let delivered = orchestrator.illustrations();
    assert_eq!(delivered.len(), 3);
    assert!(delivered.iter().all(|view| view.image == b"hello".to_vec()));
    let mut views: Vec<_> = delivered.iter().map(|view| view.view_type).collect();
    views.sort_by_key(|view| view.label());
    assert_eq!(
        views,
        vec![
            ViewType::Rendering,
            ViewType::EngineeringSketch,
            ViewType::Isometric,
        ]
    );

    let prompts: Vec<_> = illustrator
        .tracked_requests()
        .into_iter()
        .map(|request| (request.view_type, request.prompt))
        .collect();
    assert_eq!(prompts.len(), 5);
    assert!(prompts.contains(&(ViewType::Front, "front".to_string())));

    let events = drain(&mut events);
    assert!(events.contains(&PipelineEvent::IllustrationsSettled {
        delivered: 3,
        failed: 2,
    }));
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, PipelineEvent::IllustrationFailed { .. }))
            .count(),
        2
    );
}
