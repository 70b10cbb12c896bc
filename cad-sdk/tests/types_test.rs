use cad_sdk::{
    AssistantRequest, Bounds, ConversationTurn, EntityStats, ExecutionRequest, ExecutionResponse,
    ExecutionResult, IllustrationRequest, IllustrationResponse, ServiceError, ViewType,
};
use serde_json::json;

#[test]
fn assistant_request_uses_camel_case_wire_names() {
    let request = AssistantRequest::new("Design a bracket", "You are an engineer")
        .with_history(vec![
            ConversationTurn::user("hello"),
            ConversationTurn::assistant("hi"),
        ])
        .with_error_context("NameError: name 'msp' is not defined");

    assert_eq!(
        serde_json::to_value(&request).expect("serialize"),
        json!({
            "userMessage": "Design a bracket",
            "systemPrompt": "You are an engineer",
            "isCodeGen": false,
            "conversationHistory": [
                { "role": "user", "content": "hello" },
                { "role": "assistant", "content": "hi" },
            ],
            "errorContext": "NameError: name 'msp' is not defined",
        })
    );
}

#[test]
fn effective_user_message_folds_in_error_context() {
    let plain = AssistantRequest::new("draw it", "system");
    assert_eq!(plain.effective_user_message(), "draw it");

    let repair = plain.with_error_context("boom");
    assert_eq!(
        repair.effective_user_message(),
        "Previous code failed with error:\nboom\n\nPlease fix the code to address this error.\n\nOriginal request: draw it"
    );
}

#[test]
fn sampling_settings_follow_code_gen_mode() {
    let analysis = AssistantRequest::new("a", "s");
    assert_eq!((analysis.temperature(), analysis.max_tokens()), (0.7, 4000));

    let code_gen = analysis.with_code_gen(true);
    assert_eq!((code_gen.temperature(), code_gen.max_tokens()), (0.3, 8000));
}

#[test]
fn blank_requests_are_rejected_before_sending() {
    assert!(matches!(
        AssistantRequest::new("  ", "s").validate(),
        Err(ServiceError::InvalidInput(_))
    ));
    assert!(matches!(
        ExecutionRequest::new("").validate(),
        Err(ServiceError::InvalidInput(_))
    ));
    assert!(matches!(
        IllustrationRequest::new("", ViewType::Top).validate(),
        Err(ServiceError::InvalidInput(_))
    ));
}

#[test]
fn execution_request_asks_backend_for_single_attempt() {
    assert_eq!(
        serde_json::to_value(ExecutionRequest::new("print(1)")).expect("serialize"),
        json!({ "code": "print(1)", "max_retries": 1 })
    );
}

#[test]
fn execution_response_success_becomes_drawing() {
    let response: ExecutionResponse = serde_json::from_value(json!({
        "success": true,
        "dxf": "0\nEOF\n",
        "stats": {
            "entities": 12,
            "layers": 4,
            "bounds": { "min_x": 0.0, "min_y": 0.0, "max_x": 420.0, "max_y": 297.0 },
        },
        "output": "",
        "warnings": "",
        "execution_log": ["Attempt 1/1"],
        "attempts": 1,
    }))
    .expect("deserialize");

    assert_eq!(
        response.into_result().expect("usable"),
        ExecutionResult::Drawing {
            drawing: "0\nEOF\n".to_string(),
            stats: EntityStats {
                entity_count: 12,
                layer_count: 4,
                bounds: Some(Bounds {
                    min_x: 0.0,
                    min_y: 0.0,
                    max_x: 420.0,
                    max_y: 297.0,
                }),
            },
        }
    );
}

#[test]
fn execution_response_failure_keeps_raw_error() {
    let response: ExecutionResponse = serde_json::from_value(json!({
        "success": false,
        "error": "NameError: name 'foo' is not defined",
        "error_type": "NameError",
        "traceback": "Traceback (most recent call last): ...",
    }))
    .expect("deserialize");

    assert_eq!(
        response.into_result().expect("usable"),
        ExecutionResult::Failed {
            error: "NameError: name 'foo' is not defined".to_string(),
        }
    );

    let bare: ExecutionResponse = serde_json::from_value(json!({})).expect("deserialize");
    assert_eq!(
        bare.into_result().expect("usable"),
        ExecutionResult::Failed {
            error: "Unknown execution error".to_string(),
        }
    );
}

#[test]
fn execution_success_without_drawing_is_unusable() {
    let response = ExecutionResponse {
        success: true,
        ..ExecutionResponse::default()
    };
    assert!(matches!(
        response.into_result(),
        Err(ServiceError::Invariant("execution", _))
    ));
}

#[test]
fn entity_stats_display_includes_bounds() {
    let stats = EntityStats {
        entity_count: 3,
        layer_count: 2,
        bounds: Some(Bounds {
            min_x: -1.26,
            min_y: 0.0,
            max_x: 10.0,
            max_y: 5.54,
        }),
    };
    assert_eq!(stats.to_string(), "3 entities • 2 layers [-1.3, 0.0] → [10.0, 5.5]");
}

#[test]
fn illustration_wire_format() {
    assert_eq!(
        serde_json::to_value(IllustrationRequest::new("a bracket", ViewType::EngineeringSketch))
            .expect("serialize"),
        json!({ "prompt": "a bracket", "viewType": "engineering-sketch" })
    );

    let response: IllustrationResponse =
        serde_json::from_value(json!({ "success": true, "image": "aGVsbG8=" }))
            .expect("deserialize");
    assert_eq!(response.decode_image().expect("decoded"), b"hello".to_vec());

    let failed: IllustrationResponse =
        serde_json::from_value(json!({ "error": "No image generated" })).expect("deserialize");
    assert!(!failed.success);
    assert!(failed.decode_image().is_err());
}

#[test]
fn view_types_are_requested_in_fixed_order() {
    let labels: Vec<_> = ViewType::ALL.iter().map(|view| view.label()).collect();
    assert_eq!(
        labels,
        vec![
            "Isometric View",
            "Engineering Sketch",
            "Front View",
            "Top View",
            "3D Rendering",
        ]
    );
}
