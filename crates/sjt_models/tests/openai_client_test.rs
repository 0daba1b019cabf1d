use serde_json::json;
use sjt_core::{GenerateRequest, Message, Output};
use sjt_interface::{TextDriver, ToolDefinition, ToolUse};
use sjt_models::OpenAiChatClient;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cue_tool() -> ToolDefinition {
    ToolDefinition {
        name: "get_cues".to_string(),
        description: "Extract cues".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {"text": {"type": "string"}},
            "required": ["text"]
        }),
    }
}

#[tokio::test]
async fn test_generate_returns_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "  hello there  "},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiChatClient::new("test-key", "gpt-4o", format!("{}/v1", server.uri()));
    let response = client
        .generate(&GenerateRequest::system_user("sys", "hi"))
        .await
        .unwrap();

    assert_eq!(response.text().as_deref(), Some("hello there"));
}

#[tokio::test]
async fn test_generate_with_tools_parses_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_cues", "arguments": "{\"text\":\"stem\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .mount(&server)
        .await;

    let client = OpenAiChatClient::new("k", "gpt-4o", format!("{}/v1", server.uri()));
    let request = GenerateRequest::builder()
        .messages(vec![Message::user("analyse")])
        .build()
        .unwrap();
    let response = client
        .generate_with_tools(&request, &[cue_tool()])
        .await
        .unwrap();

    assert!(response.text().is_none());
    let calls = response.tool_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "get_cues");
    assert_eq!(calls[0].arguments, json!({"text": "stem"}));
    assert!(matches!(response.outputs[0], Output::ToolCalls(_)));

    let sent = &server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&sent.body).unwrap();
    assert_eq!(body["tools"][0]["function"]["name"], "get_cues");
    assert_eq!(body["tools"][0]["type"], "function");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = OpenAiChatClient::new("k", "gpt-4o", format!("{}/v1", server.uri()));
    let err = client
        .generate(&GenerateRequest::system_user("sys", "hi"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenAiChatClient::new("k", "gpt-4o", format!("{}/v1", server.uri()));
    assert!(
        client
            .generate(&GenerateRequest::system_user("sys", "hi"))
            .await
            .is_err()
    );
}
