use futures::StreamExt;
use obox_llm::{
    CancellationToken, ContentGenerator, GeminiClient, GenerateRequest, LlmError, Turn,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/gemini-2.0-flash:streamGenerateContent";

fn sse_body(texts: &[&str]) -> String {
    texts
        .iter()
        .map(|text| {
            let payload = json!({
                "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
            });
            format!("data: {}\r\n\r\n", payload)
        })
        .collect()
}

fn request() -> GenerateRequest {
    GenerateRequest::new("gemini-2.0-flash", "Be helpful.", vec![Turn::user("Hello")])
}

fn client_for(server: &MockServer, key: Option<&str>) -> GeminiClient {
    GeminiClient::new(key.map(String::from))
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_streams_fragments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("alt", "sse"))
        .and(query_param("key", "server-key"))
        .and(body_partial_json(json!({
            "system_instruction": { "parts": [{ "text": "Be helpful." }] },
            "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["Hi", " there"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("server-key"));
    let stream = client
        .generate_stream(request(), CancellationToken::new())
        .await
        .unwrap();
    let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;

    assert_eq!(fragments, vec!["Hi", " there"]);
}

#[tokio::test]
async fn test_request_key_overrides_client_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("key", "user-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(&["ok"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("server-key"));
    let stream = client
        .generate_stream(
            request().with_api_key(Some("user-key".into())),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(stream.count().await, 1);
}

#[tokio::test]
async fn test_missing_key_is_credential_error() {
    let server = MockServer::start().await;
    let client = client_for(&server, None);

    let result = client.generate_stream(request(), CancellationToken::new()).await;

    assert!(matches!(result, Err(LlmError::Credential(_))));
}

#[tokio::test]
async fn test_forbidden_is_credential_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("bad-key"));
    let result = client.generate_stream(request(), CancellationToken::new()).await;

    match result {
        Err(error) => assert!(error.is_credential(), "got {:?}", error),
        Ok(_) => panic!("Expected credential error"),
    }
}

#[tokio::test]
async fn test_invalid_key_400_is_credential_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid. Please pass a valid API key." }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("bad-key"));
    let result = client.generate_stream(request(), CancellationToken::new()).await;

    assert!(matches!(result, Err(LlmError::Credential(_))));
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("key"));
    let result = client.generate_stream(request(), CancellationToken::new()).await;

    assert!(matches!(result, Err(LlmError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_cancelled_before_send() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(&["late"])))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let client = client_for(&server, Some("key"));
    let result = client.generate_stream(request(), cancel).await;

    assert!(matches!(result, Err(LlmError::Cancelled)));
}
