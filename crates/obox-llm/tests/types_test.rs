use obox_llm::{GenerateRequest, Role, Turn};
use serde_json::json;

#[test]
fn test_role_serialization() {
    assert_eq!(serde_json::to_value(Role::User).unwrap(), json!("user"));
    assert_eq!(serde_json::to_value(Role::Model).unwrap(), json!("model"));

    let role: Role = serde_json::from_value(json!("model")).unwrap();
    assert_eq!(role, Role::Model);
}

#[test]
fn test_turn_shape() {
    let turn = Turn::user("Xin chào");

    assert_eq!(
        serde_json::to_value(&turn).unwrap(),
        json!({ "role": "user", "parts": [{ "text": "Xin chào" }] })
    );
}

#[test]
fn test_set_text_replaces_first_part() {
    let mut turn = Turn::model("draft");
    turn.set_text("final");

    assert_eq!(turn.text(), "final");
    assert_eq!(turn.parts.len(), 1);
}

#[test]
fn test_request_body_shape() {
    let request = GenerateRequest::new(
        "gemini-2.0-flash",
        "Be concise.",
        vec![Turn::user("q1"), Turn::model("a1"), Turn::user("q2")],
    );

    let body = serde_json::to_value(request.to_body()).unwrap();

    assert_eq!(
        body,
        json!({
            "system_instruction": { "parts": [{ "text": "Be concise." }] },
            "contents": [
                { "role": "user", "parts": [{ "text": "q1" }] },
                { "role": "model", "parts": [{ "text": "a1" }] },
                { "role": "user", "parts": [{ "text": "q2" }] }
            ]
        })
    );
}

#[test]
fn test_request_key_override() {
    let request = GenerateRequest::new("m", "i", vec![]).with_api_key(Some("user-key".into()));

    assert_eq!(request.api_key.as_deref(), Some("user-key"));
}
