use super::*;
use crate::test_support::{ScriptedTransport, client_over, reply, store_with, unauthorized};

fn persona_json() -> Value {
    json!({
        "id": 7,
        "name": "Wry Technologist",
        "description": "Dry humor, short sentences.",
        "content_count": 2,
        "vocabulary_complexity": 7,
        "tone": "sardonic",
        "formality_level": 3,
        "is_active": true,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-02T10:00:00Z"
    })
}

#[test]
fn unknown_attributes_are_kept_opaque() {
    let persona: Persona = serde_json::from_value(persona_json()).unwrap();

    assert_eq!(persona.id, 7);
    assert_eq!(persona.display_name(), "Wry Technologist");
    assert_eq!(persona.content_count, Some(2));
    assert_eq!(persona.attribute("tone"), Some(&json!("sardonic")));
    assert_eq!(persona.attribute("vocabulary_complexity"), Some(&json!(7)));
    assert!(persona.attribute("name").is_none());

    let back = serde_json::to_value(&persona).unwrap();
    assert_eq!(back, persona_json());
}

#[test]
fn set_field_routes_typed_and_opaque_keys() {
    let mut persona: Persona = serde_json::from_value(persona_json()).unwrap();

    persona.set_field("name", json!("Renamed")).unwrap();
    persona.set_field("is_active", json!(false)).unwrap();
    persona.set_field("humor_sarcasm_usage", json!(9)).unwrap();

    assert_eq!(persona.name.as_deref(), Some("Renamed"));
    assert_eq!(persona.is_active, Some(false));
    assert_eq!(persona.attribute("humor_sarcasm_usage"), Some(&json!(9)));
}

#[test]
fn set_field_rejects_server_managed_fields() {
    let mut persona: Persona = serde_json::from_value(persona_json()).unwrap();
    for key in ["id", "content_count", "created_at", "updated_at"] {
        assert!(matches!(persona.set_field(key, json!(1)), Err(ApiError::InvalidInput(_))));
    }
    assert!(persona.set_field("is_active", json!("yes")).is_err());
}

#[test]
fn missing_name_has_placeholder() {
    let persona: Persona = serde_json::from_value(json!({ "id": 1 })).unwrap();
    assert_eq!(persona.display_name(), "(unnamed)");
    assert!(persona.attributes.is_empty());
}

#[tokio::test]
async fn list_and_get_hit_persona_paths() {
    let transport = ScriptedTransport::new(vec![reply(200, json!([persona_json()])), reply(200, persona_json())]);
    let store = store_with(Some("acc"), Some("ref"));
    let personas = Personas::new(client_over(&transport, &store));

    let all = personas.list().await.unwrap();
    let one = personas.get(7).await.unwrap();

    assert_eq!(all.len(), 1);
    assert_eq!(one, all[0]);
    assert_eq!(transport.paths(), vec!["personas/", "personas/7/"]);
}

#[tokio::test]
async fn create_from_sample_trims_payload() {
    let transport = ScriptedTransport::new(vec![reply(201, persona_json())]);
    let store = store_with(Some("acc"), None);
    let personas = Personas::new(client_over(&transport, &store));

    let created = personas
        .create_from_sample("  Wry Technologist ", "\nI write short sentences.\n")
        .await
        .unwrap();

    assert_eq!(created.id, 7);
    let sent = &transport.requests()[0];
    assert_eq!(sent.method, reqwest::Method::POST);
    assert_eq!(
        sent.body,
        Some(json!({ "name": "Wry Technologist", "writing_sample": "I write short sentences." }))
    );
}

#[tokio::test]
async fn create_from_sample_rejects_blank_input_without_sending() {
    let transport = ScriptedTransport::new(vec![]);
    let store = store_with(None, None);
    let personas = Personas::new(client_over(&transport, &store));

    assert!(personas.create_from_sample(" ", "sample").await.is_err());
    assert!(personas.create_from_sample("name", "   ").await.is_err());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn update_puts_full_persona_with_unknown_attributes() {
    let transport = ScriptedTransport::new(vec![reply(200, persona_json())]);
    let store = store_with(Some("acc"), None);
    let personas = Personas::new(client_over(&transport, &store));

    let mut persona: Persona = serde_json::from_value(persona_json()).unwrap();
    persona.set_field("formality_level", json!(8)).unwrap();
    personas.update(&persona).await.unwrap();

    let sent = &transport.requests()[0];
    assert_eq!(sent.method, reqwest::Method::PUT);
    assert_eq!(sent.path, "personas/7/");
    let body = sent.body.as_ref().unwrap();
    assert_eq!(body["formality_level"], 8);
    assert_eq!(body["tone"], "sardonic");
}

#[tokio::test]
async fn delete_hits_detail_path() {
    let transport = ScriptedTransport::new(vec![reply(204, Value::Null)]);
    let store = store_with(Some("acc"), None);
    let personas = Personas::new(client_over(&transport, &store));

    personas.delete(7).await.unwrap();

    assert_eq!(transport.requests()[0].method, reqwest::Method::DELETE);
    assert_eq!(transport.paths(), vec!["personas/7/"]);
}

#[tokio::test]
async fn generate_content_posts_prompt_and_decodes_piece() {
    let transport = ScriptedTransport::new(vec![reply(
        201,
        json!({
            "id": 31,
            "title": "Why Rust",
            "content": "Because.",
            "persona": 7,
            "persona_name": "Wry Technologist",
            "status": "draft",
            "tags": [],
            "word_count": 1
        }),
    )]);
    let store = store_with(Some("acc"), None);
    let personas = Personas::new(client_over(&transport, &store));

    let piece = personas.generate_content(7, "Write about Rust").await.unwrap();

    assert_eq!(piece.id, 31);
    assert_eq!(piece.status.as_deref(), Some("draft"));
    assert_eq!(transport.paths(), vec!["personas/7/generate-content/"]);
    assert_eq!(transport.requests()[0].body, Some(json!({ "prompt": "Write about Rust" })));
}

#[tokio::test]
async fn generate_content_blank_prompt_sends_nothing() {
    let transport = ScriptedTransport::new(vec![]);
    let store = store_with(Some("acc"), None);
    let personas = Personas::new(client_over(&transport, &store));

    let err = personas.generate_content(7, "   ").await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn expired_session_refreshes_transparently() {
    let transport = ScriptedTransport::new(vec![
        unauthorized(),
        reply(200, json!({ "access": "acc-2" })),
        reply(200, json!([persona_json()])),
    ]);
    let store = store_with(Some("acc-1"), Some("ref-1"));
    let personas = Personas::new(client_over(&transport, &store));

    let all = personas.list().await.unwrap();

    assert_eq!(all.len(), 1);
}
