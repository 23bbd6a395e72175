// Tests for the gift-suggestion client against a mocked chat-completion
// endpoint.
use mockito::Server;
use noubli::client::{GiftClient, GiftError};
use noubli::config::Config;
use noubli::model::Contact;
use serde_json::json;

fn config_for(server_url: &str) -> Config {
    Config {
        api_key: "sk-test123".to_string(),
        api_url: format!("{}/v1/chat/completions", server_url),
        ..Config::default()
    }
}

fn marie() -> Contact {
    Contact {
        id: "7".to_string(),
        name: "Marie".to_string(),
        birthday: Some("--03-17".to_string()),
        notes: Some("loves watercolor painting".to_string()),
    }
}

#[tokio::test]
async fn test_successful_response_parses_ideas_and_drops_malformed() {
    let mut server = Server::new_async().await;
    let body = json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Name: Book\nDescription: A novel\n---\nDescription: missing name"
            },
            "finish_reason": "stop"
        }]
    });

    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = GiftClient::new(&config_for(&server.url())).unwrap();
    let ideas = client.suggest_gifts(&marie(), "Birthday").await.unwrap();

    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0].name, "Book");
    assert_eq!(ideas[0].description, "A novel");
    assert_eq!(
        ideas[0].shopping_link.as_deref(),
        Some("https://www.amazon.com/s?k=Book")
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_maps_to_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let client = GiftClient::new(&config_for(&server.url())).unwrap();
    let err = client.suggest_gifts(&marie(), "Birthday").await.unwrap_err();

    match err {
        GiftError::Api { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_in_band_error_object_maps_to_service_error() {
    let mut server = Server::new_async().await;
    let body = json!({
        "error": { "message": "You exceeded your current quota", "type": "insufficient_quota" }
    });
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = GiftClient::new(&config_for(&server.url())).unwrap();
    let err = client.suggest_gifts(&marie(), "Birthday").await.unwrap_err();

    match err {
        GiftError::Service(message) => assert!(message.contains("quota")),
        other => panic!("expected Service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices_maps_to_empty_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "choices": [] }).to_string())
        .create_async()
        .await;

    let client = GiftClient::new(&config_for(&server.url())).unwrap();
    let err = client.suggest_gifts(&marie(), "Birthday").await.unwrap_err();
    assert!(matches!(err, GiftError::EmptyResponse));
}

#[tokio::test]
async fn test_undecodable_body_maps_to_network_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("definitely not json")
        .create_async()
        .await;

    let client = GiftClient::new(&config_for(&server.url())).unwrap();
    let err = client.suggest_gifts(&marie(), "Birthday").await.unwrap_err();
    assert!(matches!(err, GiftError::Network(_)));
}

#[tokio::test]
async fn test_invalid_key_is_rejected_before_any_request() {
    let mut server = Server::new_async().await;
    // Zero expected hits: a bad key must never reach the network.
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    for bad_key in ["", "   ", "not-a-service-key"] {
        let config = Config {
            api_key: bad_key.to_string(),
            api_url: format!("{}/v1/chat/completions", server.url()),
            ..Config::default()
        };
        match GiftClient::new(&config) {
            Err(GiftError::InvalidApiKey) => {}
            other => panic!("key '{}' should be rejected, got {:?}", bad_key, other.err()),
        }
    }
    mock.assert_async().await;
}
