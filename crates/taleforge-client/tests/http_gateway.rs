//! HTTP gateway against a fake story server.

#![cfg(feature = "transport")]

use std::{sync::Arc, time::Duration};

use serde_json::json;
use taleforge_client::{
    ApiError, CharacterSheet, ErrorClass, GameProgress, Gateway, MODEL_UNAVAILABLE,
    MemoryCredentials, PlayerInputRequest, Role,
    http::{ClientConfig, HttpGateway},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn gateway(server: &MockServer, credentials: MemoryCredentials) -> HttpGateway {
    let config = ClientConfig {
        base_url: format!("{}/api", server.uri()),
        timeout: Duration::from_secs(5),
    };
    HttpGateway::new(&config, Arc::new(credentials)).expect("client builds")
}

#[tokio::test]
async fn history_is_fetched_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/session/7/get-events"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [
                {"role": "Narrator", "content": "You wake in a cell."},
                {"role": "Player", "content": "look around"}
            ],
            "state": "In Progress"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let history = gateway(&server, MemoryCredentials::with_access_token("secret"))
        .fetch_history(7)
        .await
        .expect("history");

    assert_eq!(history.state, GameProgress::InProgress);
    assert_eq!(history.events.len(), 2);
    assert_eq!(history.events[1].role(), Role::Player);
}

#[tokio::test]
async fn action_round_trips_offered_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session/3/player-input"))
        .and(body_json(json!({"action": "open the door", "suggested_actions": ["wait"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "In Progress",
            "events": [
                {"role": "Player", "content": "open the door"},
                {"role": "Narrator", "content": "It creaks open."}
            ],
            "suggested_actions": ["step through"]
        })))
        .mount(&server)
        .await;

    let input = PlayerInputRequest {
        action: "open the door".into(),
        suggested_actions: vec!["wait".into()],
    };
    let reply = gateway(&server, MemoryCredentials::new())
        .submit_action(3, &input)
        .await
        .expect("reply");

    assert_eq!(reply.events.len(), 2);
    assert_eq!(reply.suggested_actions, Some(vec!["step through".to_string()]));
}

#[tokio::test]
async fn new_floor_and_create_game() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session/3/new-floor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "narrative": "Stairs lead down.",
            "suggested_actions": ["descend"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/session/create-game"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "session_id": 11,
            "narrative": "A new tale begins."
        })))
        .mount(&server)
        .await;

    let gateway = gateway(&server, MemoryCredentials::new());
    let floor = gateway.advance_floor(3).await.expect("floor");
    assert_eq!(floor.state, GameProgress::InProgress);
    assert_eq!(floor.narrative, "Stairs lead down.");

    let sheet = CharacterSheet {
        player_name: "Ayla".into(),
        strength: 5,
        dexterity: 5,
        constitution: 5,
        intelligence: 5,
        wisdom: 5,
        charisma: 5,
    };
    let created = gateway.create_game(&sheet).await.expect("created");
    assert_eq!(created.session_id, 11);
}

#[tokio::test]
async fn sessions_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get-sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [
                {
                    "id": 1,
                    "theme": "Crypt",
                    "player_name": "Ayla",
                    "current_floor": 2,
                    "game_state": "Waiting for Next Floor"
                },
                {"id": 2, "player_name": "Bram", "current_floor": 1, "game_state": "Completed"}
            ]
        })))
        .mount(&server)
        .await;

    let listed = gateway(&server, MemoryCredentials::new()).list_sessions().await.expect("list");

    assert_eq!(listed.sessions.len(), 2);
    assert_eq!(listed.sessions[0].game_state, GameProgress::WaitingForNextFloor);
    assert_eq!(listed.sessions[1].theme, None);
}

#[tokio::test]
async fn listing_tolerates_unplayable_states() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get-sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [
                {"id": 5, "player_name": "Cai", "current_floor": 0, "game_state": "Player Creation"}
            ]
        })))
        .mount(&server)
        .await;

    let listed = gateway(&server, MemoryCredentials::new()).list_sessions().await.expect("list");

    assert_eq!(listed.sessions[0].game_state, GameProgress::Completed);
}

#[tokio::test]
async fn player_info_is_fetched_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/session/9/player-info"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_info": {"theme": "Sunken Crypt", "current_floor": 3},
            "player_info": {
                "player_name": "Ayla",
                "description": "A wandering cartographer.",
                "is_ready": true,
                "current_health": 4,
                "max_health": 10,
                "strength": 6,
                "dexterity": 7,
                "constitution": 4,
                "intelligence": 5,
                "wisdom": 3,
                "charisma": 5
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = gateway(&server, MemoryCredentials::with_access_token("secret"))
        .player_info(9)
        .await
        .expect("info");

    assert_eq!(info.session_info.current_floor, Some(3));
    let player = info.player_info.expect("character");
    assert_eq!(player.player_name.as_deref(), Some("Ayla"));
    assert!(player.is_ready);
    assert_eq!(player.attributes().count(), 6);
}

#[tokio::test]
async fn failures_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session/1/player-input"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Action too long"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/session/2/player-input"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/session/3/get-events"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/session/5/player-info"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/session/4/get-events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let gateway = gateway(&server, MemoryCredentials::new());
    let input = PlayerInputRequest { action: "x".into(), suggested_actions: Vec::new() };

    let rejected = gateway.submit_action(1, &input).await.unwrap_err();
    assert_eq!(rejected.class(), ErrorClass::Validation);
    assert_eq!(rejected.to_string(), "Action too long");

    let unavailable = gateway.submit_action(2, &input).await.unwrap_err();
    assert_eq!(unavailable.class(), ErrorClass::Server);
    assert_eq!(unavailable.to_string(), MODEL_UNAVAILABLE);

    let unauthorized = gateway.fetch_history(3).await.unwrap_err();
    assert_eq!(unauthorized, ApiError::Unauthorized { status: 401 });

    let missing = gateway.player_info(5).await.unwrap_err();
    assert_eq!(missing.class(), ErrorClass::Validation);

    let malformed = gateway.fetch_history(4).await.unwrap_err();
    assert!(matches!(malformed, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_no_response() {
    let config = ClientConfig {
        base_url: "http://127.0.0.1:1/api".into(),
        timeout: Duration::from_secs(2),
    };
    let gateway = HttpGateway::new(&config, Arc::new(MemoryCredentials::new())).expect("client");

    let err = gateway.list_sessions().await.unwrap_err();
    assert_eq!(err, ApiError::no_response());
    assert_eq!(err.class(), ErrorClass::Network);
}
