//! End-to-end session runs through the production runtime.
//!
//! Each test scripts the gateway and the player's input, runs
//! [`Runtime::run`] to completion on a virtual clock, and checks what the
//! player saw. Invariants are checked by the driver at every render.

use std::{sync::Arc, time::Duration};

use taleforge_app::{App, Bridge, KeyInput, Lifecycle, Panel, Route, Runtime, SessionOrigin};
use taleforge_client::{
    ACCESS_TOKEN, ApiError, CredentialStore, EventsResponse, GameProgress, Message,
    NewFloorResponse, PlayerInfoResponse, PlayerInputRequest, PlayerInputResponse, SessionInfo,
};
use taleforge_core::{SessionMode, TypingConfig};
use taleforge_harness::{
    Call, Input, Invariant, InvariantRegistry, InvariantResult, MemoryCredentials,
    ScriptedGateway, SimDriver, SimHandle, ViewSnapshot, Violation,
};

const SESSION: u64 = 5;

struct Run {
    app: App,
    handle: SimHandle,
    credentials: Arc<MemoryCredentials>,
}

async fn play(gateway: &ScriptedGateway, origin: SessionOrigin, script: Vec<Input>) -> Run {
    play_on(gateway, origin, SimDriver::new(script)).await
}

async fn play_on(gateway: &ScriptedGateway, origin: SessionOrigin, driver: SimDriver) -> Run {
    let credentials = Arc::new(MemoryCredentials::with_access_token("token"));
    let handle = driver.handle();

    let app = App::new(SESSION, TypingConfig::default());
    let bridge = Bridge::new(gateway.clone(), credentials.clone());
    let app = Runtime::new(driver, app, bridge, origin).run().await.expect("run succeeds");

    Run { app, handle, credentials }
}

fn history(events: Vec<Message>, state: GameProgress) -> Result<EventsResponse, ApiError> {
    Ok(EventsResponse { events, state })
}

#[tokio::test]
async fn resumed_session_awaits_input() {
    let gateway = ScriptedGateway::new();
    gateway.push_history(history(
        vec![Message::narrator("You wake in a cell."), Message::player("look around")],
        GameProgress::InProgress,
    ));

    let script = vec![Input::AwaitMode(SessionMode::AwaitInput)];
    let run = play(&gateway, SessionOrigin::Resume, script).await;

    assert_eq!(run.app.session().history().len(), 2);
    assert_eq!(run.app.mode(), SessionMode::AwaitInput);
    assert_eq!(run.app.lifecycle(), Lifecycle::Closed);
    assert_eq!(gateway.calls(), vec![Call::FetchHistory(SESSION)]);
    assert!(run.handle.stopped());
    assert_eq!(run.handle.drained(), None);
}

#[tokio::test]
async fn submitted_action_ends_in_defeat() {
    let gateway = ScriptedGateway::new();
    gateway.push_history(history(
        vec![Message::narrator("A door.").with_suggested_actions(vec!["knock".into()])],
        GameProgress::InProgress,
    ));
    gateway.push_action(Ok(PlayerInputResponse {
        state: GameProgress::Completed,
        events: vec![Message::player("open the door"), Message::narrator("You are defeated.")],
        suggested_actions: None,
    }));

    let run = play(&gateway, SessionOrigin::Resume, vec![
        Input::AwaitMode(SessionMode::AwaitInput),
        Input::Text("open the door".into()),
        Input::Key(KeyInput::Enter),
        Input::AwaitMode(SessionMode::Completed),
    ])
    .await;

    assert_eq!(run.app.session().history().len(), 3);
    assert_eq!(run.app.mode(), SessionMode::Completed);
    assert_eq!(gateway.calls()[1], Call::SubmitAction(SESSION, PlayerInputRequest {
        action: "open the door".into(),
        suggested_actions: vec!["knock".into()],
    }));

    // The narration was revealed progressively before completing.
    let partial = run.handle.renders().iter().any(|view| {
        view.typing_text.as_deref().is_some_and(|text| !text.is_empty() && text.len() < 17)
    });
    assert!(partial);
}

#[tokio::test]
async fn rejected_action_reverts_with_inline_error() {
    let gateway = ScriptedGateway::new();
    gateway.push_history(history(vec![Message::narrator("A door.")], GameProgress::InProgress));
    gateway.push_action(Err(ApiError::from_response(400, r#"{"error":"Action too long"}"#)));

    let run = play(&gateway, SessionOrigin::Resume, vec![
        Input::AwaitMode(SessionMode::AwaitInput),
        Input::Text("wander aimlessly".into()),
        Input::Key(KeyInput::Enter),
        Input::AwaitMode(SessionMode::AwaitInput),
    ])
    .await;

    assert_eq!(run.app.input_error(), Some("Action too long"));
    assert_eq!(run.app.mode(), SessionMode::AwaitInput);
    assert_eq!(run.app.session().history().len(), 1);
    assert_eq!(run.app.draft(), "wander aimlessly");
}

#[tokio::test]
async fn continue_types_next_floor() {
    let gateway = ScriptedGateway::new();
    gateway.push_history(history(
        vec![Message::narrator("The floor falls silent.")],
        GameProgress::WaitingForNextFloor,
    ));
    gateway.push_floor(Ok(NewFloorResponse {
        narrative: "Stairs lead down.".into(),
        suggested_actions: vec!["descend".into()],
        state: GameProgress::InProgress,
    }));

    let run = play(&gateway, SessionOrigin::Resume, vec![
        Input::AwaitMode(SessionMode::AwaitContinue),
        Input::Key(KeyInput::Enter),
        Input::AwaitMode(SessionMode::Typing),
        Input::AwaitMode(SessionMode::AwaitInput),
    ])
    .await;

    assert_eq!(run.app.mode(), SessionMode::AwaitInput);
    assert_eq!(run.app.offered(), ["descend".to_string()]);
    assert_eq!(gateway.calls(), vec![Call::FetchHistory(SESSION), Call::AdvanceFloor(SESSION)]);
}

#[tokio::test]
async fn fresh_session_needs_no_history() {
    let gateway = ScriptedGateway::new();

    let run = play(
        &gateway,
        SessionOrigin::Fresh { narrative: "A new tale begins.".into() },
        vec![Input::AwaitMode(SessionMode::AwaitContinue)],
    )
    .await;

    assert_eq!(run.app.session().history().len(), 1);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn expired_token_clears_credentials_and_goes_to_login() {
    let gateway = ScriptedGateway::new();
    gateway.push_history(Err(ApiError::Unauthorized { status: 401 }));

    let run = play(&gateway, SessionOrigin::Resume, Vec::new()).await;

    assert_eq!(run.handle.navigations(), vec![(Route::Login, None)]);
    assert_eq!(run.credentials.get(ACCESS_TOKEN), None);
    assert!(run.handle.stopped());
}

#[tokio::test]
async fn unavailable_history_goes_home_with_reason() {
    let gateway = ScriptedGateway::new();
    gateway.push_history(Err(ApiError::from_response(503, "")));

    let run = play(&gateway, SessionOrigin::Resume, Vec::new()).await;

    assert_eq!(run.handle.navigations(), vec![(
        Route::Home,
        Some(taleforge_client::MODEL_UNAVAILABLE.to_owned())
    )]);
    assert_eq!(run.credentials.get(ACCESS_TOKEN).as_deref(), Some("token"));
}

#[tokio::test]
async fn reply_after_quit_is_discarded() {
    let gateway = ScriptedGateway::new().with_latency(50);
    gateway.push_history(history(vec![Message::narrator("Too late.")], GameProgress::InProgress));

    let run = play(&gateway, SessionOrigin::Resume, vec![Input::Key(KeyInput::Esc)]).await;

    // The request completed during shutdown but was never applied.
    assert_eq!(gateway.calls(), vec![Call::FetchHistory(SESSION)]);
    assert_eq!(run.app.lifecycle(), Lifecycle::Closed);
    assert!(run.app.session().history().is_empty());
    assert_eq!(run.app.mode(), SessionMode::Loading);
    assert_eq!(run.handle.drained(), Some(1));
}

#[tokio::test]
async fn coarse_clock_skips_frames_but_ends_on_full_text() {
    let gateway = ScriptedGateway::new();
    let driver = SimDriver::new([Input::AwaitMode(SessionMode::AwaitContinue)])
        .with_step(Duration::from_millis(100));

    let run = play_on(&gateway, SessionOrigin::Fresh { narrative: "Dust.".into() }, driver).await;

    // 30ms per character: 100ms reveals three, 200ms the rest.
    let frames: Vec<String> =
        run.handle.renders().into_iter().filter_map(|view| view.typing_text).collect();
    assert_eq!(frames, vec!["", "Dus", "Dust."]);
    assert_eq!(run.app.mode(), SessionMode::AwaitContinue);
}

/// Nothing is drawn once the view has been torn down.
struct DrawsWhileOpen;

impl Invariant for DrawsWhileOpen {
    fn name(&self) -> &'static str {
        "draws_while_open"
    }

    fn check(&self, state: &ViewSnapshot) -> InvariantResult {
        if state.lifecycle != Lifecycle::Closed {
            return Ok(());
        }
        Err(Violation { invariant: self.name(), message: "rendered a closed view".into() })
    }
}

#[tokio::test]
async fn panel_loads_beside_the_turn() {
    let gateway = ScriptedGateway::new();
    gateway.push_history(history(vec![Message::narrator("A door.")], GameProgress::InProgress));
    let info = PlayerInfoResponse {
        session_info: SessionInfo { theme: Some("Sunken Crypt".into()), current_floor: Some(2) },
        player_info: None,
    };
    gateway.push_player_info(Ok(info.clone()));

    let mut invariants = InvariantRegistry::standard();
    invariants.add(DrawsWhileOpen);
    let driver = SimDriver::new([
        Input::AwaitMode(SessionMode::AwaitInput),
        Input::Key(KeyInput::Tab),
        Input::Wait(Duration::from_millis(50)),
    ])
    .with_invariants(invariants);

    let run = play_on(&gateway, SessionOrigin::Resume, driver).await;

    assert_eq!(run.app.panel(), &Panel::Loaded(info));
    assert_eq!(run.app.mode(), SessionMode::AwaitInput);
    assert_eq!(gateway.calls(), vec![Call::FetchHistory(SESSION), Call::PlayerInfo(SESSION)]);
    assert!(run.handle.renders().iter().any(|view| view.panel == Panel::Loading));
}
