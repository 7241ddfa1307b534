//! End-to-end tests for the observer run loop.
//!
//! These drive the controller with real commands against an in-memory page
//! and a script solver, the same wiring the binary uses.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use drillbot_config::{Config, PageConfig};
use drillbot_protocols::{keys, BotMode, Command, Event, EventSink, KvStore, Visibility};
use drillbot_runloop::{
    AutomationController, ControllerSettings, MainWorldClock, ManualClock, MemoryPage,
    ScriptSolver, SolverRegistry, SKIP_ANIM_STYLE_ID,
};
use drillbot_store::MemoryStore;

// ============================================================================
// Test Helpers
// ============================================================================

fn surface() -> String {
    PageConfig::default().surface_selector
}

fn registry() -> SolverRegistry {
    SolverRegistry::new().with(
        BotMode::EquivalentFractions,
        Arc::new(ScriptSolver::new("fractions", "return window.__plan || null;")),
    )
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_acted_scenario() {
    let page = MemoryPage::new();
    page.set_visibility(&surface(), Visibility::Visible);
    page.add_element("#answer-3-4");
    page.push_evaluate_result(json!({
        "acted": true,
        "answer": "3/4",
        "steps": [{"type": "click", "selector": "#answer-3-4"}]
    }));

    let store = Arc::new(MemoryStore::new());
    let (events, mut rx) = EventSink::channel(64);
    let controller = AutomationController::new(
        page.clone(),
        store.clone(),
        registry(),
        events,
        &ControllerSettings::from(&Config::default()),
    );

    let ack = controller
        .handle(Command::Start {
            mode: Some(BotMode::EquivalentFractions),
            race_mode: false,
        })
        .await;
    assert!(ack.success);

    tokio::time::sleep(Duration::from_millis(100)).await;

    let events = drain(&mut rx);
    assert!(events.contains(&Event::UpdateAnswer {
        answer: "3/4".to_string()
    }));
    assert_eq!(page.dispatched().len(), 3);
    assert!(!controller.runner().lock().is_held());

    controller.handle(Command::Stop).await;
}

#[tokio::test(start_paused = true)]
async fn test_no_surface_scenario() {
    let page = MemoryPage::new();
    page.set_visibility(&surface(), Visibility::Hidden);

    let store = Arc::new(MemoryStore::new());
    let (events, _rx) = EventSink::channel(64);
    let controller = AutomationController::new(
        page.clone(),
        store,
        registry(),
        events,
        &ControllerSettings::default(),
    );

    controller
        .handle(Command::Start {
            mode: Some(BotMode::EquivalentFractions),
            race_mode: false,
        })
        .await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(page.evaluations().is_empty());
    assert!(page.dispatched().is_empty());
    controller.handle(Command::Stop).await;
}

#[tokio::test(start_paused = true)]
async fn test_failing_script_keeps_loop_alive() {
    let page = MemoryPage::new();
    page.set_visibility(&surface(), Visibility::Visible);
    for _ in 0..10 {
        page.push_evaluate_error("ReferenceError: numerator is not defined");
    }

    let (events, mut rx) = EventSink::channel(256);
    let controller = AutomationController::new(
        page.clone(),
        Arc::new(MemoryStore::new()),
        registry(),
        events,
        &ControllerSettings::default(),
    );
    controller
        .handle(Command::Start {
            mode: Some(BotMode::EquivalentFractions),
            race_mode: true,
        })
        .await;

    for _ in 0..10 {
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(!controller.runner().lock().is_held());
    }
    controller.handle(Command::Stop).await;

    let failures = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, Event::Log { message } if message.starts_with("❌")))
        .count();
    assert_eq!(failures, 10);
    assert!(page.evaluations().len() >= 10);
    assert!(page.evaluations()[0].ends_with("})(true)"));
}

#[tokio::test(start_paused = true)]
async fn test_resume_after_navigation() {
    let store = Arc::new(MemoryStore::new());
    let (events, _rx) = EventSink::channel(64);

    let page = MemoryPage::new();
    let first = AutomationController::new(
        page.clone(),
        store.clone(),
        registry(),
        events.clone(),
        &ControllerSettings::default(),
    );
    first
        .handle(Command::Start {
            mode: Some(BotMode::EquivalentFractions),
            race_mode: true,
        })
        .await;
    first.handle(Command::ToggleSkipAnim { enabled: true }).await;
    store
        .set(vec![(keys::SKIP_ANIM.to_string(), json!(true))])
        .await
        .unwrap();

    // The document goes away; a fresh controller takes over.
    first.shutdown();
    page.navigate();
    assert_eq!(page.style_count(SKIP_ANIM_STYLE_ID), 0);

    let second = AutomationController::initialize(
        page.clone(),
        store.clone(),
        registry(),
        events,
        &ControllerSettings::default(),
    )
    .await;
    assert!(second.run_state().is_running());
    assert!(second.run_state().race_mode());
    assert_eq!(page.style_count(SKIP_ANIM_STYLE_ID), 1);
    second.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_freeze_round_trip() {
    let page = MemoryPage::new();
    let clock = Arc::new(MainWorldClock::new(ManualClock::new(1_700_000_000_000.0)));
    page.attach_main_world(clock.clone());

    let (events, _rx) = EventSink::channel(64);
    let controller = AutomationController::new(
        page.clone(),
        Arc::new(MemoryStore::new()),
        registry(),
        events,
        &ControllerSettings::default(),
    );

    controller
        .handle(Command::ToggleFreezeTimer { enabled: true })
        .await;
    let frozen = clock.date_now();
    clock.source().advance_ms(10_000.0);
    assert_eq!(clock.date_now(), frozen);

    controller
        .handle(Command::ToggleFreezeTimer { enabled: false })
        .await;
    assert_eq!(clock.date_now(), frozen + 10_000.0);
}
