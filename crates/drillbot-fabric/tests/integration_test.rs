//! End-to-end flow: control surface -> coordinator -> observer -> events back.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use drillbot_config::PageConfig;
use drillbot_fabric::{ControlSurface, Coordinator, ObserverSpec, ObserverSupervisor, UsageQuota};
use drillbot_protocols::{keys, BotMode, KvStore, Visibility};
use drillbot_runloop::{ControllerSettings, MemoryPage, ScriptSolver, SolverRegistry};
use drillbot_store::MemoryStore;

#[tokio::test(start_paused = true)]
async fn test_surface_start_solves_and_reports_answer() {
    let store = Arc::new(MemoryStore::new());
    let coordinator = Arc::new(Coordinator::new(store.clone(), Duration::from_secs(1)));
    coordinator.install_defaults().await.unwrap();

    let page = MemoryPage::new();
    page.set_visibility(&PageConfig::default().surface_selector, Visibility::Visible);
    page.push_evaluate_result(json!({
        "acted": true,
        "answer": "12",
        "steps": [{"type": "type", "text": "12"}],
        "awaitConfirmation": true
    }));

    let spec = ObserverSpec {
        page: page.clone(),
        store: store.clone(),
        solvers: SolverRegistry::new().with(
            BotMode::FactorsPrimes,
            Arc::new(ScriptSolver::new("factors", "return window.__plan;")),
        ),
        settings: ControllerSettings::default(),
    };
    let cancel = CancellationToken::new();
    let supervisor = tokio::spawn(
        ObserverSupervisor::new(spec, coordinator.clone(), Duration::from_secs(1))
            .run(cancel.clone()),
    );
    tokio::time::sleep(Duration::from_millis(10)).await;

    let mut events = coordinator.subscribe();
    let mut surface = ControlSurface::open(
        coordinator.clone(),
        page.clone(),
        UsageQuota::new(store.clone(), 5),
        30,
    )
    .await
    .unwrap();

    surface.set_race_mode(true).await;
    surface.select_mode(BotMode::FactorsPrimes);
    surface.toggle_running().await;
    assert!(surface.view().running);

    tokio::time::sleep(Duration::from_millis(200)).await;
    while let Ok(event) = events.try_recv() {
        surface.handle_event(event);
    }

    assert_eq!(surface.view().last_answer.as_deref(), Some("12"));
    assert!(surface.view().enter_prompt);
    assert_eq!(page.typed_keys(), ["1", "2"]);
    assert!(page.evaluations()[0].ends_with("})(true)"));
    assert!(store.get_bool(keys::IS_RUNNING).await.unwrap());

    surface.toggle_running().await;
    assert!(!surface.view().running);
    assert!(!surface.view().enter_prompt);

    cancel.cancel();
    supervisor.await.unwrap();
}
