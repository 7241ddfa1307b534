use super::*;
use drillbot_protocols::{BotMode, Command, Event, TransportError};
use drillbot_runloop::MemoryPage;
use drillbot_store::MemoryStore;

fn spec(page: Arc<MemoryPage>, store: Arc<MemoryStore>) -> ObserverSpec {
    ObserverSpec {
        page,
        store,
        solvers: SolverRegistry::new(),
        settings: ControllerSettings::default(),
    }
}

fn start() -> Command {
    Command::Start {
        mode: Some(BotMode::FactorsPrimes),
        race_mode: false,
    }
}

#[tokio::test(start_paused = true)]
async fn test_host_serves_commands() {
    let page = MemoryPage::new();
    let store = Arc::new(MemoryStore::new());
    let coordinator = Coordinator::new(store.clone(), Duration::from_secs(1));

    let host = ObserverHost::spawn(&spec(page, store), &coordinator)
        .await
        .unwrap();
    assert_eq!(host.document_id(), "memory-0");

    let ack = coordinator.send_command(start()).await.unwrap();
    assert!(ack.success);
    assert!(host.controller().run_state().is_running());

    let rejected = coordinator
        .send_command(Command::Start {
            mode: None,
            race_mode: false,
        })
        .await
        .unwrap();
    assert!(!rejected.success);

    host.shutdown().await;
    assert!(matches!(
        coordinator.send_command(Command::Stop).await,
        Err(TransportError::NoReceiver)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_recreates_observer_after_navigation() {
    let page = MemoryPage::new();
    let store = Arc::new(MemoryStore::new());
    let coordinator = Arc::new(Coordinator::new(store.clone(), Duration::from_secs(1)));
    let supervisor = ObserverSupervisor::new(
        spec(page.clone(), store.clone()),
        coordinator.clone(),
        Duration::from_millis(1000),
    );

    let cancel = CancellationToken::new();
    let task = tokio::spawn(supervisor.run(cancel.clone()));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(coordinator.has_observer());

    assert!(coordinator.send_command(start()).await.unwrap().success);

    let mut events = coordinator.subscribe();
    page.navigate();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // The new observer resumed from the durable mirror without a new start.
    assert!(coordinator.has_observer());
    let mut resumed = false;
    while let Ok(event) = events.try_recv() {
        if event
            == (Event::Log {
                message: "🔄 Resuming: Factors Mode".to_string(),
            })
        {
            resumed = true;
        }
    }
    assert!(resumed);
    let ack = coordinator.send_command(Command::Stop).await.unwrap();
    assert!(ack.success);

    cancel.cancel();
    task.await.unwrap();
    assert!(!coordinator.has_observer());
}
