//! `drillbot run`: attach to the browser and drive the control console.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use drillbot_config::{Config, ConfigLoader};
use drillbot_fabric::{
    ControlSurface, Coordinator, ObserverSpec, ObserverSupervisor, ScriptAction, UsageQuota,
};
use drillbot_page_cdp::CdpPage;
use drillbot_protocols::KvStore;
use drillbot_runloop::{ControllerSettings, SolverRegistry};
use drillbot_store::FileStore;

use crate::console::{self, ConsoleCommand};

/// Open the durable store, installing defaults when it is new.
pub(crate) async fn open_store(
    config: &Config,
) -> Result<(Arc<dyn KvStore>, bool), Box<dyn std::error::Error>> {
    let path = ConfigLoader::expand_path(&config.store.path);
    let store = FileStore::open(&path).await?;
    let created = store.was_created();
    info!("State store: {}", path.display());
    let store: Arc<dyn KvStore> = Arc::new(store);
    Ok((store, created))
}

pub(crate) async fn run(
    config: Config,
    endpoint: Option<String>,
    url_contains: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting drillbot v{}", env!("CARGO_PKG_VERSION"));

    let (store, created) = open_store(&config).await?;
    let coordinator = Arc::new(Coordinator::new(
        store.clone(),
        config.surface.command_timeout(),
    ));
    if created {
        coordinator.install_defaults().await?;
        info!("Installed default flags");
    }

    let endpoint = endpoint.unwrap_or_else(|| config.browser.endpoint.clone());
    let url_contains = url_contains.or_else(|| config.browser.url_contains.clone());
    let page = Arc::new(CdpPage::attach(&endpoint, url_contains.as_deref()).await?);
    info!("Attached to page {} via {}", page.target_id(), endpoint);

    let scripts: HashMap<String, PathBuf> = config
        .solvers
        .iter()
        .map(|(mode, path)| (mode.clone(), ConfigLoader::expand_path(&path.to_string_lossy())))
        .collect();
    let solvers = SolverRegistry::from_scripts(&scripts)?;
    if solvers.modes().is_empty() {
        warn!("No solver scripts configured; the bot will find no problems");
    }

    let spec = ObserverSpec {
        page: page.clone(),
        store: store.clone(),
        solvers,
        settings: ControllerSettings::from(&config),
    };
    let supervisor = ObserverSupervisor::new(spec, coordinator.clone(), config.browser.navigation_poll());
    let cancel = CancellationToken::new();
    let supervisor_task = tokio::spawn(supervisor.run(cancel.clone()));

    let quota = UsageQuota::new(store.clone(), config.quota.max_uses);
    let mut surface =
        ControlSurface::open(coordinator.clone(), page.clone(), quota, config.surface.log_capacity)
            .await?;
    for action in &config.privileged_actions {
        let path = ConfigLoader::expand_path(&action.script.to_string_lossy());
        match ScriptAction::from_file(action.name.clone(), &path) {
            Ok(script) => surface.register_action(Arc::new(script)),
            Err(e) => warn!("Skipping action {}: {}: {}", action.name, path.display(), e),
        }
    }

    console_loop(&mut surface, &coordinator).await;

    info!("Shutting down");
    cancel.cancel();
    if let Err(e) = supervisor_task.await {
        warn!("Observer supervisor ended abnormally: {}", e);
    }
    Ok(())
}

async fn console_loop(surface: &mut ControlSurface, coordinator: &Coordinator) {
    let mut events = coordinator.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", console::HELP);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read console input: {}", e);
                        break;
                    }
                };
                match ConsoleCommand::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(ConsoleCommand::Quit)) => break,
                    Ok(Some(command)) => {
                        for out in console::apply(surface, command).await {
                            println!("{}", out);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    let before = surface.log().newest().map(str::to_string);
                    surface.handle_event(event);
                    for out in console::new_log_lines(surface, before.as_deref()) {
                        println!("{}", out);
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("Console skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }
}
