//! `drillbot status` and `drillbot quota` handlers.

use tracing::info;

use drillbot_config::Config;
use drillbot_fabric::UsageQuota;
use drillbot_protocols::{KvStore, PersistedFlags, keys};

use crate::cli::QuotaAction;
use crate::cmd_run::open_store;

/// Print persisted flags and the remaining quota.
pub(crate) async fn status(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (store, _) = open_store(config).await?;
    let flags = PersistedFlags::load(store.as_ref()).await?;
    let stealth = store.get_bool(keys::STEALTH_MODE).await?;
    let quota = UsageQuota::new(store, config.quota.max_uses);

    let mode = flags
        .bot_mode
        .map(|m| m.label().to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{:<22} {}", "Running", flags.is_running);
    println!("{:<22} {}", "Mode", mode);
    println!("{:<22} {}", "Race mode", flags.race_mode);
    println!("{:<22} {}", "Animation skipper", flags.skip_anim);
    println!("{:<22} {}", "Timer freeze", flags.freeze_timer);
    println!("{:<22} {}", "Stealth", stealth);
    println!(
        "{:<22} {}/{}",
        "Privileged uses left",
        quota.remaining().await?,
        quota.max_uses()
    );
    Ok(())
}

pub(crate) async fn handle_quota_command(
    action: QuotaAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        QuotaAction::Reset => {
            let (store, _) = open_store(config).await?;
            let quota = UsageQuota::new(store, config.quota.max_uses);
            quota.reset().await?;
            info!("Privileged-use counter reset");
            println!("Quota reset: {} uses available", quota.max_uses());
            Ok(())
        }
    }
}
