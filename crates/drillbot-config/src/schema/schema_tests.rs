use super::*;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.scheduler.interval_ms, 700);
    assert!(config.scheduler.cycle_timeout_ms.is_none());
    assert_eq!(config.input.click_settle_ms, 30);
    assert_eq!(config.input.key_release_ms, 20);
    assert_eq!(config.page.surface_selector, "playing-screen");
    assert_eq!(config.page.hidden_class, "hidden");
    assert_eq!(config.surface.log_capacity, 30);
    assert_eq!(config.quota.max_uses, 5);
    assert!(config.solvers.is_empty());
}

#[test]
fn test_duration_helpers() {
    let config = Config::default();
    assert_eq!(config.scheduler.interval(), Duration::from_millis(700));
    assert_eq!(config.scheduler.cycle_timeout(), None);
    assert_eq!(config.input.click_settle(), Duration::from_millis(30));
    assert_eq!(config.input.key_release(), Duration::from_millis(20));
    assert_eq!(config.browser.navigation_poll(), Duration::from_secs(1));
}

#[test]
fn test_partial_section_keeps_defaults() {
    let config: Config = toml::from_str(
        r#"
        [scheduler]
        cycle_timeout_ms = 4000
        "#,
    )
    .unwrap();
    assert_eq!(config.scheduler.interval_ms, 700);
    assert_eq!(config.scheduler.cycle_timeout(), Some(Duration::from_secs(4)));
}

#[test]
fn test_solvers_and_actions() {
    let config: Config = toml::from_str(
        r#"
        [solvers]
        equivalent-fractions = "solvers/fractions.js"

        [[privileged_actions]]
        name = "complete-phase"
        script = "actions/phase.js"
        "#,
    )
    .unwrap();
    assert_eq!(
        config.solvers["equivalent-fractions"],
        PathBuf::from("solvers/fractions.js")
    );
    assert_eq!(config.privileged_actions.len(), 1);
    assert_eq!(config.privileged_actions[0].name, "complete-phase");
}
