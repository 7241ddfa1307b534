use super::*;
use serde_json::json;

#[test]
fn test_start_command_wire_format() {
    let cmd: Command = serde_json::from_value(json!({
        "action": "start",
        "mode": "equivalent-fractions",
        "raceMode": true
    }))
    .unwrap();
    assert_eq!(
        cmd,
        Command::Start {
            mode: Some(BotMode::EquivalentFractions),
            race_mode: true
        }
    );
}

#[test]
fn test_start_command_without_mode() {
    let cmd: Command = serde_json::from_value(json!({"action": "start"})).unwrap();
    assert_eq!(
        cmd,
        Command::Start {
            mode: None,
            race_mode: false
        }
    );
}

#[test]
fn test_toggle_commands_wire_format() {
    let cmd = Command::ToggleFreezeTimer { enabled: true };
    let value = serde_json::to_value(&cmd).unwrap();
    assert_eq!(value, json!({"action": "toggleFreezeTimer", "enabled": true}));

    let cmd: Command =
        serde_json::from_value(json!({"action": "toggleSkipAnim", "enabled": false})).unwrap();
    assert_eq!(cmd, Command::ToggleSkipAnim { enabled: false });
    assert_eq!(cmd.name(), "toggleSkipAnim");
}

#[test]
fn test_ack_serialization_omits_missing_error() {
    let value = serde_json::to_value(Ack::ok()).unwrap();
    assert_eq!(value, json!({"success": true}));

    let value = serde_json::to_value(Ack::rejected("no mode")).unwrap();
    assert_eq!(value, json!({"success": false, "error": "no mode"}));
}

#[test]
fn test_event_wire_format() {
    let value = serde_json::to_value(Event::UpdateAnswer {
        answer: "3/4".to_string(),
    })
    .unwrap();
    assert_eq!(value, json!({"action": "updateAnswer", "answer": "3/4"}));

    let value = serde_json::to_value(Event::PressEnter).unwrap();
    assert_eq!(value, json!({"action": "pressEnter"}));

    let event: Event = serde_json::from_value(json!({"action": "enterDone"})).unwrap();
    assert_eq!(event, Event::EnterDone);
}

#[tokio::test]
async fn test_event_sink_delivers_logs() {
    let (sink, mut rx) = EventSink::channel(8);
    sink.log("hello");
    sink.error("boom");

    assert_eq!(
        rx.recv().await.unwrap(),
        Event::Log {
            message: "hello".to_string()
        }
    );
    assert_eq!(
        rx.recv().await.unwrap(),
        Event::Error {
            message: "boom".to_string()
        }
    );
}

#[test]
fn test_event_sink_without_subscribers_does_not_panic() {
    let (sink, rx) = EventSink::channel(8);
    drop(rx);
    sink.log("dropped");
}
