use super::*;
use std::sync::Arc;

use drillbot_config::InputConfig;
use drillbot_protocols::{EventSink, MouseEventKind};
use serde_json::json;

use crate::input::InputSimulator;
use crate::memory_page::{DispatchedEvent, MemoryPage};

struct Harness {
    page: Arc<MemoryPage>,
    input: InputSimulator,
    events: EventSink,
    rx: tokio::sync::broadcast::Receiver<Event>,
}

fn harness() -> Harness {
    let page = MemoryPage::new();
    let input = InputSimulator::new(page.clone(), &InputConfig::default());
    let (events, rx) = EventSink::channel(64);
    Harness {
        page,
        input,
        events,
        rx,
    }
}

impl Harness {
    async fn solve(&self, solver: &ScriptSolver, race_mode: bool) -> Result<bool, SolverError> {
        let ctx = SolverContext {
            race_mode,
            page: self.page.as_ref(),
            input: &self.input,
            events: &self.events,
        };
        solver.solve(&ctx).await
    }

    fn drain(&mut self) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            out.push(event);
        }
        out
    }
}

#[test]
fn test_plan_from_value() {
    assert_eq!(SolvePlan::from_value(Value::Null).unwrap(), None);
    assert_eq!(SolvePlan::from_value(json!(false)).unwrap(), None);
    assert!(SolvePlan::from_value(json!(true)).unwrap().unwrap().acted);
    assert!(matches!(
        SolvePlan::from_value(json!(42)),
        Err(SolverError::InvalidPlan(_))
    ));
    assert!(matches!(
        SolvePlan::from_value(json!({"steps": [{"type": "teleport"}]})),
        Err(SolverError::InvalidPlan(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_null_result_means_no_problem() {
    let h = harness();
    let solver = ScriptSolver::new("fractions", "return null;");
    assert!(!h.solve(&solver, false).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_expression_wraps_source_with_race_flag() {
    let h = harness();
    let solver = ScriptSolver::new("factors", "return raceMode;");
    h.solve(&solver, true).await.unwrap();

    let evaluated = h.page.evaluations();
    assert_eq!(evaluated.len(), 1);
    assert!(evaluated[0].starts_with("(async (raceMode) => {"));
    assert!(evaluated[0].contains("return raceMode;"));
    assert!(evaluated[0].ends_with("})(true)"));
}

#[tokio::test(start_paused = true)]
async fn test_plan_steps_run_in_order_and_emit_events() {
    let mut h = harness();
    h.page.add_element("#choice-1");
    h.page.push_evaluate_result(json!({
        "acted": true,
        "answer": "2/3",
        "steps": [
            {"type": "click", "selector": "#choice-1"},
            {"type": "type", "text": "23"},
            {"type": "delay", "ms": 10},
            {"type": "key", "key": "Enter"}
        ],
        "awaitConfirmation": true
    }));

    let solver = ScriptSolver::new("fractions", "/* plan */");
    assert!(h.solve(&solver, false).await.unwrap());

    let clicks = h
        .page
        .dispatched()
        .into_iter()
        .filter(|e| matches!(e, DispatchedEvent::Mouse { kind: MouseEventKind::Click, .. }))
        .count();
    assert_eq!(clicks, 1);
    assert_eq!(h.page.typed_keys(), ["2", "3", "Enter"]);
    assert_eq!(
        h.drain(),
        vec![
            Event::UpdateAnswer {
                answer: "2/3".to_string()
            },
            Event::PressEnter
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_resolved_confirmation_without_action() {
    let mut h = harness();
    h.page
        .push_evaluate_result(json!({"acted": false, "confirmationResolved": true}));

    let solver = ScriptSolver::new("fractions", "/* plan */");
    assert!(!h.solve(&solver, false).await.unwrap());
    assert_eq!(h.drain(), vec![Event::EnterDone]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_click_target_does_not_fail_the_plan() {
    let h = harness();
    h.page.push_evaluate_result(json!({
        "acted": true,
        "steps": [{"type": "click", "selector": "#gone"}, {"type": "key", "key": "1"}]
    }));

    let solver = ScriptSolver::new("factors", "/* plan */");
    assert!(h.solve(&solver, false).await.unwrap());
    assert_eq!(h.page.typed_keys(), ["1"]);
}

#[tokio::test(start_paused = true)]
async fn test_script_exception_is_an_error() {
    let h = harness();
    h.page.push_evaluate_error("TypeError: cannot read numerator");

    let solver = ScriptSolver::new("fractions", "/* plan */");
    let err = h.solve(&solver, false).await.unwrap_err();
    assert!(err.to_string().contains("numerator"));
}
