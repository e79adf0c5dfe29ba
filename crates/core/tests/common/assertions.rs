//! Assertion helpers over executor events.

use cf_protocol::ExecutionEvent;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

/// Receive events until a terminal one arrives.
#[allow(dead_code)]
pub async fn collect_run(rx: &mut broadcast::Receiver<ExecutionEvent>) -> Vec<ExecutionEvent> {
    let mut events = Vec::new();
    loop {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("Timed out waiting for events")
            .expect("Event channel closed");
        let done = event.is_terminal();
        events.push(event);
        if done {
            return events;
        }
    }
}

/// Check the shape of one run's events: started first, completed last,
/// every step start followed by its completion.
#[allow(dead_code)]
pub fn assert_event_sequence(events: &[ExecutionEvent]) {
    assert!(!events.is_empty(), "Event sequence is empty");
    assert!(
        matches!(events[0], ExecutionEvent::ExecutionStarted { .. }),
        "First event should be ExecutionStarted, got: {:?}",
        events[0]
    );
    let last = &events[events.len() - 1];
    assert!(last.is_terminal(), "Last event should be terminal, got: {last:?}");

    let mut open: Option<u32> = None;
    for event in events {
        match event {
            ExecutionEvent::StepStarted { step_order, .. } => {
                assert!(open.is_none(), "Step {step_order} started inside another step");
                open = Some(*step_order);
            }
            ExecutionEvent::StepCompleted { step_order, .. } => {
                assert_eq!(open.take(), Some(*step_order), "Unmatched StepCompleted");
            }
            _ => {}
        }
    }
}

/// `(step_order, success)` of every completed step.
#[allow(dead_code)]
pub fn step_outcomes(events: &[ExecutionEvent]) -> Vec<(u32, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            ExecutionEvent::StepCompleted {
                step_order,
                success,
                ..
            } => Some((*step_order, *success)),
            _ => None,
        })
        .collect()
}

/// The `(success, message)` of the terminal event.
#[allow(dead_code)]
pub fn completion(events: &[ExecutionEvent]) -> Option<(bool, String)> {
    events.iter().find_map(|e| match e {
        ExecutionEvent::ExecutionCompleted {
            success, message, ..
        } => Some((*success, message.clone())),
        _ => None,
    })
}
