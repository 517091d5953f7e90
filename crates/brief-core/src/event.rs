//! Change notifications emitted by an intent session.
//!
//! Each event type has a `watch` channel that keeps the last published
//! value, so a subscriber that arrives late still sees the current state.
//! A `broadcast` stream carries every event in order for observers that
//! need the full sequence.

use tokio::sync::{broadcast, watch};

use crate::intent::{IntentStatus, Workflow};
use crate::tokens::TokenStats;

const EVENT_STREAM_CAPACITY: usize = 64;

/// One change published by a session.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentEvent {
    FilesChanged(Vec<String>),
    TokensChanged(TokenStats),
    StateChanged(IntentStatus),
    WorkflowChanged(Workflow),
}

/// In-process event fan-out for one session.
///
/// Publishing never blocks and never fails; with no subscribers the value
/// is simply retained.
#[derive(Debug)]
pub struct EventHub {
    files: watch::Sender<Vec<String>>,
    tokens: watch::Sender<TokenStats>,
    state: watch::Sender<IntentStatus>,
    workflow: watch::Sender<Workflow>,
    stream: broadcast::Sender<IntentEvent>,
}

impl EventHub {
    /// Creates a hub seeded with the session's current values.
    pub fn new(
        files: Vec<String>,
        tokens: TokenStats,
        state: IntentStatus,
        workflow: Workflow,
    ) -> Self {
        Self {
            files: watch::channel(files).0,
            tokens: watch::channel(tokens).0,
            state: watch::channel(state).0,
            workflow: watch::channel(workflow).0,
            stream: broadcast::channel(EVENT_STREAM_CAPACITY).0,
        }
    }

    pub fn publish(&self, event: IntentEvent) {
        match &event {
            IntentEvent::FilesChanged(paths) => {
                self.files.send_replace(paths.clone());
            }
            IntentEvent::TokensChanged(stats) => {
                self.tokens.send_replace(*stats);
            }
            IntentEvent::StateChanged(status) => {
                self.state.send_replace(*status);
            }
            IntentEvent::WorkflowChanged(workflow) => {
                self.workflow.send_replace(*workflow);
            }
        }
        // No stream subscribers is not an error.
        let _ = self.stream.send(event);
    }

    pub fn files(&self) -> watch::Receiver<Vec<String>> {
        self.files.subscribe()
    }

    pub fn tokens(&self) -> watch::Receiver<TokenStats> {
        self.tokens.subscribe()
    }

    pub fn state(&self) -> watch::Receiver<IntentStatus> {
        self.state.subscribe()
    }

    pub fn workflow(&self) -> watch::Receiver<Workflow> {
        self.workflow.subscribe()
    }

    /// Every event published from now on, in order.
    pub fn events(&self) -> broadcast::Receiver<IntentEvent> {
        self.stream.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::WorkflowStage;

    fn hub() -> EventHub {
        EventHub::new(
            Vec::new(),
            TokenStats::default(),
            IntentStatus::Draft,
            Workflow::default(),
        )
    }

    #[test]
    fn test_late_subscriber_sees_last_value() {
        let hub = hub();
        hub.publish(IntentEvent::FilesChanged(vec!["a.x".into()]));
        hub.publish(IntentEvent::StateChanged(IntentStatus::Completed));

        let files = hub.files();
        assert_eq!(*files.borrow(), vec!["a.x".to_string()]);
        assert_eq!(*hub.state().borrow(), IntentStatus::Completed);
    }

    #[tokio::test]
    async fn test_stream_delivers_events_in_order() {
        let hub = hub();
        let mut events = hub.events();

        let workflow = Workflow::at(WorkflowStage::IntentGenerated);
        hub.publish(IntentEvent::WorkflowChanged(workflow));
        hub.publish(IntentEvent::StateChanged(IntentStatus::Completed));

        assert_eq!(
            events.recv().await.unwrap(),
            IntentEvent::WorkflowChanged(workflow)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            IntentEvent::StateChanged(IntentStatus::Completed)
        );
    }

    #[tokio::test]
    async fn test_dropping_hub_closes_channels() {
        let hub = hub();
        let mut tokens = hub.tokens();
        drop(hub);
        assert!(tokens.changed().await.is_err());
    }
}
