//! Pipeline progress events

use tokio::sync::mpsc;

use crate::types::{FleetStatus, ProcessingStatus};

/// Progress of a fleet run, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    FleetStarted {
        fleet_id: String,
        plan: Vec<String>,
    },
    AgentStarted {
        fleet_id: String,
        agent_id: String,
        /// 1-based position in the execution plan
        position: usize,
    },
    AgentFinished {
        fleet_id: String,
        agent_id: String,
        status: ProcessingStatus,
        confidence: f64,
    },
    FleetFinished {
        fleet_id: String,
        status: FleetStatus,
        overall_confidence: f64,
    },
}

/// Sending half handed to fleets
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl EventSender {
    /// Emit an event. A dropped receiver is not an error.
    pub fn emit(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half held by the caller
#[derive(Debug)]
pub struct EventChannel {
    rx: mpsc::UnboundedReceiver<PipelineEvent>,
}

impl EventChannel {
    /// Create a connected sender/receiver pair
    pub fn new() -> (EventSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSender { tx }, Self { rx })
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv(&mut self) -> Option<PipelineEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next event; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<PipelineEvent> {
        self.rx.recv().await
    }

    /// Everything queued right now
    pub fn drain(&mut self) -> Vec<PipelineEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_creation() {
        let (tx, mut channel) = EventChannel::new();
        assert!(!tx.is_closed());
        assert!(channel.try_recv().is_none());
    }

    #[test]
    fn test_emit_and_drain_in_order() {
        let (tx, mut channel) = EventChannel::new();
        tx.emit(PipelineEvent::FleetStarted {
            fleet_id: "f".into(),
            plan: vec!["a".into()],
        });
        tx.emit(PipelineEvent::AgentStarted {
            fleet_id: "f".into(),
            agent_id: "a".into(),
            position: 1,
        });

        let events = channel.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], PipelineEvent::FleetStarted { .. }));
        assert!(matches!(events[1], PipelineEvent::AgentStarted { position: 1, .. }));
    }

    #[test]
    fn test_emit_after_receiver_dropped() {
        let (tx, channel) = EventChannel::new();
        drop(channel);
        assert!(tx.is_closed());
        tx.emit(PipelineEvent::FleetFinished {
            fleet_id: "f".into(),
            status: FleetStatus::Failed,
            overall_confidence: 0.0,
        });
    }

    #[tokio::test]
    async fn test_recv_ends_when_senders_drop() {
        let (tx, mut channel) = EventChannel::new();
        tx.emit(PipelineEvent::AgentFinished {
            fleet_id: "f".into(),
            agent_id: "a".into(),
            status: ProcessingStatus::Completed,
            confidence: 0.9,
        });
        drop(tx);

        assert!(channel.recv().await.is_some());
        assert!(channel.recv().await.is_none());
    }
}
