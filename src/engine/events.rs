//! Engine notifications and observer plumbing

use crate::game_of_life::CellCoord;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Presentation-facing record of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellState {
    pub coord: CellCoord,
    pub alive: bool,
}

/// Notifications emitted by a [`GridEngine`](super::GridEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A cell's liveness changed, either by a generation step or a toggle
    CellChanged(CellState),
    /// A generation finished and the buffers were swapped
    CycleCompleted { generation: u64, living: usize },
    /// The advisory pause flag changed
    PauseChanged { paused: bool },
}

/// Callback registered with an engine. Returns `false` to unsubscribe.
pub(crate) type Observer = Box<dyn FnMut(&EngineEvent) -> bool + Send>;

/// Fan-out of events to every registered observer
#[derive(Default)]
pub(crate) struct ObserverList {
    observers: Vec<Observer>,
}

impl ObserverList {
    pub fn push(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Deliver an event, dropping observers that asked to detach
    pub fn notify(&mut self, event: &EngineEvent) {
        self.observers.retain_mut(|observer| observer(event));
    }
}

/// Observer that forwards every event into an unbounded channel.
/// Detaches once the receiving side is dropped.
pub(crate) fn channel_observer() -> (Observer, mpsc::UnboundedReceiver<EngineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let observer: Observer = Box::new(move |event: &EngineEvent| tx.send(event.clone()).is_ok());
    (observer, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_notify_reaches_all_observers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::default();

        for id in 0..2 {
            let seen = Arc::clone(&seen);
            list.push(Box::new(move |event: &EngineEvent| {
                seen.lock().unwrap().push((id, event.clone()));
                true
            }));
        }

        list.notify(&EngineEvent::PauseChanged { paused: true });
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], (1, EngineEvent::PauseChanged { paused: true }));
    }

    #[test]
    fn test_dropped_channel_detaches() {
        let mut list = ObserverList::default();
        let (observer, rx) = channel_observer();
        list.push(observer);

        list.notify(&EngineEvent::PauseChanged { paused: false });
        assert_eq!(list.len(), 1);

        drop(rx);
        list.notify(&EngineEvent::PauseChanged { paused: true });
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_event_json_shape() {
        let event = EngineEvent::CellChanged(CellState {
            coord: CellCoord::new(2, 3),
            alive: true,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "cell_changed");
        assert_eq!(json["coord"]["x"], 2);
        assert_eq!(json["alive"], true);
    }
}
