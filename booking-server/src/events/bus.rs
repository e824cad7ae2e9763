//! Event bus core implementation
//!
//! # Message flow
//!
//! ```text
//! Scheduler ──▶ publish() ──▶ bounded mpsc ──▶ publisher task ──▶ broadcast
//!                                                                  │
//!                                                      WebSocket subscribers
//! ```
//!
//! `publish` never blocks and never fails the calling request: a full
//! queue drops the event with a warning. Delivery is at-most-once,
//! best-effort; lagged subscribers skip missed events.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};

use super::BookingEvent;

/// Fan-out bus for booking lifecycle events
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Ingestion side: bounded, fed by request handlers
    queue_tx: mpsc::Sender<BookingEvent>,
    /// Fan-out side: one receiver per connected subscriber
    fanout_tx: broadcast::Sender<BookingEvent>,
    /// Receiver handed to the publisher task on startup
    pump_rx: Arc<Mutex<Option<mpsc::Receiver<BookingEvent>>>>,
}

impl EventBus {
    /// Create a bus with the given queue/fan-out capacity
    pub fn new(capacity: usize) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(capacity);
        let (fanout_tx, _) = broadcast::channel(capacity);
        Self {
            queue_tx,
            fanout_tx,
            pump_rx: Arc::new(Mutex::new(Some(queue_rx))),
        }
    }

    /// Start the background publisher task.
    ///
    /// Must be called once before the server starts accepting requests;
    /// subsequent calls are no-ops.
    pub fn start_publisher(&self) {
        let Some(mut rx) = self.pump_rx.lock().expect("event bus lock poisoned").take() else {
            return;
        };
        let fanout_tx = self.fanout_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                // Err means no subscriber is currently connected
                let _ = fanout_tx.send(event);
            }
            tracing::debug!("event publisher stopped");
        });
        tracing::debug!("event publisher started in background");
    }

    /// Publish an event (fire-and-forget)
    pub fn publish(&self, event: BookingEvent) {
        if let Err(e) = self.queue_tx.try_send(event) {
            tracing::warn!(error = %e, "event queue full or closed, dropping notification");
        }
    }

    /// Subscribe to the fan-out side
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.fanout_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Booking;
    use surrealdb::RecordId;

    fn event(key: &str) -> BookingEvent {
        BookingEvent::created(&Booking {
            id: Some(RecordId::from_table_key("booking", key)),
            room: RecordId::from_table_key("room", "r1"),
            user: RecordId::from_table_key("user", "u1"),
            start_time: 0,
            end_time: 1,
            created_at: 0,
            updated_at: 0,
        })
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new(16);
        bus.start_publisher();
        let mut rx = bus.subscribe();

        bus.publish(event("b1"));

        let received = rx.recv().await.unwrap();
        match received {
            BookingEvent::Created { booking_id, .. } => assert_eq!(booking_id, "booking:b1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn publish_never_blocks_when_queue_is_full() {
        // Publisher intentionally not started, so the queue fills up
        let bus = EventBus::new(2);
        for i in 0..10 {
            bus.publish(event(&format!("b{i}")));
        }
        // Reaching this point at all is the assertion: publish dropped
        // the overflow instead of blocking
    }

    #[tokio::test]
    async fn start_publisher_is_idempotent() {
        let bus = EventBus::new(4);
        bus.start_publisher();
        bus.start_publisher();

        let mut rx = bus.subscribe();
        bus.publish(event("b1"));
        assert!(rx.recv().await.is_ok());
    }
}
