// In memory implementation of the BatchSource port.
//
// Purpose
// - Drive the consumer runner in tests and local development without a broker.
//
// Responsibilities
// - Keep an ordered queue of raw events per topic and stamp each with an offset.
// - Allow one in-flight batch per topic so ordering survives redelivery.
// - On ack, forget the batch. On nack, put its events back at the front of the queue.

use crate::core::association::event::RawEvent;
use crate::core::ports::{Batch, BatchSource, TransportError};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

#[derive(Default)]
struct TopicState {
    queue: VecDeque<RawEvent>,
    in_flight: Option<Batch>,
    next_offset: u64,
}

#[derive(Default)]
struct TransportState {
    topics: HashMap<String, TopicState>,
    next_delivery_tag: u64,
    acked: usize,
    redelivered: usize,
}

#[derive(Default)]
pub struct InMemoryTransport {
    state: Mutex<TransportState>,
    is_offline: bool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn publish(&self, topic: &str, payload: impl Into<String>) -> u64 {
        let mut state = self.state.lock().await;
        let topic_state = state.topics.entry(topic.to_string()).or_default();
        let offset = topic_state.next_offset;
        topic_state.next_offset += 1;
        topic_state.queue.push_back(RawEvent::new(offset, payload));
        offset
    }

    /// Publishes the payloads in order; offsets are reassigned by the topic.
    pub async fn publish_all(&self, topic: &str, events: impl IntoIterator<Item = RawEvent>) {
        for event in events {
            self.publish(topic, event.payload).await;
        }
    }

    /// Events not yet acknowledged, queued or in flight.
    pub async fn pending_count(&self, topic: &str) -> usize {
        let state = self.state.lock().await;
        state.topics.get(topic).map_or(0, |topic_state| {
            topic_state.queue.len()
                + topic_state
                    .in_flight
                    .as_ref()
                    .map_or(0, |batch| batch.events.len())
        })
    }

    pub async fn acked_count(&self) -> usize {
        self.state.lock().await.acked
    }

    pub async fn redelivered_count(&self) -> usize {
        self.state.lock().await.redelivered
    }

    fn ensure_online(&self) -> Result<(), TransportError> {
        if self.is_offline {
            return Err(TransportError::Backend("Transport offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BatchSource for InMemoryTransport {
    async fn poll(&self, topic: &str, max_events: usize) -> Result<Option<Batch>, TransportError> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        state.next_delivery_tag += 1;
        let delivery_tag = state.next_delivery_tag;

        let Some(topic_state) = state.topics.get_mut(topic) else {
            return Ok(None);
        };
        if topic_state.in_flight.is_some() || topic_state.queue.is_empty() {
            return Ok(None);
        }

        let take = max_events.max(1).min(topic_state.queue.len());
        let batch = Batch {
            delivery_tag,
            topic: topic.to_string(),
            events: topic_state.queue.drain(..take).collect(),
        };
        topic_state.in_flight = Some(batch.clone());
        Ok(Some(batch))
    }

    async fn ack(&self, batch: &Batch) -> Result<(), TransportError> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        take_in_flight(&mut state, batch)?;
        state.acked += 1;
        Ok(())
    }

    async fn nack(&self, batch: &Batch) -> Result<(), TransportError> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        let returned = take_in_flight(&mut state, batch)?;
        if let Some(topic_state) = state.topics.get_mut(&batch.topic) {
            for event in returned.events.into_iter().rev() {
                topic_state.queue.push_front(event);
            }
        }
        state.redelivered += 1;
        Ok(())
    }
}

fn take_in_flight(state: &mut TransportState, batch: &Batch) -> Result<Batch, TransportError> {
    let topic_state = state
        .topics
        .get_mut(&batch.topic)
        .ok_or(TransportError::UnknownDelivery(batch.delivery_tag))?;
    match topic_state.in_flight.take() {
        Some(in_flight) if in_flight.delivery_tag == batch.delivery_tag => Ok(in_flight),
        other => {
            topic_state.in_flight = other;
            Err(TransportError::UnknownDelivery(batch.delivery_tag))
        }
    }
}
